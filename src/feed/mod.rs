//! Log replay feeds
//!
//! Everything between a recorded, growing, tab-delimited log file and the
//! columnar buffer the dashboard reads from:
//! - `reader`: row parsing and windowed full-file reads
//! - `tail`: incremental read cursor over a growing file
//! - `buffer`: append-only columnar store shared with the renderer
//! - `acquisition`: the paced polling loop turning file time into wall time
//! - `ingest`: the single writer applying acquired rows to the buffers

pub mod acquisition;
pub mod buffer;
pub mod error;
pub mod ingest;
pub mod reader;
pub mod tail;

pub use acquisition::{Acquisition, Backoff, ReadMode};
pub use buffer::{
    BufferSnapshot, BufferStats, ColumnBuffer, ColumnCursor, ColumnRef, FeedBuffers, Sample,
    SharedColumnBuffer,
};
pub use error::FeedError;
pub use reader::{read_header, read_window, LogRow, SourceSpec, TimeColumn};
pub use tail::LogTail;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter};

/// The two recordings replayed by the dashboard.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Display, EnumIter, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum FeedKind {
    /// Headerless ventilator recording: time, pressure, flow, volume.
    Waveform,
    /// Patient-monitor recording with a header row and a named `Time` field.
    Monitor,
}
