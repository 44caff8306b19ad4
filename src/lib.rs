//! vitalwatch — replays recorded ventilator and patient-monitor logs as a
//! live clinical dashboard in the terminal.
//!
//! Recordings are tab-delimited text files whose first (or `Time`) column is
//! seconds since the start of the recording. Rows are released to the
//! dashboard once the replay clock has passed their timestamp, so a finished
//! recording plays back as if a device were still writing it, and a file that
//! is still growing is followed as it grows.
//!
//! The `feed` module reads and paces the recordings into shared column
//! buffers, `dashboard` describes the fixed panel layout and its refresh
//! callbacks, and `tui` draws it. `daemon` runs the same replay without a
//! terminal.

#[doc(hidden)]
pub mod boot;
pub mod cli;
pub mod config;
pub mod core;
pub mod daemon;
pub mod dashboard;
pub mod feed;
pub mod tui;

pub use config::Config;
