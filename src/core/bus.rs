use flume::{Receiver, Sender};

use crate::feed::{FeedKind, LogRow};

/// Messages sent from an acquisition task to the ingest task.
#[derive(Debug, Clone, PartialEq)]
pub struct FeedEvent {
    pub feed: FeedKind,
    pub kind: FeedEventKind,
}

#[derive(Debug, Clone, PartialEq)]
pub enum FeedEventKind {
    /// Column names of a keyed recording, sent once per (re)opened file.
    Header(Vec<String>),
    /// Rows whose time has come, in file order.
    Rows(Vec<LogRow>),
    /// The recording could not be read; the next attempt follows after `retry_in_ms`.
    Stalled {
        attempt: u32,
        retry_in_ms: u64,
        error: String,
    },
    /// Reading works again after one or more stalls.
    Recovered { after_attempts: u32 },
    /// The recording shrank below the read cursor or was replaced, and is
    /// being re-read from the top.
    Truncated,
}

impl FeedEvent {
    pub fn new(feed: FeedKind, kind: FeedEventKind) -> Self {
        Self { feed, kind }
    }
}

/// Messages sent from the input thread to the render loop.
#[derive(Debug, Clone, PartialEq)]
pub enum UiToCore {
    /// Redraw everything on the next pass (terminal resized).
    Redraw,
    /// Graceful shutdown request.
    Quit,
}

/// Holder passed into the render loop: the receiving side from the input
/// thread and the sending side back to it.
#[derive(Debug, Clone)]
pub struct Bus {
    pub ui_rx: Receiver<UiToCore>,
    pub kill_tx: Sender<()>,
}

impl Bus {
    pub fn new(ui_rx: Receiver<UiToCore>, kill_tx: Sender<()>) -> Self {
        Self { ui_rx, kill_tx }
    }
}
