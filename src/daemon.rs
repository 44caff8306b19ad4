//! Headless replay
//!
//! Runs acquisition and ingest without the terminal dashboard and logs what
//! the buffers hold at a fixed interval. Useful for checking a recording and
//! the pacing before putting it on screen.

use anyhow::{Context, Result};
use std::{fmt, time::Duration};
use strum::IntoEnumIterator;

use crate::{
    config::Config,
    core::{
        clock::{format_elapsed, Clock, WallClock},
        runtime::start_replay,
    },
    feed::{FeedBuffers, FeedKind},
};

/// What one feed's buffer holds at a point in time.
#[derive(Debug, Clone, PartialEq)]
pub struct FeedSummary {
    pub feed: FeedKind,
    pub rows: usize,
    pub columns: usize,
    pub last_timestamp: Option<f64>,
}

impl fmt::Display for FeedSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {} rows, {} columns", self.feed, self.rows, self.columns)?;
        match self.last_timestamp {
            Some(time) => write!(f, ", last at {time:.3}s"),
            None => write!(f, ", nothing yet"),
        }
    }
}

/// One summary per feed, each read under a single lock.
pub fn summarize(buffers: &FeedBuffers) -> Vec<FeedSummary> {
    buffers
        .iter()
        .map(|(feed, buffer)| {
            let stats = buffer.stats();
            FeedSummary {
                feed,
                rows: stats.rows,
                columns: stats.columns,
                last_timestamp: stats.last_timestamp,
            }
        })
        .collect()
}

/// Replay until Ctrl+C, logging a summary every `summary_interval`.
pub async fn run(config: &Config, summary_interval: Duration) -> Result<()> {
    log::info!("🤖 Starting headless replay");
    for feed in FeedKind::iter() {
        log::info!("{feed}: {}", config.source(feed).path.display());
    }

    let clock = WallClock::start();
    let replay = start_replay(config, clock);

    let (stop_tx, stop_rx) = flume::bounded::<()>(1);
    ctrlc::set_handler(move || {
        let _ = stop_tx.try_send(());
    })
    .context("Failed to install Ctrl+C handler")?;

    let mut ticker = tokio::time::interval(summary_interval.max(Duration::from_millis(100)));
    ticker.tick().await;

    loop {
        tokio::select! {
            _ = ticker.tick() => log_summaries(&replay.buffers, clock.elapsed()),
            _ = stop_rx.recv_async() => {
                log::info!("🛑 Interrupt received, stopping replay");
                break;
            }
        }
    }

    log_summaries(&replay.buffers, clock.elapsed());
    replay.shutdown();
    Ok(())
}

fn log_summaries(buffers: &FeedBuffers, elapsed: Duration) {
    for summary in summarize(buffers) {
        log::info!("[{}] {summary}", format_elapsed(elapsed));
    }
}
