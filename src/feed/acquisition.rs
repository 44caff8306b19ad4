use anyhow::{anyhow, Result};
use flume::Sender;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::{read_header, read_window, FeedError, FeedKind, LogRow, LogTail, SourceSpec};
use crate::core::{
    bus::{FeedEvent, FeedEventKind},
    clock::Clock,
    task_manager::spawn_blocking_task,
};

/// How each poll reads the recording.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReadMode {
    /// Keep a byte cursor and read only what was appended since the last poll.
    #[default]
    Incremental,
    /// Scan the whole file from the top on every poll.
    Rescan,
}

/// Exponential retry delay for unreadable recordings.
#[derive(Debug, Clone)]
pub struct Backoff {
    initial: Duration,
    max: Duration,
    next: Duration,
    attempts: u32,
}

impl Backoff {
    pub fn new(initial: Duration, max: Duration) -> Self {
        Self {
            initial,
            max: max.max(initial),
            next: initial,
            attempts: 0,
        }
    }

    /// Delay before the next attempt; doubles on every call up to `max`.
    pub fn next_delay(&mut self) -> Duration {
        let delay = self.next;
        self.attempts += 1;
        self.next = (self.next * 2).min(self.max);
        delay
    }

    /// Failed attempts since the last success.
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    /// Back to the initial delay. Returns how many attempts had failed.
    pub fn reset(&mut self) -> u32 {
        let attempts = self.attempts;
        self.attempts = 0;
        self.next = self.initial;
        attempts
    }
}

impl Default for Backoff {
    fn default() -> Self {
        Self::new(Duration::from_millis(100), Duration::from_secs(5))
    }
}

/// What one tick picked up.
#[derive(Debug, Default, PartialEq)]
pub struct Batch {
    pub header: Option<Vec<String>>,
    pub rows: Vec<LogRow>,
}

/// Replays one recording against elapsed time.
///
/// A row becomes visible once the clock has passed its timestamp: each tick
/// reads the window `[last_seen, now)` and remembers the newest timestamp it
/// handed out. Rows stamped in the future simply wait for a later tick.
pub struct Acquisition<C: Clock> {
    feed: FeedKind,
    mode: ReadMode,
    tail: LogTail,
    clock: C,
    poll_interval: Duration,
    backoff: Backoff,
    last_seen: f64,
    consumed_at_last: usize,
    /// Rows at `last_seen` a re-read from the top will deliver a second time.
    replayed_at_last: usize,
    header_sent: bool,
}

impl<C: Clock> Acquisition<C> {
    pub fn new(feed: FeedKind, source: SourceSpec, mode: ReadMode, clock: C) -> Self {
        Self {
            feed,
            mode,
            tail: LogTail::new(source),
            clock,
            poll_interval: Duration::from_millis(100),
            backoff: Backoff::default(),
            last_seen: 0.0,
            consumed_at_last: 0,
            replayed_at_last: 0,
            header_sent: false,
        }
    }

    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    pub fn with_backoff(mut self, backoff: Backoff) -> Self {
        self.backoff = backoff;
        self
    }

    pub fn feed(&self) -> FeedKind {
        self.feed
    }

    /// Timestamp of the newest row handed out so far.
    pub fn last_seen(&self) -> f64 {
        self.last_seen
    }

    /// Read everything that became due since the previous tick.
    ///
    /// On `Truncated` or `Rotated` the cursor has already been reset; the next
    /// tick reads the file again from the top and only hands out rows not
    /// older than `last_seen`, minus those at `last_seen` already handed out.
    pub fn tick(&mut self) -> Result<Batch, FeedError> {
        let now = self.clock.elapsed().as_secs_f64();
        let mut batch = Batch::default();

        let rows = match self.mode {
            ReadMode::Incremental => {
                if let Err(err) = self.tail.poll() {
                    if err.needs_reset() {
                        self.tail.reset();
                        self.header_sent = false;
                        self.replayed_at_last = self.consumed_at_last;
                    }
                    return Err(err);
                }
                if !self.header_sent {
                    if let Some(header) = self.tail.header() {
                        batch.header = Some(header.to_vec());
                        self.header_sent = true;
                    }
                }
                let mut rows = self.tail.take_window(self.last_seen, now);
                let repeated = leading_at(&rows, self.last_seen).min(self.replayed_at_last);
                rows.drain(..repeated);
                self.replayed_at_last = if rows.is_empty() {
                    self.replayed_at_last - repeated
                } else {
                    0
                };
                rows
            }
            ReadMode::Rescan => {
                let source = self.tail.source();
                if source.time_column.is_keyed() && !self.header_sent {
                    if let Some(header) = read_header(&source.path, source.delimiter)? {
                        batch.header = Some(header);
                        self.header_sent = true;
                    }
                }
                let mut rows = read_window(
                    &source.path,
                    source.delimiter,
                    &source.time_column,
                    self.last_seen,
                    now,
                )?;
                // the window start is inclusive, so rows stamped exactly
                // `last_seen` come back on every scan
                let repeated = leading_at(&rows, self.last_seen).min(self.consumed_at_last);
                rows.drain(..repeated);
                rows
            }
        };

        for row in &rows {
            if row.timestamp == self.last_seen {
                self.consumed_at_last += 1;
            } else {
                self.last_seen = row.timestamp;
                self.consumed_at_last = 1;
            }
        }
        batch.rows = rows;
        Ok(batch)
    }

    /// Poll forever, forwarding what each tick finds to the ingest task.
    ///
    /// Unreadable files are retried with backoff and never end the loop.
    /// Returns once the receiving side has gone away.
    pub async fn run(mut self, tx: Sender<FeedEvent>) -> Result<()> {
        let feed = self.feed;
        log::info!(
            "{feed} acquisition started on {} ({:?}, every {:?})",
            self.tail.source().path.display(),
            self.mode,
            self.poll_interval
        );

        loop {
            if tx.is_disconnected() {
                return Ok(());
            }

            let (returned, result) = spawn_blocking_task(move || {
                let result = self.tick();
                (self, result)
            })
            .await
            .map_err(|err| anyhow!("{feed} acquisition worker panicked: {err}"))?;
            self = returned;

            let mut events = Vec::new();
            let delay = match result {
                Ok(batch) => {
                    let failed = self.backoff.reset();
                    if failed > 0 {
                        log::info!("{feed} recording readable again after {failed} attempt(s)");
                        events.push(FeedEventKind::Recovered {
                            after_attempts: failed,
                        });
                    }
                    if let Some(header) = batch.header {
                        events.push(FeedEventKind::Header(header));
                    }
                    if !batch.rows.is_empty() {
                        events.push(FeedEventKind::Rows(batch.rows));
                    }
                    self.poll_interval
                }
                Err(err) if err.needs_reset() => {
                    log::warn!("{feed}: {err}; re-reading from the start");
                    events.push(FeedEventKind::Truncated);
                    self.poll_interval
                }
                Err(err) => {
                    let delay = self.backoff.next_delay();
                    let attempt = self.backoff.attempts();
                    log::warn!("{feed}: {err}; retry #{attempt} in {delay:?}");
                    events.push(FeedEventKind::Stalled {
                        attempt,
                        retry_in_ms: delay.as_millis() as u64,
                        error: err.to_string(),
                    });
                    delay
                }
            };

            for kind in events {
                if tx.send_async(FeedEvent::new(feed, kind)).await.is_err() {
                    log::info!("{feed} acquisition stopping: ingest hung up");
                    return Ok(());
                }
            }

            tokio::time::sleep(delay).await;
        }
    }
}

/// Number of leading rows stamped exactly `time`.
fn leading_at(rows: &[LogRow], time: f64) -> usize {
    rows.iter().take_while(|row| row.timestamp == time).count()
}
