use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use strum::IntoEnumIterator;

use super::{FeedKind, LogRow};

/// One value of a column together with the timestamp of the row it came from.
///
/// Keeping the row time on every sample lets columns of different lengths
/// (rows with fewer fields than their neighbours) still be plotted against
/// the right time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    pub time: f64,
    pub value: Option<f64>,
}

/// Addresses a column by file position or by header name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ColumnRef {
    Index(usize),
    Name(String),
}

impl From<usize> for ColumnRef {
    fn from(index: usize) -> Self {
        ColumnRef::Index(index)
    }
}

impl From<&str> for ColumnRef {
    fn from(name: &str) -> Self {
        ColumnRef::Name(name.to_string())
    }
}

/// Append-only columnar store of everything a feed has delivered so far.
///
/// Nothing is ever evicted: memory grows with the length of the replay.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ColumnBuffer {
    header: Option<Vec<String>>,
    columns: Vec<Vec<Sample>>,
    rows: usize,
    last_timestamp: Option<f64>,
}

/// A consistent copy of a buffer taken under its lock.
pub type BufferSnapshot = ColumnBuffer;

/// Size counters of a buffer, read together.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct BufferStats {
    pub rows: usize,
    pub columns: usize,
    pub last_timestamp: Option<f64>,
}

impl ColumnBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Push one sample per field of `row`, creating columns on first use.
    pub fn append(&mut self, row: &LogRow) {
        if self.columns.len() < row.fields.len() {
            self.columns.resize_with(row.fields.len(), Vec::new);
        }
        for (column, value) in self.columns.iter_mut().zip(&row.fields) {
            column.push(Sample {
                time: row.timestamp,
                value: *value,
            });
        }
        self.rows += 1;
        self.last_timestamp = Some(row.timestamp);
    }

    pub fn set_header(&mut self, header: Vec<String>) {
        self.header = Some(header);
    }

    pub fn header(&self) -> Option<&[String]> {
        self.header.as_deref()
    }

    /// Rows appended so far.
    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn last_timestamp(&self) -> Option<f64> {
        self.last_timestamp
    }

    /// Samples of column `index`; empty when no row had that many fields yet.
    pub fn column(&self, index: usize) -> &[Sample] {
        self.columns.get(index).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Samples of column `index` from position `from` onwards.
    pub fn since(&self, index: usize, from: usize) -> &[Sample] {
        let column = self.column(index);
        &column[from.min(column.len())..]
    }

    /// Resolve a column reference. Names need the header to have arrived.
    pub fn column_index(&self, column: &ColumnRef) -> Option<usize> {
        match column {
            ColumnRef::Index(index) => Some(*index),
            ColumnRef::Name(name) => self.header.as_ref()?.iter().position(|h| h == name),
        }
    }

    /// Most recent sample of column `index` that carries a value.
    pub fn latest(&self, index: usize) -> Option<Sample> {
        self.column(index)
            .iter()
            .rev()
            .find(|sample| sample.value.is_some())
            .copied()
    }
}

/// Per-consumer read position into one column of a shared buffer.
#[derive(Debug, Clone)]
pub struct ColumnCursor {
    column: ColumnRef,
    resolved: Option<usize>,
    position: usize,
}

impl ColumnCursor {
    pub fn new(column: impl Into<ColumnRef>) -> Self {
        Self {
            column: column.into(),
            resolved: None,
            position: 0,
        }
    }

    pub fn column(&self) -> &ColumnRef {
        &self.column
    }

    /// Number of samples this consumer has already seen.
    pub fn position(&self) -> usize {
        self.position
    }
}

/// The buffer shared between the ingest task (sole writer) and the renderer.
///
/// Every append and every read takes the lock for its whole duration, so a
/// reader sees either all of a row or none of it.
#[derive(Debug, Clone, Default)]
pub struct SharedColumnBuffer {
    inner: Arc<RwLock<ColumnBuffer>>,
}

impl SharedColumnBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&self, row: &LogRow) {
        self.inner.write().append(row);
    }

    /// Append a batch under a single write lock.
    pub fn extend(&self, rows: &[LogRow]) {
        let mut guard = self.inner.write();
        for row in rows {
            guard.append(row);
        }
    }

    pub fn set_header(&self, header: Vec<String>) {
        self.inner.write().set_header(header);
    }

    pub fn snapshot(&self) -> BufferSnapshot {
        self.inner.read().clone()
    }

    pub fn rows(&self) -> usize {
        self.inner.read().rows()
    }

    /// Row count, column count and last timestamp without copying the data.
    pub fn stats(&self) -> BufferStats {
        let guard = self.inner.read();
        BufferStats {
            rows: guard.rows(),
            columns: guard.column_count(),
            last_timestamp: guard.last_timestamp(),
        }
    }

    /// Samples appended to the cursor's column since its last read.
    ///
    /// Returns nothing while a named column cannot be resolved yet.
    pub fn read_since(&self, cursor: &mut ColumnCursor) -> Vec<Sample> {
        let guard = self.inner.read();
        let index = match cursor.resolved {
            Some(index) => index,
            None => match guard.column_index(&cursor.column) {
                Some(index) => {
                    cursor.resolved = Some(index);
                    index
                }
                None => return Vec::new(),
            },
        };

        let fresh = guard.since(index, cursor.position).to_vec();
        cursor.position += fresh.len();
        fresh
    }

    /// Latest non-missing value of a column.
    pub fn latest_value(&self, column: &ColumnRef) -> Option<f64> {
        let guard = self.inner.read();
        let index = guard.column_index(column)?;
        guard.latest(index).and_then(|sample| sample.value)
    }
}

/// One shared buffer per replayed recording.
#[derive(Debug, Clone, Default)]
pub struct FeedBuffers {
    waveform: SharedColumnBuffer,
    monitor: SharedColumnBuffer,
}

impl FeedBuffers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, feed: FeedKind) -> &SharedColumnBuffer {
        match feed {
            FeedKind::Waveform => &self.waveform,
            FeedKind::Monitor => &self.monitor,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (FeedKind, &SharedColumnBuffer)> + '_ {
        FeedKind::iter().map(move |feed| (feed, self.get(feed)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(timestamp: f64, fields: &[Option<f64>]) -> LogRow {
        LogRow::new(timestamp, fields.to_vec())
    }

    #[test]
    fn test_column_lengths_follow_fields_present() {
        let mut buffer = ColumnBuffer::new();
        buffer.append(&row(0.0, &[Some(0.0), Some(1.0), Some(2.0)]));
        buffer.append(&row(1.0, &[Some(1.0), None]));
        buffer.append(&row(2.0, &[Some(2.0), Some(5.0), Some(6.0), Some(7.0)]));

        assert_eq!(buffer.rows(), 3);
        assert_eq!(buffer.column_count(), 4);
        assert_eq!(buffer.column(0).len(), 3);
        assert_eq!(buffer.column(1).len(), 3);
        assert_eq!(buffer.column(2).len(), 2);
        assert_eq!(buffer.column(3).len(), 1);
        assert!(buffer.column(9).is_empty());

        // ragged rows keep their own timestamps
        assert_eq!(buffer.column(2)[1].time, 2.0);
        assert_eq!(buffer.column(1)[1].value, None);
        assert_eq!(buffer.latest(1).map(|s| s.time), Some(2.0));
    }

    #[test]
    fn test_latest_skips_missing_values() {
        let mut buffer = ColumnBuffer::new();
        buffer.append(&row(0.0, &[Some(0.0), Some(97.0)]));
        buffer.append(&row(1.0, &[Some(1.0), None]));
        assert_eq!(buffer.latest(1).and_then(|s| s.value), Some(97.0));
    }

    #[test]
    fn test_cursor_reads_each_sample_once() {
        let shared = SharedColumnBuffer::new();
        let mut cursor = ColumnCursor::new(1usize);

        shared.append(&row(0.0, &[Some(0.0), Some(10.0)]));
        shared.append(&row(1.0, &[Some(1.0), Some(11.0)]));
        let first = shared.read_since(&mut cursor);
        assert_eq!(first.len(), 2);
        assert!(shared.read_since(&mut cursor).is_empty());

        shared.extend(&[row(2.0, &[Some(2.0), Some(12.0)])]);
        let second = shared.read_since(&mut cursor);
        assert_eq!(second, vec![Sample { time: 2.0, value: Some(12.0) }]);
        assert_eq!(cursor.position(), 3);
    }

    #[test]
    fn test_named_column_waits_for_header() {
        let shared = SharedColumnBuffer::new();
        let mut cursor = ColumnCursor::new("SpO2");
        shared.append(&row(0.0, &[Some(0.0), Some(95.0)]));
        assert!(shared.read_since(&mut cursor).is_empty());
        assert_eq!(shared.latest_value(&"SpO2".into()), None);

        shared.set_header(vec!["Time".into(), "SpO2".into()]);
        assert_eq!(shared.read_since(&mut cursor).len(), 1);
        assert_eq!(shared.latest_value(&"SpO2".into()), Some(95.0));
    }

    #[test]
    fn test_snapshot_never_sees_half_a_row() {
        let shared = SharedColumnBuffer::new();
        let writer = {
            let shared = shared.clone();
            std::thread::spawn(move || {
                for i in 0..2000 {
                    let t = i as f64;
                    shared.append(&row(t, &[Some(t), Some(t * 2.0), Some(t * 3.0)]));
                }
            })
        };

        for _ in 0..200 {
            let snapshot = shared.snapshot();
            for index in 0..snapshot.column_count() {
                assert_eq!(snapshot.column(index).len(), snapshot.rows());
            }
        }
        writer.join().expect("writer thread");
        assert_eq!(shared.rows(), 2000);
    }

    #[test]
    fn test_stats_match_contents() {
        let shared = SharedColumnBuffer::new();
        assert_eq!(shared.stats(), BufferStats::default());

        shared.extend(&[
            row(0.0, &[Some(0.0), Some(1.0)]),
            row(0.5, &[Some(0.5), Some(2.0), Some(3.0)]),
        ]);
        assert_eq!(
            shared.stats(),
            BufferStats {
                rows: 2,
                columns: 3,
                last_timestamp: Some(0.5),
            }
        );
    }

    #[test]
    fn test_feed_buffers_are_independent() {
        let buffers = FeedBuffers::new();
        buffers
            .get(FeedKind::Waveform)
            .append(&row(0.0, &[Some(0.0)]));
        assert_eq!(buffers.get(FeedKind::Waveform).rows(), 1);
        assert_eq!(buffers.get(FeedKind::Monitor).rows(), 0);
        assert_eq!(buffers.iter().count(), 2);
    }
}
