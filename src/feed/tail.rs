use std::{
    collections::VecDeque,
    fs::{File, Metadata},
    io::{Read, Seek, SeekFrom},
};

use super::{
    reader::{parse_line, split_header},
    FeedError, LogRow, SourceSpec,
};

/// Incremental reader over a recording that keeps growing.
///
/// Each `poll` reads only the bytes appended since the previous one. Complete
/// lines are parsed into a FIFO of rows that `take_window` releases once the
/// replay clock has caught up with them. A line without its trailing newline
/// stays buffered until the rest of it arrives.
#[derive(Debug)]
pub struct LogTail {
    source: SourceSpec,
    offset: u64,
    partial: Vec<u8>,
    header: Option<Vec<String>>,
    time_index: Option<usize>,
    pending: VecDeque<LogRow>,
    identity: Option<FileIdentity>,
}

/// Device and inode of the file the cursor was opened on.
type FileIdentity = (u64, u64);

#[cfg(unix)]
fn file_identity(metadata: &Metadata) -> Option<FileIdentity> {
    use std::os::unix::fs::MetadataExt;
    Some((metadata.dev(), metadata.ino()))
}

// no inode to compare; only truncation is detected here
#[cfg(not(unix))]
fn file_identity(_metadata: &Metadata) -> Option<FileIdentity> {
    None
}

impl LogTail {
    pub fn new(source: SourceSpec) -> Self {
        let time_index = source.time_column.resolve(None);
        Self {
            source,
            offset: 0,
            partial: Vec::new(),
            header: None,
            time_index,
            pending: VecDeque::new(),
            identity: None,
        }
    }

    pub fn source(&self) -> &SourceSpec {
        &self.source
    }

    pub fn header(&self) -> Option<&[String]> {
        self.header.as_deref()
    }

    pub fn offset(&self) -> u64 {
        self.offset
    }

    /// Rows parsed but not yet released.
    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    /// Pick up whatever was appended since the last poll.
    ///
    /// Returns the number of rows queued. Fails with `Rotated` when a different
    /// file now sits at the path and with `Truncated` when the file is shorter
    /// than what was already consumed; call `reset` to start over from the top.
    pub fn poll(&mut self) -> Result<usize, FeedError> {
        let path = &self.source.path;
        let mut file = File::open(path).map_err(|err| FeedError::access(path, err))?;
        let metadata = file
            .metadata()
            .map_err(|err| FeedError::access(path, err))?;
        let len = metadata.len();

        let identity = file_identity(&metadata);
        match (self.identity, identity) {
            (Some(known), Some(current)) if known != current => {
                return Err(FeedError::Rotated { path: path.clone() });
            }
            _ => self.identity = identity,
        }

        if len < self.offset {
            return Err(FeedError::Truncated {
                path: path.clone(),
                offset: self.offset,
                len,
            });
        }
        if len == self.offset {
            return Ok(0);
        }

        file.seek(SeekFrom::Start(self.offset))
            .map_err(|err| FeedError::access(path, err))?;
        let mut chunk = Vec::with_capacity((len - self.offset) as usize);
        let read = file
            .read_to_end(&mut chunk)
            .map_err(|err| FeedError::access(path, err))?;
        self.offset += read as u64;
        self.partial.extend_from_slice(&chunk);

        let Some(last_newline) = self.partial.iter().rposition(|byte| *byte == b'\n') else {
            return Ok(0);
        };
        let complete: Vec<u8> = self.partial.drain(..=last_newline).collect();
        let text = String::from_utf8_lossy(&complete);

        let delimiter = self.source.delimiter;
        let mut queued = 0;
        for line in text.split('\n') {
            if self.source.time_column.is_keyed() && self.header.is_none() {
                if line.trim().is_empty() {
                    continue;
                }
                let header = split_header(line, delimiter);
                self.time_index = self.source.time_column.resolve(Some(&header));
                if self.time_index.is_none() {
                    log::warn!(
                        "{} has no {:?} column; its rows will be ignored",
                        self.source.path.display(),
                        self.source.time_column
                    );
                }
                self.header = Some(header);
                continue;
            }

            let Some(time_index) = self.time_index else {
                continue;
            };
            if let Some(row) = parse_line(line, delimiter, time_index) {
                self.pending.push_back(row);
                queued += 1;
            }
        }

        Ok(queued)
    }

    /// Release queued rows with `start <= timestamp < end`.
    ///
    /// Rows older than `start` are discarded. Release stops at the first row
    /// at or beyond `end`, which stays queued for a later window together with
    /// everything behind it.
    pub fn take_window(&mut self, start: f64, end: f64) -> Vec<LogRow> {
        let mut rows = Vec::new();
        while let Some(row) = self.pending.front() {
            if row.timestamp < start {
                self.pending.pop_front();
                continue;
            }
            if row.timestamp >= end {
                break;
            }
            rows.extend(self.pending.pop_front());
        }
        rows
    }

    /// Forget the cursor and read the file again from the beginning.
    pub fn reset(&mut self) {
        self.offset = 0;
        self.partial.clear();
        self.header = None;
        self.time_index = self.source.time_column.resolve(None);
        self.pending.clear();
        self.identity = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feed::{
        testing::{append, write_temp},
        TimeColumn,
    };

    fn times(rows: &[LogRow]) -> Vec<f64> {
        rows.iter().map(|row| row.timestamp).collect()
    }

    #[test]
    fn test_poll_reads_only_appended_lines() -> anyhow::Result<()> {
        let path = write_temp("0\t1\n1\t2\n");
        let mut tail = LogTail::new(SourceSpec::new(&path, TimeColumn::Index(0)));

        assert_eq!(tail.poll()?, 2);
        assert_eq!(tail.poll()?, 0);

        append(&path, "2\t3\n3\t");
        assert_eq!(tail.poll()?, 1);
        append(&path, "4\n");
        assert_eq!(tail.poll()?, 1);

        let rows = tail.take_window(0.0, f64::INFINITY);
        assert_eq!(times(&rows), vec![0.0, 1.0, 2.0, 3.0]);
        assert_eq!(rows[3].fields, vec![Some(3.0), Some(4.0)]);
        Ok(())
    }

    #[test]
    fn test_rows_ahead_of_end_stay_queued() -> anyhow::Result<()> {
        let path = write_temp("0\t1\n1\t2\n2\t3\n");
        let mut tail = LogTail::new(SourceSpec::new(&path, TimeColumn::Index(0)));
        tail.poll()?;

        assert_eq!(times(&tail.take_window(0.0, 1.5)), vec![0.0, 1.0]);
        assert_eq!(tail.pending(), 1);
        assert!(tail.take_window(1.0, 2.0).is_empty());
        assert_eq!(times(&tail.take_window(1.0, 2.5)), vec![2.0]);
        assert_eq!(tail.pending(), 0);
        Ok(())
    }

    #[test]
    fn test_keyed_header_is_not_a_row() -> anyhow::Result<()> {
        let path = write_temp("Time\tSpO2\n");
        let mut tail = LogTail::new(SourceSpec::new(&path, TimeColumn::Name("Time".into())));
        assert_eq!(tail.poll()?, 0);
        assert_eq!(tail.header(), Some(&["Time".to_string(), "SpO2".into()][..]));

        append(&path, "0.2\t98\n");
        assert_eq!(tail.poll()?, 1);
        let rows = tail.take_window(0.0, 1.0);
        assert_eq!(rows[0].fields, vec![Some(0.2), Some(98.0)]);
        Ok(())
    }

    #[test]
    fn test_shrunk_file_reports_truncation() -> anyhow::Result<()> {
        let path = write_temp("0\t1\n1\t2\n");
        let mut tail = LogTail::new(SourceSpec::new(&path, TimeColumn::Index(0)));
        tail.poll()?;

        std::fs::write(&path, "0\t9\n")?;
        let err = tail.poll().unwrap_err();
        assert!(matches!(err, FeedError::Truncated { offset: 8, len: 4, .. }));
        assert!(!err.is_retryable());

        tail.reset();
        assert_eq!(tail.offset(), 0);
        assert_eq!(tail.poll()?, 1);
        Ok(())
    }

    #[cfg(unix)]
    #[test]
    fn test_replaced_file_reports_rotation() -> anyhow::Result<()> {
        let path = write_temp("0\t1\n1\t2\n");
        let mut tail = LogTail::new(SourceSpec::new(&path, TimeColumn::Index(0)));
        tail.poll()?;
        assert_eq!(times(&tail.take_window(0.0, f64::INFINITY)), vec![0.0, 1.0]);

        // longer than the old offset, so a size check alone would miss it
        let rotated = write_temp("10.25\t7\n11.5\t8\n12.75\t9\n");
        std::fs::rename(&rotated, &path)?;

        let err = tail.poll().unwrap_err();
        assert!(matches!(err, FeedError::Rotated { .. }));
        assert!(err.needs_reset());
        assert!(!err.is_retryable());

        tail.reset();
        assert_eq!(tail.poll()?, 3);
        let rows = tail.take_window(0.0, f64::INFINITY);
        assert_eq!(times(&rows), vec![10.25, 11.5, 12.75]);
        assert_eq!(rows[0].fields, vec![Some(10.25), Some(7.0)]);
        Ok(())
    }
}
