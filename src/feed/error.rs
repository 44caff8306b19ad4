use derive_more::{Display, Error};
use std::{io, path::PathBuf};

/// Failures surfaced by the feed readers.
///
/// Row-level parse problems never show up here: an unparsable timestamp skips
/// the row and an unparsable field becomes a missing value.
#[derive(Debug, Display, Error)]
pub enum FeedError {
    /// The log file is missing or could not be read. Retried with backoff.
    #[display("cannot read {}: {source}", path.display())]
    Access {
        path: PathBuf,
        source: io::Error,
    },
    /// The file shrank below the read cursor (truncated or replaced).
    #[display("{} shrank to {len} bytes below read offset {offset}", path.display())]
    Truncated {
        path: PathBuf,
        offset: u64,
        len: u64,
    },
    /// Another file now sits at the recording's path (log rotation).
    #[display("{} was replaced by a different file", path.display())]
    Rotated { path: PathBuf },
}

impl FeedError {
    pub fn access(path: impl Into<PathBuf>, source: io::Error) -> Self {
        FeedError::Access {
            path: path.into(),
            source,
        }
    }

    pub fn is_retryable(&self) -> bool {
        matches!(self, FeedError::Access { .. })
    }

    /// The read cursor no longer matches the file and must start over.
    pub fn needs_reset(&self) -> bool {
        matches!(self, FeedError::Truncated { .. } | FeedError::Rotated { .. })
    }
}
