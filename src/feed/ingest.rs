use anyhow::Result;
use flume::Receiver;

use super::FeedBuffers;
use crate::core::bus::{FeedEvent, FeedEventKind};

/// Apply acquired rows to the shared buffers.
///
/// This is the only writer of `buffers`. Failures reported by acquisition are
/// logged and otherwise ignored: the dashboard keeps showing what it has.
/// Returns when every acquisition task has dropped its sender.
pub async fn run_ingest(rx: Receiver<FeedEvent>, buffers: FeedBuffers) -> Result<()> {
    while let Ok(event) = rx.recv_async().await {
        apply(&buffers, event);
    }
    log::info!("all acquisition tasks gone, ingest stopping");
    Ok(())
}

/// Apply one event. Returns the number of rows appended.
pub fn apply(buffers: &FeedBuffers, event: FeedEvent) -> usize {
    let FeedEvent { feed, kind } = event;
    let buffer = buffers.get(feed);
    match kind {
        FeedEventKind::Header(header) => {
            log::info!("{feed} columns: {}", header.join(", "));
            buffer.set_header(header);
            0
        }
        FeedEventKind::Rows(rows) => {
            buffer.extend(&rows);
            log::debug!("{feed} +{} rows ({} total)", rows.len(), buffer.rows());
            rows.len()
        }
        FeedEventKind::Stalled {
            attempt,
            retry_in_ms,
            error,
        } => {
            log::warn!("{feed} stalled (attempt {attempt}, next in {retry_in_ms} ms): {error}");
            0
        }
        FeedEventKind::Recovered { after_attempts } => {
            log::info!("{feed} recovered after {after_attempts} failed attempt(s)");
            0
        }
        FeedEventKind::Truncated => {
            log::warn!(
                "{feed} recording truncated or replaced, keeping {} rows already shown",
                buffer.rows()
            );
            0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feed::{FeedKind, LogRow};

    #[test]
    fn test_apply_routes_rows_to_their_feed() {
        let buffers = FeedBuffers::new();
        let rows = vec![
            LogRow::new(0.0, vec![Some(0.0), Some(1.0)]),
            LogRow::new(0.1, vec![Some(0.1), Some(2.0)]),
        ];
        assert_eq!(
            apply(&buffers, FeedEvent::new(FeedKind::Waveform, FeedEventKind::Rows(rows))),
            2
        );
        apply(
            &buffers,
            FeedEvent::new(FeedKind::Monitor, FeedEventKind::Header(vec!["Time".into()])),
        );
        apply(&buffers, FeedEvent::new(FeedKind::Monitor, FeedEventKind::Truncated));

        assert_eq!(buffers.get(FeedKind::Waveform).rows(), 2);
        assert_eq!(buffers.get(FeedKind::Monitor).rows(), 0);
        assert_eq!(
            buffers.get(FeedKind::Monitor).snapshot().header(),
            Some(&["Time".to_string()][..])
        );
    }

    #[tokio::test]
    async fn test_ingest_ends_when_senders_drop() -> anyhow::Result<()> {
        let buffers = FeedBuffers::new();
        let (tx, rx) = flume::unbounded();
        let task = tokio::spawn(run_ingest(rx, buffers.clone()));

        tx.send_async(FeedEvent::new(
            FeedKind::Waveform,
            FeedEventKind::Rows(vec![LogRow::new(1.0, vec![Some(1.0)])]),
        ))
        .await?;
        drop(tx);
        task.await??;

        assert_eq!(buffers.get(FeedKind::Waveform).rows(), 1);
        Ok(())
    }
}
