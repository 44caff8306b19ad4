// Replay pipeline tests driven through the public API: reading windows,
// pacing against the replay clock and filling the shared buffers.

use std::{fs, io::Write, path::PathBuf, time::Duration};

use vitalwatch::{
    core::{
        bus::{FeedEvent, FeedEventKind},
        clock::{Clock, ManualClock},
    },
    feed::{
        ingest, read_window, Acquisition, FeedBuffers, FeedError, FeedKind, ReadMode, SourceSpec,
        TimeColumn,
    },
};

fn temp_recording(contents: &str) -> PathBuf {
    let path = std::env::temp_dir().join(format!("vitalwatch-it-{}.xls", uuid::Uuid::new_v4()));
    fs::write(&path, contents).expect("write recording");
    path
}

fn append(path: &PathBuf, contents: &str) {
    let mut file = fs::OpenOptions::new()
        .append(true)
        .open(path)
        .expect("open recording");
    file.write_all(contents.as_bytes()).expect("append recording");
}

/// 0.0, 0.1, ... 4.9 with pressure = 10 * t
fn waveform_recording() -> String {
    (0..50)
        .map(|i| {
            let t = f64::from(i) / 10.0;
            format!("{t:.1}\t{:.1}\t{:.2}\t5\n", t * 10.0, -t)
        })
        .collect()
}

#[test]
fn test_window_is_half_open_and_skips_garbage() -> anyhow::Result<()> {
    let path = temp_recording("0\t1\n\nbad\t2\n1\t3\n1.5\tx\n2\t4\n3\t5\n");
    let rows = read_window(&path, '\t', &TimeColumn::Index(0), 1.0, 3.0)?;

    let times: Vec<f64> = rows.iter().map(|row| row.timestamp).collect();
    assert_eq!(times, vec![1.0, 1.5, 2.0]);
    assert_eq!(rows[1].fields, vec![Some(1.5), None]);
    Ok(())
}

#[test]
fn test_missing_recording_is_an_access_error() {
    let path = std::env::temp_dir().join(format!("vitalwatch-none-{}", uuid::Uuid::new_v4()));
    let err = read_window(&path, '\t', &TimeColumn::Index(0), 0.0, 1.0).unwrap_err();
    assert!(matches!(err, FeedError::Access { .. }));
    assert!(err.is_retryable());
}

/// Every row is released exactly once, and only after the clock passed it.
fn assert_paced(mode: ReadMode) -> anyhow::Result<()> {
    let path = temp_recording(&waveform_recording());
    let clock = ManualClock::new();
    let mut acquisition = Acquisition::new(
        FeedKind::Waveform,
        SourceSpec::new(&path, TimeColumn::Index(0)),
        mode,
        clock.clone(),
    );

    let mut released = Vec::new();
    for step in 1..=60 {
        clock.set(Duration::from_millis(step * 100));
        let now = clock.elapsed().as_secs_f64();
        let batch = acquisition.tick()?;
        for row in &batch.rows {
            assert!(row.timestamp < now, "{} released at {now}", row.timestamp);
        }
        released.extend(batch.rows.into_iter().map(|row| row.timestamp));
    }

    let expected: Vec<f64> = (0..50).map(|i| f64::from(i) / 10.0).collect();
    assert_eq!(released.len(), expected.len());
    for (got, want) in released.iter().zip(&expected) {
        assert!((got - want).abs() < 1e-9);
    }
    Ok(())
}

#[test]
fn test_incremental_pacing() -> anyhow::Result<()> {
    assert_paced(ReadMode::Incremental)
}

#[test]
fn test_rescan_pacing() -> anyhow::Result<()> {
    assert_paced(ReadMode::Rescan)
}

#[test]
fn test_growing_recording_is_followed() -> anyhow::Result<()> {
    let path = temp_recording("Time\tSpO2\tPulse\n0.5\t95\t140\n");
    let clock = ManualClock::new();
    let mut acquisition = Acquisition::new(
        FeedKind::Monitor,
        SourceSpec::new(&path, TimeColumn::Name("Time".into())),
        ReadMode::Incremental,
        clock.clone(),
    );

    clock.set(Duration::from_secs(1));
    let first = acquisition.tick()?;
    assert_eq!(
        first.header,
        Some(vec!["Time".to_string(), "SpO2".to_string(), "Pulse".to_string()])
    );
    assert_eq!(first.rows.len(), 1);

    // half a line is not a row yet
    append(&path, "1.5\t96");
    clock.set(Duration::from_secs(2));
    assert!(acquisition.tick()?.rows.is_empty());

    append(&path, "\t141\n");
    let rows = acquisition.tick()?.rows;
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].fields, vec![Some(1.5), Some(96.0), Some(141.0)]);
    Ok(())
}

#[test]
fn test_ingest_fills_buffers_by_feed() {
    let buffers = FeedBuffers::new();
    let header = FeedEvent::new(
        FeedKind::Monitor,
        FeedEventKind::Header(vec!["Time".into(), "SpO2".into()]),
    );
    let rows = FeedEvent::new(
        FeedKind::Monitor,
        FeedEventKind::Rows(vec![vitalwatch::feed::LogRow::new(
            0.2,
            vec![Some(0.2), Some(93.0)],
        )]),
    );

    assert_eq!(ingest::apply(&buffers, header), 0);
    assert_eq!(ingest::apply(&buffers, rows), 1);
    assert_eq!(
        buffers.get(FeedKind::Monitor).latest_value(&"SpO2".into()),
        Some(93.0)
    );
    assert_eq!(buffers.get(FeedKind::Waveform).rows(), 0);
}

#[test]
fn test_ingest_stops_when_senders_are_gone() -> anyhow::Result<()> {
    let buffers = FeedBuffers::new();
    let (tx, rx) = flume::unbounded();
    for i in 0..3 {
        let t = f64::from(i);
        tx.send(FeedEvent::new(
            FeedKind::Waveform,
            FeedEventKind::Rows(vec![vitalwatch::feed::LogRow::new(t, vec![Some(t), Some(1.0)])]),
        ))?;
    }
    tx.send(FeedEvent::new(FeedKind::Waveform, FeedEventKind::Truncated))?;
    drop(tx);

    tokio_test::block_on(ingest::run_ingest(rx, buffers.clone()))?;
    assert_eq!(buffers.get(FeedKind::Waveform).rows(), 3);
    Ok(())
}
