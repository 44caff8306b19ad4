//! Replay pipeline shared by the dashboard and headless mode.
//!
//! One acquisition task per recording feeds a single ingest task over a flume
//! channel; the ingest task is the only writer of the shared buffers.

use anyhow::Result;
use std::future::Future;
use strum::IntoEnumIterator;
use tokio::task::JoinHandle;

use super::{clock::Clock, task_manager::spawn_logged_task};
use crate::{
    config::Config,
    feed::{ingest::run_ingest, Acquisition, FeedBuffers, FeedKind},
};

/// A running replay. Dropping it leaves the tasks running; call `shutdown`.
pub struct Replay {
    pub buffers: FeedBuffers,
    tasks: Vec<JoinHandle<()>>,
}

/// Spawn acquisition and ingest on the current tokio runtime.
///
/// `clock` is cloned into every acquisition task, so all feeds and whoever
/// else holds a clone share the same replay origin.
pub fn start_replay<C: Clock + Clone>(config: &Config, clock: C) -> Replay {
    let buffers = FeedBuffers::new();
    let (event_tx, event_rx) = flume::unbounded();
    let mut tasks = Vec::new();

    for feed in FeedKind::iter() {
        let acquisition = Acquisition::new(
            feed,
            config.source(feed).clone(),
            config.read_mode,
            clock.clone(),
        )
        .with_poll_interval(config.poll_interval())
        .with_backoff(config.backoff());
        tasks.push(spawn_logged_task(
            task_name(feed),
            acquisition.run(event_tx.clone()),
        ));
    }
    drop(event_tx);

    tasks.push(spawn_logged_task(
        "ingest",
        run_ingest(event_rx, buffers.clone()),
    ));

    Replay { buffers, tasks }
}

fn task_name(feed: FeedKind) -> &'static str {
    match feed {
        FeedKind::Waveform => "waveform acquisition",
        FeedKind::Monitor => "monitor acquisition",
    }
}

impl Replay {
    /// Await `body`, then shut the replay down whatever `body` returned.
    pub async fn supervise<F, T>(self, body: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        let result = body.await;
        self.shutdown();
        result
    }

    pub fn shutdown(self) {
        for task in &self.tasks {
            task.abort();
        }
        log::info!("replay stopped ({} tasks)", self.tasks.len());
    }
}
