//! Terminal dashboard
//!
//! The render loop runs on its own thread and owns the terminal; a second
//! thread turns key presses into `UiToCore` messages. Acquisition and ingest
//! stay on the tokio runtime.

pub mod input;
pub mod rendering;
pub mod ui;

use anyhow::{anyhow, Result};
use std::thread;

use crate::{
    config::Config,
    core::{
        bus::{Bus, UiToCore},
        clock::WallClock,
        runtime::start_replay,
    },
    dashboard::{clinical_dashboard, Dashboard},
    feed::FeedBuffers,
};

pub async fn start(config: &Config) -> Result<()> {
    log::info!("[TUI] vitalwatch dashboard starting...");

    let clock = WallClock::start();
    let replay = start_replay(config, clock);
    let dashboard = clinical_dashboard(config);
    let buffers = replay.buffers.clone();

    replay
        .supervise(run_threads(dashboard, buffers, clock))
        .await
}

async fn run_threads(dashboard: Dashboard, buffers: FeedBuffers, clock: WallClock) -> Result<()> {
    let (ui_tx, ui_rx) = flume::unbounded::<UiToCore>();
    let (input_kill_tx, input_kill_rx) = flume::bounded::<()>(1);
    let bus = Bus::new(ui_rx, input_kill_tx);

    let input_handle = thread::Builder::new()
        .name("input".into())
        .spawn(move || input::run_input_thread(ui_tx, input_kill_rx))?;

    // once the bus is dropped the input thread sees its kill channel close
    let render_result = run_render_thread(bus, dashboard, buffers, clock).await;

    let input_result = input_handle
        .join()
        .map_err(|err| anyhow!("Failed to join input thread: {err:?}"))
        .and_then(|result| result);

    render_result.and(input_result)
}

async fn run_render_thread(
    bus: Bus,
    dashboard: Dashboard,
    buffers: FeedBuffers,
    clock: WallClock,
) -> Result<()> {
    let render_handle = thread::Builder::new()
        .name("render".into())
        .spawn(move || rendering::run_rendering_loop(bus, dashboard, buffers, clock))?;

    tokio::task::spawn_blocking(move || render_handle.join())
        .await?
        .map_err(|err| anyhow!("Failed to join render thread: {err:?}"))?
}
