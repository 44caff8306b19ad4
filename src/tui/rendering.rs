use anyhow::Result;
use std::{io, time::Duration};

use ratatui::{backend::CrosstermBackend, prelude::*};

use crate::{
    core::{
        bus::{Bus, UiToCore},
        clock::Clock,
    },
    dashboard::{Dashboard, RefreshContext},
    feed::FeedBuffers,
    tui::ui::render_dashboard,
};

/// Upper bound on how long the loop sleeps between two checks.
const MAX_WAIT: Duration = Duration::from_millis(250);

pub(crate) fn run_rendering_loop<C: Clock>(
    bus: Bus,
    mut dashboard: Dashboard,
    buffers: FeedBuffers,
    clock: C,
) -> Result<()> {
    // the terminal is created and dropped on this thread only
    let mut stdout = io::stdout();
    crossterm::terminal::enable_raw_mode()?;
    crossterm::execute!(
        stdout,
        crossterm::terminal::EnterAlternateScreen,
        crossterm::cursor::Hide
    )?;
    let backend = CrosstermBackend::new(&mut stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = drive(&mut terminal, &bus, &mut dashboard, &buffers, &clock)
        .and_then(|()| terminal.clear().map_err(Into::into));

    if bus.kill_tx.send(()).is_err() {
        log::debug!("input thread already gone");
    }

    crossterm::execute!(
        io::stdout(),
        crossterm::terminal::LeaveAlternateScreen,
        crossterm::cursor::Show
    )?;
    crossterm::terminal::disable_raw_mode()?;

    result
}

/// Refresh and draw until the input side asks to quit or hangs up.
///
/// A frame is drawn only after a refresh callback changed a panel or the
/// terminal was resized; ratatui then writes only the cells that differ from
/// the previous frame.
pub fn drive<B: Backend, C: Clock>(
    terminal: &mut Terminal<B>,
    bus: &Bus,
    dashboard: &mut Dashboard,
    buffers: &FeedBuffers,
    clock: &C,
) -> Result<()> {
    let mut dirty = true;
    let mut frames = 0u64;

    loop {
        let ctx = RefreshContext {
            buffers,
            elapsed: clock.elapsed(),
        };
        dirty |= dashboard.refresh(&ctx);

        if dirty {
            terminal.draw(|frame| render_dashboard(frame, dashboard))?;
            frames += 1;
            dirty = false;
        }

        let wait = dashboard
            .next_deadline()
            .map(|deadline| deadline.saturating_sub(clock.elapsed()))
            .unwrap_or(MAX_WAIT)
            .min(MAX_WAIT);

        match bus.ui_rx.recv_timeout(wait) {
            Ok(UiToCore::Quit) => {
                log::info!("Quit requested after {frames} frames");
                return Ok(());
            }
            Ok(UiToCore::Redraw) => dirty = true,
            Err(flume::RecvTimeoutError::Timeout) => {}
            Err(flume::RecvTimeoutError::Disconnected) => {
                log::info!("Input channel closed, leaving render loop");
                return Ok(());
            }
        }
    }
}
