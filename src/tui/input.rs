use anyhow::Result;
use std::time::Duration;

use crossterm::event::{Event, KeyCode, KeyEventKind, KeyModifiers};
use flume::{Receiver, Sender};

use crate::core::bus::UiToCore;

/// Forward terminal events to the render loop until told to stop
pub fn run_input_thread(ui_tx: Sender<UiToCore>, kill_rx: Receiver<()>) -> Result<()> {
    log::info!("🎹 Input thread started");
    loop {
        if crossterm::event::poll(Duration::from_millis(100))? {
            let event = crossterm::event::read()?;
            log::debug!("⌨️ Received event: {event:?}");
            if let Some(message) = map_event(&event) {
                if ui_tx.send(message).is_err() {
                    break;
                }
            }
        }

        // the render loop drops its sender on every exit path
        if !matches!(kill_rx.try_recv(), Err(flume::TryRecvError::Empty)) {
            break;
        }
    }

    log::info!("Input thread stopped");
    Ok(())
}

/// `q`, `Esc` and `Ctrl+C` quit; a resize forces a full redraw.
pub fn map_event(event: &Event) -> Option<UiToCore> {
    match event {
        Event::Key(key) if key.kind == KeyEventKind::Press => match key.code {
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                Some(UiToCore::Quit)
            }
            KeyCode::Char('q') | KeyCode::Esc => Some(UiToCore::Quit),
            _ => None,
        },
        Event::Resize(_, _) => Some(UiToCore::Redraw),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyEvent;

    fn key(code: KeyCode, modifiers: KeyModifiers) -> Event {
        Event::Key(KeyEvent::new(code, modifiers))
    }

    #[test]
    fn test_quit_keys() {
        assert_eq!(map_event(&key(KeyCode::Char('q'), KeyModifiers::NONE)), Some(UiToCore::Quit));
        assert_eq!(map_event(&key(KeyCode::Esc, KeyModifiers::NONE)), Some(UiToCore::Quit));
        assert_eq!(
            map_event(&key(KeyCode::Char('c'), KeyModifiers::CONTROL)),
            Some(UiToCore::Quit)
        );
        assert_eq!(map_event(&key(KeyCode::Char('c'), KeyModifiers::NONE)), None);
    }

    #[test]
    fn test_resize_redraws() {
        assert_eq!(map_event(&Event::Resize(80, 24)), Some(UiToCore::Redraw));
    }

    #[test]
    fn test_key_release_is_ignored() {
        let mut release = KeyEvent::new(KeyCode::Char('q'), KeyModifiers::NONE);
        release.kind = KeyEventKind::Release;
        assert_eq!(map_event(&Event::Key(release)), None);
    }
}
