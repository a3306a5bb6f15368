use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyModifiers};
use tracing::warn;

use crate::app::App;

/// File written by the export key.
pub const EXPORT_PATH: &str = "nox_export.json";

/// Poll for events with a timeout
pub fn poll_event(timeout: Duration) -> Result<Option<Event>> {
    if event::poll(timeout)? {
        Ok(Some(event::read()?))
    } else {
        Ok(None)
    }
}

/// Handle a key event.
///
/// A failed manual refresh is returned so the dashboard ends the same way
/// it does when a scheduled tick fails.
pub fn handle_key_event(app: &mut App, key: KeyEvent) -> Result<()> {
    // If help is shown, any key closes it
    if app.show_help {
        app.show_help = false;
        return Ok(());
    }

    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => app.quit(),
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => app.quit(),

        KeyCode::Char('r') => {
            app.refresh_now()?;
            app.set_status_message("Refreshed".to_string());
        }

        KeyCode::Char('?') => app.toggle_help(),

        KeyCode::Char('e') => {
            let export_path = PathBuf::from(EXPORT_PATH);
            match app.export_state(&export_path) {
                Ok(n) => {
                    app.set_status_message(format!(
                        "Exported {} records to {}",
                        n,
                        export_path.display()
                    ));
                }
                Err(e) => {
                    warn!(error = %e, "export failed");
                    app.set_status_message(format!("Export failed: {}", e));
                }
            }
        }

        _ => {}
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::tests::scenario_app;
    use crate::data::ThresholdPolicy;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn quit_keys_stop_the_app() {
        for event in [
            key(KeyCode::Char('q')),
            key(KeyCode::Esc),
            KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL),
        ] {
            let mut app = scenario_app(45.0, ThresholdPolicy::three_tier());
            handle_key_event(&mut app, event).unwrap();
            assert!(!app.running);
        }
    }

    #[test]
    fn refresh_key_ticks_immediately() {
        let mut app = scenario_app(45.0, ThresholdPolicy::three_tier());
        handle_key_event(&mut app, key(KeyCode::Char('r'))).unwrap();
        assert_eq!(app.tick_count(), 1);
        assert!(app.latest.is_some());
    }

    #[test]
    fn any_key_closes_help_without_acting() {
        let mut app = scenario_app(45.0, ThresholdPolicy::three_tier());
        handle_key_event(&mut app, key(KeyCode::Char('?'))).unwrap();
        assert!(app.show_help);
        handle_key_event(&mut app, key(KeyCode::Char('q'))).unwrap();
        assert!(!app.show_help);
        assert!(app.running);
    }
}
