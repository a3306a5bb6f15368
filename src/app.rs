//! Application state for the terminal dashboard.

use std::path::Path;
use std::time::{Duration, Instant};

use anyhow::Result;
use tracing::info;

use crate::data::{HistoryRecord, RollingStats, ThresholdPolicy};
use crate::export::export_history;
use crate::refresh::{RefreshLoop, TickReport};
use crate::ui::Theme;

/// How long a status message stays in the status bar.
const STATUS_MESSAGE_TTL: Duration = Duration::from_secs(3);

/// Main application state.
pub struct App {
    pub running: bool,
    pub show_help: bool,

    refresh: RefreshLoop,
    /// Report from the most recent tick; `None` until the first tick.
    pub latest: Option<TickReport>,

    // UI
    pub theme: Theme,

    // Status message (temporary feedback)
    pub status_message: Option<(String, Instant)>,
}

impl App {
    /// Create a new App around a refresh loop.
    pub fn new(refresh: RefreshLoop, theme: Theme) -> Self {
        Self {
            running: true,
            show_help: false,
            refresh,
            latest: None,
            theme,
            status_message: None,
        }
    }

    /// Tick the pipeline if the refresh interval has elapsed.
    ///
    /// Returns Ok(true) if a new tick ran. A failed tick is returned as an
    /// error and ends the dashboard.
    pub fn update(&mut self) -> Result<bool> {
        match self.refresh.poll()? {
            Some(report) => {
                self.latest = Some(report);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Tick immediately, outside the schedule.
    pub fn refresh_now(&mut self) -> Result<()> {
        let report = self.refresh.tick_now()?;
        self.latest = Some(report);
        Ok(())
    }

    /// Description of the reading source.
    pub fn source_description(&self) -> &str {
        self.refresh.pipeline().source_description()
    }

    /// Description of the history store.
    pub fn store_description(&self) -> &str {
        self.refresh.pipeline().store().description()
    }

    /// Model artifact and shape.
    pub fn model_description(&self) -> &str {
        self.refresh.pipeline().predictor().description()
    }

    pub fn policy(&self) -> ThresholdPolicy {
        self.refresh.pipeline().policy()
    }

    pub fn refresh_interval(&self) -> Duration {
        self.refresh.interval()
    }

    pub fn history_window(&self) -> usize {
        self.refresh.pipeline().window()
    }

    pub fn tick_count(&self) -> u64 {
        self.refresh.ticks()
    }

    /// Time since the last tick started.
    pub fn since_last_tick(&self) -> Option<Duration> {
        self.refresh.since_last_tick()
    }

    /// Recent window from the latest tick, newest first.
    pub fn window(&self) -> &[HistoryRecord] {
        self.latest
            .as_ref()
            .map(|r| r.window.as_slice())
            .unwrap_or(&[])
    }

    pub fn stats(&self) -> Option<RollingStats> {
        self.latest.as_ref().and_then(|r| r.stats)
    }

    /// Set a temporary status message that will be shown for a few seconds.
    pub fn set_status_message(&mut self, message: String) {
        self.status_message = Some((message, Instant::now()));
    }

    /// Get the current status message if it hasn't expired.
    pub fn get_status_message(&self) -> Option<&str> {
        if let Some((msg, time)) = &self.status_message {
            if time.elapsed() < STATUS_MESSAGE_TTL {
                return Some(msg);
            }
        }
        None
    }

    /// Toggle the help overlay.
    pub fn toggle_help(&mut self) {
        self.show_help = !self.show_help;
    }

    /// Signal the application to quit.
    pub fn quit(&mut self) {
        self.running = false;
        self.refresh.stop_signal().stop();
    }

    /// Export the recent history window to a JSON file.
    pub fn export_state(&self, path: &Path) -> Result<usize> {
        let pipeline = self.refresh.pipeline();
        let written = export_history(pipeline.store(), pipeline.window(), pipeline.policy(), path)?;
        Ok(written)
    }
}

impl Drop for App {
    fn drop(&mut self) {
        info!(ticks = self.refresh.ticks(), "dashboard closed");
    }
}
