//! Theme configuration for the TUI.
//!
//! Supports light and dark themes with automatic terminal detection.

use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::block::BorderType;

use crate::data::{AirQuality, StyleHint};

/// Color and style theme for the TUI.
///
/// Use [`Theme::auto_detect()`] for automatic theme selection based on
/// terminal background, or [`Theme::dark()`]/[`Theme::light()`] explicitly.
#[derive(Debug, Clone)]
pub struct Theme {
    /// Accent color for highlights and active elements.
    pub highlight: Color,
    /// Color for the SAFE band.
    pub safe: Color,
    /// Color for the MODERATE band.
    pub moderate: Color,
    /// Color for the UNSAFE band.
    pub unsafe_: Color,
    /// Color for borders and separators.
    pub border: Color,
    /// Color of the prediction trend line.
    pub trend: Color,
    /// Style for header rows in tables.
    pub header: Style,
    /// Border style (rounded, plain, etc.).
    pub border_type: BorderType,
}

impl Theme {
    /// Create a dark theme suitable for dark terminal backgrounds.
    pub fn dark() -> Self {
        Self {
            highlight: Color::Cyan,
            safe: Color::Green,
            moderate: Color::Yellow,
            unsafe_: Color::Red,
            border: Color::Gray,
            trend: Color::Cyan,
            header: Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            border_type: BorderType::Rounded,
        }
    }

    /// Create a light theme suitable for light terminal backgrounds.
    pub fn light() -> Self {
        Self {
            highlight: Color::Blue,
            safe: Color::Green,
            moderate: Color::Rgb(204, 120, 0),
            unsafe_: Color::Red,
            border: Color::DarkGray,
            trend: Color::Blue,
            header: Style::default().fg(Color::Blue).add_modifier(Modifier::BOLD),
            border_type: BorderType::Rounded,
        }
    }

    /// Auto-detect based on terminal background
    pub fn auto_detect() -> Self {
        // Use terminal-light crate to detect background luminance
        match terminal_light::luma() {
            Ok(luma) if luma > 0.5 => Self::light(),
            _ => Self::dark(),
        }
    }

    /// Style for a classification style class.
    pub fn hint_style(&self, hint: StyleHint) -> Style {
        match hint {
            StyleHint::Safe => Style::default().fg(self.safe).add_modifier(Modifier::BOLD),
            StyleHint::Moderate => Style::default()
                .fg(self.moderate)
                .add_modifier(Modifier::BOLD),
            StyleHint::Unsafe => Style::default()
                .fg(self.unsafe_)
                .add_modifier(Modifier::BOLD | Modifier::REVERSED),
        }
    }

    /// Get style for an air quality band
    pub fn status_style(&self, status: AirQuality) -> Style {
        self.hint_style(status.style_hint())
    }

    /// Plain foreground color for a band (chart lines, alerts).
    pub fn status_color(&self, status: AirQuality) -> Color {
        match status {
            AirQuality::Safe => self.safe,
            AirQuality::Moderate => self.moderate,
            AirQuality::Unsafe => self.unsafe_,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn each_band_has_a_distinct_style() {
        let theme = Theme::dark();
        let safe = theme.status_style(AirQuality::Safe);
        let moderate = theme.status_style(AirQuality::Moderate);
        let unsafe_ = theme.status_style(AirQuality::Unsafe);
        assert_ne!(safe, moderate);
        assert_ne!(moderate, unsafe_);
        assert_ne!(safe, unsafe_);
    }
}
