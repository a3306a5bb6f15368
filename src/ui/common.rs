//! Common UI components: header bar, status bar, and help overlay.

use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

use crate::app::App;
use crate::data::duration::format_duration;

/// Render the header bar.
///
/// Displays: current band indicator, band label, stored record count,
/// store and model.
pub fn render_header(frame: &mut Frame, app: &App, area: Rect) {
    let Some(ref report) = app.latest else {
        let line = Line::from(vec![
            Span::styled(
                " NOX CONTROL CENTER ",
                Style::default().add_modifier(Modifier::BOLD),
            ),
            Span::raw("| Waiting for first reading..."),
        ]);
        frame.render_widget(Paragraph::new(line), area);
        return;
    };

    let line = Line::from(vec![
        Span::styled(" ● ", app.theme.hint_style(report.style)),
        Span::styled(
            "NOX CONTROL CENTER ",
            Style::default().add_modifier(Modifier::BOLD),
        ),
        Span::raw("│ "),
        Span::styled(
            report.quality.as_str(),
            Style::default().fg(app.theme.status_color(report.quality)),
        ),
        Span::raw(" │ "),
        Span::styled(
            format!("{}", report.total_records),
            Style::default().add_modifier(Modifier::BOLD),
        ),
        Span::raw(" stored │ "),
        Span::raw(app.store_description().to_string()),
        Span::raw(" │ "),
        Span::styled(
            app.model_description().to_string(),
            Style::default().add_modifier(Modifier::DIM),
        ),
    ]);

    frame.render_widget(Paragraph::new(line), area);
}

/// Render the status bar at the bottom.
///
/// Shows time since the last tick, the refresh cadence and the controls,
/// or a temporary status message.
pub fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    if let Some(msg) = app.get_status_message() {
        let paragraph =
            Paragraph::new(format!(" {} ", msg)).style(Style::default().fg(app.theme.highlight));
        frame.render_widget(paragraph, area);
        return;
    }

    let updated = match app.since_last_tick() {
        Some(elapsed) => format!("Updated {}s ago", elapsed.as_secs()),
        None => "Not updated yet".to_string(),
    };

    let status = format!(
        " {} | every {} | r:refresh e:export ?:help q:quit",
        updated,
        format_duration(app.refresh_interval())
    );

    let paragraph = Paragraph::new(status).style(Style::default().add_modifier(Modifier::DIM));
    frame.render_widget(paragraph, area);
}

/// Render the help overlay, centered over `area`.
pub fn render_help(frame: &mut Frame, app: &App, area: Rect) {
    let help_text = vec![
        Line::from(vec![Span::styled("Keyboard Shortcuts", app.theme.header)]),
        Line::from(""),
        Line::from("  r         Refresh now"),
        Line::from("  e         Export history to JSON"),
        Line::from("  ?         Toggle this help"),
        Line::from("  q / Esc   Quit"),
        Line::from(""),
        Line::from(vec![Span::styled(
            "Press any key to close",
            Style::default().add_modifier(Modifier::DIM),
        )]),
    ];

    let block = Block::default()
        .title(" Help ")
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.highlight));

    let paragraph = Paragraph::new(help_text).block(block);

    let help_width = 40u16.min(area.width.saturating_sub(4));
    let help_height = 10u16.min(area.height.saturating_sub(2));
    let x = area.x + (area.width.saturating_sub(help_width)) / 2;
    let y = area.y + (area.height.saturating_sub(help_height)) / 2;
    let help_area = Rect::new(x, y, help_width, help_height);

    frame.render_widget(Clear, help_area);
    frame.render_widget(paragraph, help_area);
}
