//! Main dashboard view.
//!
//! Left column: current sensor values and the prediction trend. Right
//! column: predicted NOx, the air-quality band with its alert, and rolling
//! statistics over the history window.

use ratatui::{
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Modifier, Style},
    symbols,
    text::{Line, Span},
    widgets::{Axis, Block, Borders, Cell, Chart, Dataset, GraphType, Paragraph, Row, Table},
    Frame,
};

use crate::app::App;
use crate::data::{trend_points, Feature, PolicyKind};
use crate::refresh::TickReport;

/// Render the dashboard into `area`.
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let Some(ref report) = app.latest else {
        let paragraph = Paragraph::new("Waiting for first reading...")
            .alignment(Alignment::Center)
            .block(block(app, " NOx "));
        frame.render_widget(paragraph, area);
        return;
    };

    let [left, right] =
        Layout::horizontal([Constraint::Fill(2), Constraint::Fill(1)]).areas(area);
    let [sensors, trend] =
        Layout::vertical([Constraint::Length(Feature::ALL.len() as u16 + 3), Constraint::Min(6)])
            .areas(left);
    let [prediction, status, stats] = Layout::vertical([
        Constraint::Length(4),
        Constraint::Length(4),
        Constraint::Min(6),
    ])
    .areas(right);

    render_sensors(frame, app, report, sensors);
    render_trend(frame, app, trend);
    render_prediction(frame, app, report, prediction);
    render_status(frame, app, report, status);
    render_stats(frame, app, stats);
}

fn block<'a>(app: &App, title: &'a str) -> Block<'a> {
    Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.border))
}

fn render_sensors(frame: &mut Frame, app: &App, report: &TickReport, area: Rect) {
    let header = Row::new(vec![Cell::from("Sensor"), Cell::from("Value")]).style(app.theme.header);

    let rows: Vec<Row> = report
        .reading
        .fields()
        .map(|(feature, value)| {
            let value = if feature.is_calendar() {
                format!("{value:.0}")
            } else {
                format!("{value:.2}")
            };
            Row::new(vec![Cell::from(feature.label()), Cell::from(value)])
        })
        .collect();

    let title = format!(" Sensors ({}) ", app.source_description());
    let table = Table::new(rows, [Constraint::Fill(2), Constraint::Fill(1)])
        .header(header)
        .block(block(app, &title));

    frame.render_widget(table, area);
}

fn render_trend(frame: &mut Frame, app: &App, area: Rect) {
    let points = trend_points(app.window());
    let lines = app.policy().lines();

    let x_max = (points.len().max(2) - 1) as f64;
    let y_max = points
        .iter()
        .map(|&(_, y)| y)
        .chain(lines.iter().map(|&(_, y)| y))
        .fold(0.0, f64::max)
        * 1.1;
    let y_max = if y_max > 0.0 { y_max } else { 1.0 };

    let threshold_points: Vec<Vec<(f64, f64)>> = lines
        .iter()
        .map(|&(_, y)| vec![(0.0, y), (x_max, y)])
        .collect();

    let mut datasets = vec![Dataset::default()
        .name("NOx")
        .marker(symbols::Marker::Braille)
        .graph_type(GraphType::Line)
        .style(Style::default().fg(app.theme.trend))
        .data(&points)];
    for ((quality, _), data) in lines.iter().zip(&threshold_points) {
        datasets.push(
            Dataset::default()
                .name(quality.as_str())
                .marker(symbols::Marker::Dot)
                .graph_type(GraphType::Line)
                .style(Style::default().fg(app.theme.status_color(*quality)))
                .data(data),
        );
    }

    let chart = Chart::new(datasets)
        .block(block(app, " Trend "))
        .x_axis(
            Axis::default()
                .style(Style::default().fg(app.theme.border))
                .bounds([0.0, x_max]),
        )
        .y_axis(
            Axis::default()
                .style(Style::default().fg(app.theme.border))
                .bounds([0.0, y_max])
                .labels(vec![
                    Span::raw("0"),
                    Span::raw(format!("{:.0}", y_max / 2.0)),
                    Span::raw(format!("{:.0}", y_max)),
                ]),
        );

    frame.render_widget(chart, area);
}

fn render_prediction(frame: &mut Frame, app: &App, report: &TickReport, area: Rect) {
    let text = vec![
        Line::from(Span::styled(
            format!("{:.2}", report.prediction),
            Style::default()
                .fg(app.theme.status_color(report.quality))
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(
            "µg/m³",
            Style::default().add_modifier(Modifier::DIM),
        )),
    ];
    let paragraph = Paragraph::new(text)
        .alignment(Alignment::Center)
        .block(block(app, " Predicted NOx "));
    frame.render_widget(paragraph, area);
}

fn render_status(frame: &mut Frame, app: &App, report: &TickReport, area: Rect) {
    let mut text = vec![Line::from(Span::styled(
        format!(" {} ", report.quality.as_str()),
        app.theme.hint_style(report.style),
    ))];
    if let Some(alert) = report.quality.alert() {
        text.push(Line::from(Span::styled(
            alert,
            Style::default()
                .fg(app.theme.status_color(report.quality))
                .add_modifier(Modifier::BOLD),
        )));
    }
    let paragraph = Paragraph::new(text)
        .alignment(Alignment::Center)
        .block(block(app, " Air Quality "));
    frame.render_widget(paragraph, area);
}

fn render_stats(frame: &mut Frame, app: &App, area: Rect) {
    let (average, peak, count) = match app.stats() {
        Some(s) => (format!("{:.2}", s.mean), format!("{:.2}", s.max), s.count),
        None => ("-".to_string(), "-".to_string(), 0),
    };

    let policy = match app.policy().kind() {
        PolicyKind::ThreeTier => "three-tier",
        PolicyKind::TwoTier => "two-tier",
    };

    let label = Style::default().add_modifier(Modifier::BOLD);
    let text = vec![
        Line::from(vec![Span::styled("Average  ", label), Span::raw(average)]),
        Line::from(vec![Span::styled("Peak     ", label), Span::raw(peak)]),
        Line::from(vec![
            Span::styled("Samples  ", label),
            Span::raw(format!("{}/{}", count, app.history_window())),
        ]),
        Line::from(vec![Span::styled("Policy   ", label), Span::raw(policy)]),
    ];
    let paragraph = Paragraph::new(text).block(block(app, " Statistics "));
    frame.render_widget(paragraph, area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::tests::scenario_app;
    use crate::data::ThresholdPolicy;
    use ratatui::{backend::TestBackend, Terminal};

    fn draw(app: &App) -> String {
        let mut terminal = Terminal::new(TestBackend::new(100, 32)).unwrap();
        terminal
            .draw(|frame| render(frame, app, frame.area()))
            .unwrap();
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    #[test]
    fn placeholder_before_first_tick() {
        let app = scenario_app(45.0, ThresholdPolicy::three_tier());
        assert!(draw(&app).contains("Waiting for first reading..."));
    }

    #[test]
    fn moderate_reading_shows_band_and_alert() {
        let mut app = scenario_app(45.0, ThresholdPolicy::three_tier());
        app.update().unwrap();
        let screen = draw(&app);
        assert!(screen.contains("45.00"));
        assert!(screen.contains("MODERATE"));
        assert!(screen.contains("MODERATE POLLUTION"));
        assert!(screen.contains("three-tier"));
        assert!(screen.contains("Sensors (fixed)"));
    }

    #[test]
    fn safe_reading_has_no_alert() {
        let mut app = scenario_app(12.0, ThresholdPolicy::three_tier());
        app.update().unwrap();
        let screen = draw(&app);
        assert!(screen.contains("SAFE"));
        assert!(!screen.contains("POLLUTION"));
    }

    #[test]
    fn two_tier_unsafe_shows_critical_alert() {
        let mut app = scenario_app(250.0, ThresholdPolicy::two_tier());
        app.update().unwrap();
        let screen = draw(&app);
        assert!(screen.contains("CRITICAL POLLUTION ALERT"));
        assert!(screen.contains("two-tier"));
    }
}
