use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    event::{Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Color, Style},
    widgets::Paragraph,
    Terminal,
};
use tracing::info;

use noxwatch::config::StorageBackend;
use noxwatch::data::duration::parse_duration;
use noxwatch::events;
use noxwatch::export::export_history;
use noxwatch::logging::{self, LogTarget};
use noxwatch::ui::{self, Theme};
use noxwatch::{
    App, HistoryStore, MemoryStore, Pipeline, PolicyKind, Predictor, RefreshLoop, Settings,
    SimulatedSensors, SqliteStore, TickReport,
};

#[derive(Parser, Debug)]
#[command(name = "noxwatch")]
#[command(about = "Live NOx prediction dashboard for the terminal")]
struct Args {
    /// Settings file (TOML). Skipped if the default is missing.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Path to the model artifact (JSON)
    #[arg(short, long)]
    model: Option<PathBuf>,

    /// Path to the SQLite history database
    #[arg(long, conflicts_with = "memory")]
    db: Option<PathBuf>,

    /// Keep history in memory for this session only
    #[arg(long)]
    memory: bool,

    /// Refresh interval (e.g., "2s", "500ms")
    #[arg(short, long)]
    interval: Option<String>,

    /// Classification policy: "three-tier" or "two-tier"
    #[arg(short, long)]
    policy: Option<String>,

    /// Run without the TUI, printing one line per tick
    #[arg(long)]
    headless: bool,

    /// Stop after this many ticks (headless only)
    #[arg(short, long, requires = "headless")]
    ticks: Option<u64>,

    /// Export the recent history window to a JSON file and exit
    #[arg(short, long, conflicts_with_all = ["headless", "ticks"])]
    export: Option<PathBuf>,
}

const DEFAULT_CONFIG: &str = "noxwatch.toml";

fn main() -> Result<()> {
    let args = Args::parse();
    let settings = load_settings(&args)?;

    let log_target = if args.headless || args.export.is_some() {
        LogTarget::Stderr
    } else {
        LogTarget::File(settings.log.file.clone())
    };
    logging::init(&settings.log.level, log_target)?;

    // Handle export mode (non-interactive)
    if let Some(ref export_path) = args.export {
        return export_to_file(&settings, export_path);
    }

    let pipeline = build_pipeline(&settings)?;

    if args.headless {
        run_headless(pipeline, settings.refresh_interval()?, args.ticks)
    } else {
        run_tui(pipeline, settings.tui_interval()?)
    }
}

/// Layer CLI flags over the file and environment settings.
fn load_settings(args: &Args) -> Result<Settings> {
    let (path, required) = match args.config {
        Some(ref path) => (path.clone(), true),
        None => (PathBuf::from(DEFAULT_CONFIG), false),
    };
    let mut settings = Settings::load(Some(path.as_path()), required)
        .with_context(|| format!("failed to load settings from {}", path.display()))?;

    if let Some(ref model) = args.model {
        settings.model_path = model.clone();
    }
    if let Some(ref db) = args.db {
        settings.storage.backend = StorageBackend::Sqlite;
        settings.storage.path = db.clone();
    }
    if args.memory {
        settings.storage.backend = StorageBackend::Memory;
    }
    if let Some(ref interval) = args.interval {
        parse_duration(interval).context("invalid --interval")?;
        settings.refresh.interval = interval.clone();
        settings.refresh.tui_interval = interval.clone();
    }
    if let Some(ref policy) = args.policy {
        let kind: PolicyKind = policy.parse().context("invalid --policy")?;
        if kind != settings.thresholds.policy {
            settings.thresholds.policy = kind;
            settings.thresholds.moderate = None;
            settings.thresholds.unsafe_at = None;
        }
    }

    settings.validate()?;
    Ok(settings)
}

fn open_store(settings: &Settings) -> Result<Box<dyn HistoryStore>> {
    Ok(match settings.storage.backend {
        StorageBackend::Sqlite => Box::new(
            SqliteStore::open(&settings.storage.path).with_context(|| {
                format!(
                    "failed to open history database {}",
                    settings.storage.path.display()
                )
            })?,
        ),
        StorageBackend::Memory => Box::new(MemoryStore::new()),
    })
}

fn build_pipeline(settings: &Settings) -> Result<Pipeline> {
    let predictor = Predictor::load(&settings.model_path).context("failed to load model")?;
    let store = open_store(settings)?;
    Ok(Pipeline::new(
        Box::new(SimulatedSensors::new()),
        predictor,
        settings.policy()?,
        store,
    )
    .with_window(settings.history_window))
}

/// Run the refresh loop without a terminal UI until stopped.
fn run_headless(pipeline: Pipeline, interval: Duration, max_ticks: Option<u64>) -> Result<()> {
    let mut refresh = RefreshLoop::new(pipeline, interval);
    let stop = refresh.stop_signal();

    let handler_stop = stop.clone();
    ctrlc::set_handler(move || handler_stop.stop()).context("failed to install Ctrl-C handler")?;

    info!(interval = ?interval, "headless run started");
    let ticks = refresh.run(|report| {
        println!("{}", tick_line(report));
        if max_ticks.is_some_and(|n| report.seq >= n) {
            stop.stop();
        }
        Ok::<_, anyhow::Error>(())
    })?;
    info!(ticks, "headless run finished");
    Ok(())
}

fn tick_line(report: &TickReport) -> String {
    let stats = match report.stats {
        Some(s) => format!("avg={:.2} peak={:.2} n={}", s.mean, s.max, s.count),
        None => "n=0".to_string(),
    };
    let alert = report
        .quality
        .alert()
        .map(|a| format!(" [{a}]"))
        .unwrap_or_default();
    format!(
        "{} nox={:.2} {}{} {}",
        report.time.format("%Y-%m-%d %H:%M:%S"),
        report.prediction,
        report.quality,
        alert,
        stats
    )
}

/// Run the TUI around a refresh loop
fn run_tui(pipeline: Pipeline, refresh_interval: Duration) -> Result<()> {
    let theme = Theme::auto_detect();

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Setup panic hook to restore terminal
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        original_hook(panic);
    }));

    let mut app = App::new(RefreshLoop::new(pipeline, refresh_interval), theme);

    // Run the main loop
    let result = run_app(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

fn run_app(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>, app: &mut App) -> Result<()> {
    // Minimum terminal size for usable display
    const MIN_WIDTH: u16 = 70;
    const MIN_HEIGHT: u16 = 20;

    // First tick before the first draw
    app.update()?;

    while app.running {
        terminal.draw(|frame| {
            let area = frame.area();

            if area.width < MIN_WIDTH || area.height < MIN_HEIGHT {
                let msg = format!(
                    "Terminal too small: {}x{}\nMinimum: {}x{}\n\nResize to continue",
                    area.width, area.height, MIN_WIDTH, MIN_HEIGHT
                );
                let paragraph = Paragraph::new(msg)
                    .alignment(Alignment::Center)
                    .style(Style::default().fg(Color::Yellow));
                let centered = Rect::new(0, (area.height / 2).saturating_sub(2), area.width, 5)
                    .intersection(area);
                frame.render_widget(paragraph, centered);
                return;
            }

            let [header, content, status] = Layout::vertical([
                Constraint::Length(1), // Header bar
                Constraint::Min(10),   // Dashboard
                Constraint::Length(1), // Status bar
            ])
            .areas(area);

            ui::common::render_header(frame, app, header);
            ui::dashboard::render(frame, app, content);
            ui::common::render_status_bar(frame, app, status);

            if app.show_help {
                ui::common::render_help(frame, app, area);
            }
        })?;

        // Poll for events with a short timeout
        if let Some(event) = events::poll_event(Duration::from_millis(100))? {
            match event {
                Event::Key(key) if key.kind == KeyEventKind::Press => {
                    events::handle_key_event(app, key)?
                }
                Event::Resize(_, _) => {
                    // Terminal will redraw on next iteration
                }
                _ => {}
            }
        }

        // Tick once the refresh interval has elapsed
        if app.running {
            app.update()?;
        }
    }

    Ok(())
}

/// Export the recent history window without starting the dashboard
fn export_to_file(settings: &Settings, export_path: &Path) -> Result<()> {
    let store = open_store(settings)?;
    let written = export_history(
        store.as_ref(),
        settings.history_window,
        settings.policy()?,
        export_path,
    )
    .with_context(|| format!("failed to export to {}", export_path.display()))?;

    println!(
        "Exported {} records from {} to: {}",
        written,
        store.description(),
        export_path.display()
    );
    Ok(())
}
