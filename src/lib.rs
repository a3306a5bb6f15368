//! # noxwatch
//!
//! A live NOx dashboard: simulated sensor readings are fed through a trained
//! regression model, the predicted concentration is classified into an
//! air-quality band, every result is appended to a history store, and the
//! recent window is rendered in a terminal UI.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │                       RefreshLoop (refresh)                      │
//! │   Clock ── interval ── StopSignal                                │
//! │      │                                                           │
//! │      ▼  tick                                                     │
//! │  ┌────────┐   ┌───────────┐   ┌──────────┐   ┌───────────────┐   │
//! │  │ source │──▶│   model   │──▶│ classify │──▶│     store     │   │
//! │  │Reading │   │ Predictor │   │ Threshold│   │ HistoryStore  │   │
//! │  └────────┘   └───────────┘   │  Policy  │   └───────┬───────┘   │
//! │                               └──────────┘           │ recent(n) │
//! │                                                      ▼           │
//! │                                              TickReport ──▶ ui   │
//! └──────────────────────────────────────────────────────────────────┘
//! ```
//!
//! - **[`source`]**: [`ReadingSource`] trait and the [`SimulatedSensors`]
//!   implementation
//! - **[`model`]**: [`Predictor`], a regression model loaded from a JSON
//!   artifact and checked against the reading schema at startup
//! - **[`data`]**: Readings, the classifier ([`ThresholdPolicy`]),
//!   history records and rolling statistics
//! - **[`store`]**: [`HistoryStore`] trait with SQLite and in-memory backends
//! - **[`refresh`]**: The per-tick [`Pipeline`] and the [`RefreshLoop`]
//!   scheduling it
//! - **[`ui`]**: Terminal rendering using ratatui
//!
//! ## Usage
//!
//! ### As a CLI tool
//!
//! ```bash
//! # Terminal dashboard with the bundled demo model
//! noxwatch --model models/nox_model.json
//!
//! # Headless: print ten ticks to stdout, keep nothing on disk
//! noxwatch --headless --ticks 10 --memory
//!
//! # Export the recent history window and exit
//! noxwatch --export history.json
//! ```
//!
//! ### As a library
//!
//! ```no_run
//! use std::path::Path;
//! use std::time::Duration;
//! use noxwatch::{MemoryStore, Pipeline, Predictor, RefreshLoop, SimulatedSensors, ThresholdPolicy};
//!
//! let predictor = Predictor::load(Path::new("models/nox_model.json"))?;
//! let pipeline = Pipeline::new(
//!     Box::new(SimulatedSensors::new()),
//!     predictor,
//!     ThresholdPolicy::three_tier(),
//!     Box::new(MemoryStore::new()),
//! );
//!
//! let mut refresh = RefreshLoop::new(pipeline, Duration::from_secs(3));
//! let stop = refresh.stop_signal();
//! refresh.run(|report| {
//!     println!("{:.2} {}", report.prediction, report.quality);
//!     if report.seq >= 3 {
//!         stop.stop();
//!     }
//!     Ok::<_, noxwatch::NoxError>(())
//! })?;
//! # Ok::<_, noxwatch::NoxError>(())
//! ```

pub mod app;
pub mod config;
pub mod data;
pub mod error;
pub mod events;
pub mod export;
pub mod logging;
pub mod model;
pub mod refresh;
pub mod source;
pub mod store;
pub mod ui;

// Re-export main types for convenience
pub use app::App;
pub use config::Settings;
pub use data::{
    AirQuality, Feature, HistoryRecord, PolicyKind, Reading, RollingStats, StyleHint,
    ThresholdPolicy,
};
pub use error::NoxError;
pub use model::{Predictor, Regressor};
pub use refresh::{Clock, Pipeline, RefreshLoop, StopSignal, SystemClock, TickReport};
pub use source::{ReadingSource, SimulatedSensors};
pub use store::{HistoryStore, MemoryStore, SqliteStore};
