//! Data models and processing for readings and predictions.
//!
//! ## Submodules
//!
//! - [`reading`]: The sensor [`Reading`] and the [`Feature`] schema shared with the model
//! - [`classify`]: Threshold policies mapping a prediction to an [`AirQuality`] band
//! - [`history`]: Persisted [`HistoryRecord`]s and [`RollingStats`] over a window
//! - [`duration`]: Parsing and formatting of duration strings (e.g., "3s", "500ms")
//!
//! ## Data Flow
//!
//! ```text
//! Reading ──▶ Predictor ──▶ f64 ──▶ ThresholdPolicy::classify()
//!                                        │
//!                                        ▼
//!                             HistoryRecord (store)
//!                                        │
//!                                        ▼
//!                        recent(n) ──▶ RollingStats + trend
//! ```

pub mod classify;
pub mod duration;
pub mod history;
pub mod reading;

pub use classify::{AirQuality, PolicyKind, StyleHint, ThresholdPolicy};
pub use history::{trend_points, HistoryRecord, RollingStats, DEFAULT_HISTORY_WINDOW};
pub use reading::{Feature, Reading};
