//! Reading sources for the refresh pipeline.
//!
//! This module provides a trait-based abstraction over where each tick's
//! [`Reading`] comes from. The dashboard only ships a simulated source; the
//! trait exists so the pipeline can be driven by fixed readings in tests.

mod simulated;

pub use simulated::{SensorRanges, SimulatedSensors};

use std::fmt::Debug;

use chrono::NaiveDateTime;

use crate::data::Reading;

/// Trait for producing one reading per tick.
///
/// # Example
///
/// ```
/// use chrono::NaiveDate;
/// use noxwatch::{ReadingSource, SimulatedSensors};
///
/// let mut source = SimulatedSensors::seeded(7);
/// let now = NaiveDate::from_ymd_opt(2024, 6, 10).unwrap().and_hms_opt(14, 0, 0).unwrap();
/// let reading = source.sample(now);
/// assert_eq!(reading.hour, 14);
/// ```
pub trait ReadingSource: Debug {
    /// Produce a reading for the given local wall-clock time.
    ///
    /// `now` only feeds the calendar fields. This method cannot fail.
    fn sample(&mut self, now: NaiveDateTime) -> Reading;

    /// Returns a human-readable description of the source.
    ///
    /// Used for display in the TUI header.
    fn description(&self) -> &str;
}
