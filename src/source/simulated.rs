//! Simulated sensor source.
//!
//! Draws every continuous field independently from a fixed uniform range.
//! The values are not telemetry; they exist to exercise the model.

use std::ops::RangeInclusive;

use chrono::{Datelike, NaiveDateTime, Timelike};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::ReadingSource;
use crate::data::Reading;

/// Uniform sampling ranges for the continuous fields.
#[derive(Debug, Clone, PartialEq)]
pub struct SensorRanges {
    pub no: RangeInclusive<f64>,
    pub no2: RangeInclusive<f64>,
    pub relativehumidity: RangeInclusive<f64>,
    pub temperature: RangeInclusive<f64>,
    pub wind_direction: RangeInclusive<f64>,
    pub wind_speed: RangeInclusive<f64>,
}

impl Default for SensorRanges {
    fn default() -> Self {
        Self {
            no: 10.0..=200.0,
            no2: 10.0..=200.0,
            relativehumidity: 30.0..=90.0,
            temperature: 20.0..=50.0,
            wind_direction: 0.0..=360.0,
            wind_speed: 0.0..=10.0,
        }
    }
}

/// A [`ReadingSource`] backed by a random number generator.
#[derive(Debug)]
pub struct SimulatedSensors<R = StdRng> {
    rng: R,
    ranges: SensorRanges,
    description: String,
}

impl SimulatedSensors<StdRng> {
    /// Create a source seeded from the operating system.
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_os_rng(), "simulated sensors")
    }

    /// Create a reproducible source.
    pub fn seeded(seed: u64) -> Self {
        Self::with_rng(
            StdRng::seed_from_u64(seed),
            &format!("simulated sensors (seed {seed})"),
        )
    }
}

impl Default for SimulatedSensors<StdRng> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Rng> SimulatedSensors<R> {
    pub fn with_rng(rng: R, description: &str) -> Self {
        Self {
            rng,
            ranges: SensorRanges::default(),
            description: description.to_string(),
        }
    }

    pub fn ranges(&self) -> &SensorRanges {
        &self.ranges
    }
}

impl<R: Rng + std::fmt::Debug> ReadingSource for SimulatedSensors<R> {
    fn sample(&mut self, now: NaiveDateTime) -> Reading {
        let r = &self.ranges;
        Reading {
            no: self.rng.random_range(r.no.clone()),
            no2: self.rng.random_range(r.no2.clone()),
            relativehumidity: self.rng.random_range(r.relativehumidity.clone()),
            temperature: self.rng.random_range(r.temperature.clone()),
            wind_direction: self.rng.random_range(r.wind_direction.clone()),
            wind_speed: self.rng.random_range(r.wind_speed.clone()),
            hour: now.hour(),
            day: now.day(),
            weekday: now.weekday().num_days_from_monday(),
            month: now.month(),
        }
    }

    fn description(&self) -> &str {
        &self.description
    }
}
