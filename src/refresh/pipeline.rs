//! One tick of the dashboard: sample, predict, classify, store, aggregate.

use chrono::{DateTime, Local, SubsecRound, Utc};
use serde::Serialize;

use crate::data::{
    AirQuality, HistoryRecord, Reading, RollingStats, StyleHint, ThresholdPolicy,
    DEFAULT_HISTORY_WINDOW,
};
use crate::error::Result;
use crate::model::Predictor;
use crate::source::ReadingSource;
use crate::store::HistoryStore;

/// Everything the renderer needs from a single tick.
#[derive(Debug, Clone, Serialize)]
pub struct TickReport {
    /// 1-based tick number within the current run.
    pub seq: u64,
    pub time: DateTime<Utc>,
    pub reading: Reading,
    pub prediction: f64,
    pub quality: AirQuality,
    #[serde(skip)]
    pub style: StyleHint,
    /// Stats over `window`; `None` only if the store returned nothing.
    pub stats: Option<RollingStats>,
    /// Most recent records, newest first, including this tick's.
    pub window: Vec<HistoryRecord>,
    /// Records in the store after this tick, beyond the window too.
    pub total_records: usize,
}

/// The sample → predict → classify → append chain.
///
/// Owns the history store; nothing else keeps state across ticks.
#[derive(Debug)]
pub struct Pipeline {
    source: Box<dyn ReadingSource>,
    predictor: Predictor,
    policy: ThresholdPolicy,
    store: Box<dyn HistoryStore>,
    window: usize,
}

impl Pipeline {
    pub fn new(
        source: Box<dyn ReadingSource>,
        predictor: Predictor,
        policy: ThresholdPolicy,
        store: Box<dyn HistoryStore>,
    ) -> Self {
        Self {
            source,
            predictor,
            policy,
            store,
            window: DEFAULT_HISTORY_WINDOW,
        }
    }

    /// Number of recent records charted and aggregated each tick.
    pub fn with_window(mut self, window: usize) -> Self {
        self.window = window.max(1);
        self
    }

    /// Run one tick at wall-clock time `now`.
    ///
    /// Any error aborts the tick; a record is only appended once the
    /// prediction succeeded.
    pub fn tick(&mut self, now: DateTime<Utc>) -> Result<TickReport> {
        let time = now.trunc_subsecs(6);
        let reading = self
            .source
            .sample(time.with_timezone(&Local).naive_local());
        let prediction = self.predictor.predict(&reading)?;
        let (quality, style) = self.policy.classify(prediction);

        self.store
            .append(&HistoryRecord::new(time, prediction, quality))?;

        let (window, stats) = self.snapshot()?;
        let total_records = self.store.len()?;

        Ok(TickReport {
            seq: 0,
            time,
            reading,
            prediction,
            quality,
            style,
            stats,
            window,
            total_records,
        })
    }

    /// Current history window and its stats, without ticking.
    pub fn snapshot(&self) -> Result<(Vec<HistoryRecord>, Option<RollingStats>)> {
        let window = self.store.recent(self.window)?;
        let stats = RollingStats::from_records(&window);
        Ok((window, stats))
    }

    pub fn policy(&self) -> ThresholdPolicy {
        self.policy
    }

    pub fn window(&self) -> usize {
        self.window
    }

    pub fn store(&self) -> &dyn HistoryStore {
        self.store.as_ref()
    }

    pub fn predictor(&self) -> &Predictor {
        &self.predictor
    }

    pub fn source_description(&self) -> &str {
        self.source.description()
    }
}
