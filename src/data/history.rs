//! History records and the rolling statistics shown beside the trend chart.

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::classify::AirQuality;

/// Default number of recent records the dashboard charts and aggregates.
pub const DEFAULT_HISTORY_WINDOW: usize = 100;

/// A persisted (timestamp, prediction, label) triple.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistoryRecord {
    pub time: DateTime<Utc>,
    pub prediction: f64,
    pub status: AirQuality,
}

impl HistoryRecord {
    pub fn new(time: DateTime<Utc>, prediction: f64, status: AirQuality) -> Self {
        Self {
            time,
            prediction,
            status,
        }
    }
}

/// Mean and peak over a window of records.
///
/// Always recomputed from the window handed in; nothing is carried over
/// between ticks.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RollingStats {
    pub count: usize,
    pub mean: f64,
    pub max: f64,
}

impl RollingStats {
    /// Compute stats over `records`. Returns `None` for an empty window.
    pub fn from_records(records: &[HistoryRecord]) -> Option<Self> {
        if records.is_empty() {
            return None;
        }

        let sum: f64 = records.iter().map(|r| r.prediction).sum();
        let max = records
            .iter()
            .map(|r| r.prediction)
            .fold(f64::NEG_INFINITY, f64::max);

        Some(Self {
            count: records.len(),
            mean: sum / records.len() as f64,
            max,
        })
    }
}

/// Chart points (x = position, y = prediction) from a most-recent-first
/// window, reordered oldest-first so time runs left to right.
pub fn trend_points(records: &[HistoryRecord]) -> Vec<(f64, f64)> {
    records
        .iter()
        .rev()
        .enumerate()
        .map(|(i, r)| (i as f64, r.prediction))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn record(secs: i64, prediction: f64) -> HistoryRecord {
        HistoryRecord::new(
            Utc.timestamp_opt(1_700_000_000 + secs, 0).unwrap(),
            prediction,
            AirQuality::Safe,
        )
    }

    #[test]
    fn empty_window_has_no_stats() {
        assert_eq!(RollingStats::from_records(&[]), None);
    }

    #[test]
    fn stats_cover_whole_window() {
        let window = vec![record(3, 30.0), record(2, 90.0), record(1, 60.0)];
        let stats = RollingStats::from_records(&window).unwrap();
        assert_eq!(stats.count, 3);
        assert!((stats.mean - 60.0).abs() < 1e-9);
        assert_eq!(stats.max, 90.0);
    }

    #[test]
    fn stats_follow_the_window_not_a_cache() {
        let mut window = vec![record(1, 10.0)];
        let first = RollingStats::from_records(&window).unwrap();
        window.insert(0, record(2, 50.0));
        let second = RollingStats::from_records(&window).unwrap();
        assert_eq!(first.max, 10.0);
        assert_eq!(second.max, 50.0);
        assert!((second.mean - 30.0).abs() < 1e-9);
    }

    #[test]
    fn trend_runs_oldest_first() {
        let window = vec![record(3, 3.0), record(2, 2.0), record(1, 1.0)];
        assert_eq!(
            trend_points(&window),
            vec![(0.0, 1.0), (1.0, 2.0), (2.0, 3.0)]
        );
    }
}
