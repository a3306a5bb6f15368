//! JSON export of the recent history window.

use std::fs;
use std::path::Path;

use chrono::{SecondsFormat, Utc};
use serde_json::json;
use tracing::info;

use crate::data::{RollingStats, ThresholdPolicy};
use crate::error::Result;
use crate::store::HistoryStore;

/// Write the `window` most recent records and their stats to `path`.
///
/// Returns the number of records written.
pub fn export_history(
    store: &dyn HistoryStore,
    window: usize,
    policy: ThresholdPolicy,
    path: &Path,
) -> Result<usize> {
    let records = store.recent(window)?;
    let stats = RollingStats::from_records(&records);

    let policy = match policy {
        ThresholdPolicy::ThreeTier {
            moderate,
            unsafe_at,
        } => json!({ "kind": "three-tier", "moderate": moderate, "unsafe": unsafe_at }),
        ThresholdPolicy::TwoTier { unsafe_at } => {
            json!({ "kind": "two-tier", "unsafe": unsafe_at })
        }
    };

    let export = json!({
        "exported_at": Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
        "store": store.description(),
        "total_records": store.len()?,
        "policy": policy,
        "stats": stats,
        "records": records,
    });

    let text = serde_json::to_string_pretty(&export)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
    fs::write(path, text)?;

    info!(path = %path.display(), records = records.len(), "history exported");
    Ok(records.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{AirQuality, HistoryRecord};
    use crate::store::MemoryStore;
    use chrono::TimeZone;
    use tempfile::TempDir;

    #[test]
    fn export_writes_window_and_stats() {
        let mut store = MemoryStore::new();
        let t = Utc.with_ymd_and_hms(2024, 6, 10, 14, 0, 0).unwrap();
        for (i, p) in [30.0, 50.0, 85.0].into_iter().enumerate() {
            let (q, _) = ThresholdPolicy::three_tier().classify(p);
            store
                .append(&HistoryRecord::new(t + chrono::Duration::seconds(i as i64), p, q))
                .unwrap();
        }

        let dir = TempDir::new().unwrap();
        let path = dir.path().join("export.json");
        let written = export_history(&store, 2, ThresholdPolicy::three_tier(), &path).unwrap();
        assert_eq!(written, 2);

        let value: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(value["total_records"], 3);
        assert_eq!(value["policy"]["kind"], "three-tier");
        assert_eq!(value["stats"]["count"], 2);
        assert_eq!(value["stats"]["max"], 85.0);
        assert_eq!(value["records"][0]["status"], AirQuality::Unsafe.as_str());
        assert_eq!(value["records"][1]["prediction"], 50.0);
    }

    #[test]
    fn export_of_empty_store_has_null_stats() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("export.json");
        let written =
            export_history(&MemoryStore::new(), 100, ThresholdPolicy::two_tier(), &path).unwrap();
        assert_eq!(written, 0);

        let value: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert!(value["stats"].is_null());
        assert_eq!(value["records"].as_array().unwrap().len(), 0);
    }
}
