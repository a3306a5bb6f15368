//! Durable history in a single SQLite table.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Local, NaiveDateTime, SecondsFormat, TimeZone, Utc};
use rusqlite::{params, Connection};
use tracing::{info, warn};

use super::HistoryStore;
use crate::data::{AirQuality, HistoryRecord};
use crate::error::{NoxError, Result};

const CREATE_TABLE: &str = "CREATE TABLE IF NOT EXISTS readings (
    time TEXT NOT NULL,
    prediction REAL,
    status TEXT NOT NULL
)";

/// A [`HistoryStore`] persisted to a SQLite database file.
///
/// Timestamps are stored as RFC 3339 UTC text with fixed microsecond
/// precision, so lexical order equals chronological order. Rows written by
/// the original Python dashboard (`YYYY-MM-DD HH:MM:SS[.ffffff]`, local
/// time) are read back too. SQLite stores a NaN prediction as NULL; NULL
/// reads back as NaN.
#[derive(Debug)]
pub struct SqliteStore {
    conn: Connection,
    path: Option<PathBuf>,
    description: String,
}

impl SqliteStore {
    /// Open (or create) the database at `path` and ensure the table exists.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)?;
        if let Err(err) = conn.pragma_update(None, "journal_mode", "WAL") {
            warn!("failed to enable WAL mode: {err}");
        }

        let store = Self::init(conn, Some(path.to_path_buf()), format!("sqlite: {}", path.display()))?;
        info!(path = %path.display(), records = store.len()?, "history store opened");
        Ok(store)
    }

    /// An in-memory database, mostly for tests.
    pub fn open_in_memory() -> Result<Self> {
        Self::init(Connection::open_in_memory()?, None, "sqlite: :memory:".to_string())
    }

    fn init(conn: Connection, path: Option<PathBuf>, description: String) -> Result<Self> {
        conn.execute(CREATE_TABLE, [])?;
        Ok(Self {
            conn,
            path,
            description,
        })
    }

    /// Database file, if this store is file-backed.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }
}

fn format_time(time: &DateTime<Utc>) -> String {
    time.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Naive timestamp layout of Python's sqlite3 datetime adapter.
const LEGACY_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f";

fn parse_time(value: &str) -> Result<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Ok(dt.with_timezone(&Utc));
    }

    let naive = NaiveDateTime::parse_from_str(value, LEGACY_TIME_FORMAT)
        .map_err(|err| NoxError::CorruptRecord(format!("invalid time '{value}': {err}")))?;
    Local
        .from_local_datetime(&naive)
        .earliest()
        .map(|dt| dt.with_timezone(&Utc))
        .ok_or_else(|| NoxError::CorruptRecord(format!("nonexistent local time '{value}'")))
}

impl HistoryStore for SqliteStore {
    fn append(&mut self, record: &HistoryRecord) -> Result<()> {
        self.conn.execute(
            "INSERT INTO readings (time, prediction, status) VALUES (?1, ?2, ?3)",
            params![
                format_time(&record.time),
                record.prediction,
                record.status.as_str()
            ],
        )?;
        Ok(())
    }

    fn recent(&self, n: usize) -> Result<Vec<HistoryRecord>> {
        let limit = i64::try_from(n).unwrap_or(i64::MAX);
        let mut stmt = self.conn.prepare_cached(
            "SELECT time, prediction, status FROM readings
             ORDER BY time DESC, rowid DESC
             LIMIT ?1",
        )?;

        let rows = stmt.query_map(params![limit], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, Option<f64>>(1)?,
                row.get::<_, String>(2)?,
            ))
        })?;

        let mut records = Vec::new();
        for row in rows {
            let (time, prediction, status) = row?;
            records.push(HistoryRecord {
                time: parse_time(&time)?,
                prediction: prediction.unwrap_or(f64::NAN),
                status: status.parse::<AirQuality>()?,
            });
        }
        Ok(records)
    }

    fn len(&self) -> Result<usize> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM readings", [], |row| row.get(0))?;
        Ok(usize::try_from(count).unwrap_or(0))
    }

    fn description(&self) -> &str {
        &self.description
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::contract;
    use chrono::TimeZone;
    use tempfile::TempDir;

    #[test]
    fn test_empty_store() {
        contract::empty_store_returns_nothing(&SqliteStore::open_in_memory().unwrap());
    }

    #[test]
    fn test_short_history() {
        contract::short_history_returns_what_exists(&mut SqliteStore::open_in_memory().unwrap());
    }

    #[test]
    fn test_reverse_insertion_order() {
        contract::recent_is_reverse_insertion_order(&mut SqliteStore::open_in_memory().unwrap());
    }

    #[test]
    fn test_ties() {
        contract::ties_break_by_insertion_order(&mut SqliteStore::open_in_memory().unwrap());
    }

    #[test]
    fn test_status_round_trip() {
        contract::status_survives_storage(&mut SqliteStore::open_in_memory().unwrap());
    }

    #[test]
    fn test_history_persists_across_reopen() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("data").join("nox_data.db");

        {
            let mut store = SqliteStore::open(&path).unwrap();
            assert_eq!(store.path(), Some(path.as_path()));
            let t = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
            store
                .append(&HistoryRecord::new(t, 81.5, AirQuality::Unsafe))
                .unwrap();
        }

        let store = SqliteStore::open(&path).unwrap();
        assert_eq!(store.len().unwrap(), 1);
        let recent = store.recent(10).unwrap();
        assert_eq!(recent[0].prediction, 81.5);
        assert_eq!(recent[0].status, AirQuality::Unsafe);
    }

    #[test]
    fn test_uses_the_original_table_layout() {
        let store = SqliteStore::open_in_memory().unwrap();
        store
            .conn
            .execute(
                "INSERT INTO readings VALUES (?1, ?2, ?3)",
                params!["2024-01-01T00:00:00.000000Z", 12.0, "SAFE"],
            )
            .unwrap();
        let recent = store.recent(1).unwrap();
        assert_eq!(recent[0].status, AirQuality::Safe);
    }

    #[test]
    fn test_reads_rows_written_by_the_python_dashboard() {
        let store = SqliteStore::open_in_memory().unwrap();
        store
            .conn
            .execute(
                "INSERT INTO readings VALUES (?1, ?2, ?3)",
                params!["2024-06-10 14:00:00.123456", 45.0, "MODERATE"],
            )
            .unwrap();
        store
            .conn
            .execute(
                "INSERT INTO readings VALUES (?1, ?2, ?3)",
                params!["2024-06-10 14:00:03", 12.0, "SAFE"],
            )
            .unwrap();

        let recent = store.recent(2).unwrap();
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].prediction, 12.0);
        assert_eq!(recent[1].status, AirQuality::Moderate);

        let naive = NaiveDateTime::parse_from_str("2024-06-10 14:00:00.123456", LEGACY_TIME_FORMAT)
            .unwrap();
        let expected = Local
            .from_local_datetime(&naive)
            .earliest()
            .unwrap()
            .with_timezone(&Utc);
        assert_eq!(recent[1].time, expected);
    }

    #[test]
    fn test_nan_prediction_is_stored_and_read_back() {
        let mut store = SqliteStore::open_in_memory().unwrap();
        let t = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        store
            .append(&HistoryRecord::new(t, f64::NAN, AirQuality::Unsafe))
            .unwrap();

        let recent = store.recent(1).unwrap();
        assert!(recent[0].prediction.is_nan());
        assert_eq!(recent[0].status, AirQuality::Unsafe);
    }

    #[test]
    fn test_corrupt_status_is_reported() {
        let store = SqliteStore::open_in_memory().unwrap();
        store
            .conn
            .execute(
                "INSERT INTO readings VALUES (?1, ?2, ?3)",
                params!["2024-01-01T00:00:00.000000Z", 12.0, "GREEN"],
            )
            .unwrap();
        assert!(matches!(store.recent(1), Err(NoxError::CorruptRecord(_))));
    }

    #[test]
    fn test_time_ordering_is_chronological() {
        let mut store = SqliteStore::open_in_memory().unwrap();
        // Inserted out of order; sub-second precision must sort correctly.
        let base = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 9).unwrap();
        let later = base + chrono::Duration::milliseconds(1_500);
        store
            .append(&HistoryRecord::new(later, 2.0, AirQuality::Safe))
            .unwrap();
        store
            .append(&HistoryRecord::new(base, 1.0, AirQuality::Safe))
            .unwrap();
        let predictions: Vec<f64> = store.recent(2).unwrap().iter().map(|r| r.prediction).collect();
        assert_eq!(predictions, vec![2.0, 1.0]);
    }
}
