//! History persistence.
//!
//! Two interchangeable stores sit behind [`HistoryStore`]: a durable
//! [`SqliteStore`] and a session-scoped [`MemoryStore`]. Both are append-only
//! and never evict.

mod memory;
mod sqlite;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

use std::fmt::Debug;

use crate::data::HistoryRecord;
use crate::error::Result;

/// Append-only record of past predictions.
pub trait HistoryStore: Debug {
    /// Append a record. Records are never updated or removed afterwards.
    fn append(&mut self, record: &HistoryRecord) -> Result<()>;

    /// Up to `n` most recent records, newest first.
    ///
    /// Records with equal timestamps come back in reverse insertion order.
    /// An empty store yields an empty vector.
    fn recent(&self, n: usize) -> Result<Vec<HistoryRecord>>;

    /// Total number of stored records.
    fn len(&self) -> Result<usize>;

    fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }

    /// Returns a human-readable description of the store.
    fn description(&self) -> &str;
}
