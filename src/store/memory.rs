//! Session-scoped history held in memory.

use super::HistoryStore;
use crate::data::HistoryRecord;
use crate::error::Result;

/// A [`HistoryStore`] that lives as long as the process.
///
/// Records are kept in insertion order; `recent` walks the vector from the
/// back, so ties on timestamp naturally come out newest-inserted first.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    records: Vec<HistoryRecord>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl HistoryStore for MemoryStore {
    fn append(&mut self, record: &HistoryRecord) -> Result<()> {
        self.records.push(record.clone());
        Ok(())
    }

    fn recent(&self, n: usize) -> Result<Vec<HistoryRecord>> {
        Ok(self.records.iter().rev().take(n).cloned().collect())
    }

    fn len(&self) -> Result<usize> {
        Ok(self.records.len())
    }

    fn description(&self) -> &str {
        "memory (session)"
    }
}
