//! Error types for the dashboard pipeline.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while loading, predicting, storing or configuring.
///
/// None of these are retried. Startup variants ([`NoxError::ModelLoad`],
/// [`NoxError::Storage`] on open, [`NoxError::Config`]) end the process;
/// anything raised during a tick ends the refresh loop.
#[derive(Debug, Error)]
pub enum NoxError {
    /// The model artifact is missing, unreadable or structurally invalid.
    #[error("failed to load model from {path}: {reason}")]
    ModelLoad { path: PathBuf, reason: String },

    /// The model's feature schema does not line up with [`crate::Reading`].
    #[error("feature schema mismatch: {0}")]
    SchemaMismatch(String),

    /// The persistence medium rejected a read or write.
    #[error("storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    /// A stored row could not be decoded back into a record.
    #[error("corrupt history row: {0}")]
    CorruptRecord(String),

    /// Invalid configuration value.
    #[error("configuration error: {0}")]
    Config(String),

    /// Filesystem error outside of SQLite.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl NoxError {
    pub(crate) fn model_load(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        NoxError::ModelLoad {
            path: path.into(),
            reason: reason.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, NoxError>;
