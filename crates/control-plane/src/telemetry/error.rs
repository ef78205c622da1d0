//! Telemetry store error types.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur during telemetry store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Failed to read or write the backing file.
    #[error("io error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Backing file exists but does not hold a valid record list.
    #[error("corrupt telemetry log at {path}: {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Failed to serialize the log.
    #[error("json serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    /// Record rejected before it reached the log.
    #[error("invalid execution record: {0}")]
    InvalidRecord(String),
}

/// Result type for telemetry store operations.
pub type Result<T> = std::result::Result<T, StoreError>;

impl StoreError {
    /// Create an IO error with the given path.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
