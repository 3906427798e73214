//! Import error type

use grove_core::{ExportError, MergeError, StorageError};
use thiserror::Error;

/// Errors raised by the import pipeline
#[derive(Debug, Error)]
pub enum ImportError {
    /// The request names neither files nor resume, or both
    #[error("Invalid import request: {0}")]
    InvalidRequest(String),

    /// A source file could not be read
    #[error("Failed to read {name}: {source}")]
    Read {
        name: String,
        #[source]
        source: std::io::Error,
    },

    /// The insert-before placeholder could not be created
    #[error("Failed to create placeholder: {0}")]
    Placeholder(#[source] StorageError),

    #[error("Progress store error: {0}")]
    Storage(#[from] StorageError),

    /// Structured snapshot text that does not parse
    #[error("Malformed snapshot: {0}")]
    MalformedSnapshot(#[from] serde_json::Error),

    #[error("Export error: {0}")]
    Export(#[from] ExportError),

    #[error("Merge error: {0}")]
    Merge(#[from] MergeError),

    /// The run was cancelled before it started
    #[error("Import cancelled")]
    Cancelled,
}

/// Result type for import operations
pub type ImportResult<T> = Result<T, ImportError>;
