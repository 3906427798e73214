//! Error types for the collaborator traits

use crate::types::ThoughtId;
use thiserror::Error;

/// Error type for progress store and tree storage operations
#[derive(Error, Debug, Clone)]
pub enum StorageError {
    #[error("Storage backend error: {0}")]
    Backend(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Deserialization error: {0}")]
    Deserialization(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid operation: {0}")]
    InvalidOperation(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

impl StorageError {
    /// Create a generic backend error
    pub fn backend<S: Into<String>>(msg: S) -> Self {
        Self::Backend(msg.into())
    }

    /// Create a serialization error
    pub fn serialization<S: Into<String>>(msg: S) -> Self {
        Self::Serialization(msg.into())
    }

    /// Create a deserialization error
    pub fn deserialization<S: Into<String>>(msg: S) -> Self {
        Self::Deserialization(msg.into())
    }
}

impl From<serde_json::Error> for StorageError {
    fn from(err: serde_json::Error) -> Self {
        if err.is_data() || err.is_syntax() || err.is_eof() {
            Self::Deserialization(err.to_string())
        } else {
            Self::Serialization(err.to_string())
        }
    }
}

/// Errors raised by a merge engine
#[derive(Error, Debug, Clone)]
pub enum MergeError {
    #[error("Destination not found: {0}")]
    DestinationNotFound(ThoughtId),

    #[error("Merge failed: {0}")]
    Failed(String),

    /// The engine dropped the durability signal without resolving it
    #[error("Merge was abandoned before it became durable")]
    Abandoned,

    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors raised while flattening a snapshot
#[derive(Error, Debug, Clone)]
pub enum ExportError {
    #[error("Export root not found: {0}")]
    RootNotFound(ThoughtId),

    #[error("Cycle detected at thought {0}")]
    Cycle(ThoughtId),

    #[error("Unsupported export format: {0}")]
    UnsupportedFormat(String),
}
