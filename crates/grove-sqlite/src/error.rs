//! SQLite backend errors and their mapping onto the collaborator error types

use grove_core::{MergeError, StorageError};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SqliteError {
    #[error("cannot open database: {0}")]
    Connection(String),

    #[error("migration failed: {0}")]
    Schema(String),

    /// A referenced thought row does not exist
    #[error("thought not found: {0}")]
    NotFound(String),

    #[error("progress value is not valid JSON: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Rusqlite(#[from] rusqlite::Error),
}

pub type SqliteResult<T> = Result<T, SqliteError>;

impl From<SqliteError> for StorageError {
    fn from(err: SqliteError) -> Self {
        match err {
            SqliteError::NotFound(id) => Self::NotFound(id),
            SqliteError::Serialization(e) => Self::from(e),
            other => Self::Backend(other.to_string()),
        }
    }
}

impl From<SqliteError> for MergeError {
    fn from(err: SqliteError) -> Self {
        Self::Storage(err.into())
    }
}
