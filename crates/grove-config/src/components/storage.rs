//! Storage component configuration
//!
//! Location and tuning of the SQLite database holding the thought tree and
//! the import progress store.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Storage component configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub database_path: PathBuf,
    pub wal_mode: bool,
    pub busy_timeout_ms: u32,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: PathBuf::from("./grove.db"),
            wal_mode: true,
            busy_timeout_ms: 5000,
        }
    }
}
