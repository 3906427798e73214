//! SQLite connection configuration

use std::path::{Path, PathBuf};

/// Configuration for [`crate::SqlitePool`]
#[derive(Debug, Clone)]
pub struct SqliteConfig {
    /// Database file, or `:memory:`
    pub path: PathBuf,
    pub wal_mode: bool,
    pub foreign_keys: bool,
    pub busy_timeout_ms: u32,
    /// Negative values are KiB, positive values pages
    pub cache_size: i64,
}

impl SqliteConfig {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            ..Self::default()
        }
    }

    /// In-memory database for tests
    pub fn memory() -> Self {
        Self {
            path: PathBuf::from(":memory:"),
            wal_mode: false,
            ..Self::default()
        }
    }

    pub fn is_memory(&self) -> bool {
        self.path.as_os_str() == ":memory:"
    }

    /// Pragma statements applied to every new connection, in order
    pub fn pragmas(&self) -> Vec<String> {
        let mut pragmas = Vec::new();
        if self.wal_mode && !self.is_memory() {
            pragmas.push("PRAGMA journal_mode = WAL".to_string());
            // NORMAL survives application crashes in WAL mode
            pragmas.push("PRAGMA synchronous = NORMAL".to_string());
        }
        if self.foreign_keys {
            pragmas.push("PRAGMA foreign_keys = ON".to_string());
        }
        pragmas.push(format!("PRAGMA busy_timeout = {}", self.busy_timeout_ms));
        pragmas.push(format!("PRAGMA cache_size = {}", self.cache_size));
        pragmas
    }

    #[must_use]
    pub fn with_wal_mode(mut self, enabled: bool) -> Self {
        self.wal_mode = enabled;
        self
    }

    #[must_use]
    pub fn with_busy_timeout_ms(mut self, timeout: u32) -> Self {
        self.busy_timeout_ms = timeout;
        self
    }
}

impl Default for SqliteConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("./grove.db"),
            wal_mode: true,
            foreign_keys: true,
            busy_timeout_ms: 5000,
            cache_size: -8000,
        }
    }
}
