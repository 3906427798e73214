//! Shared SQLite handle
//!
//! The progress store and the thought store hold clones of one `SqlitePool`.
//! Every statement runs under the same mutex, off the async runtime.

use crate::config::SqliteConfig;
use crate::error::{SqliteError, SqliteResult};
use crate::schema;
use grove_core::StorageError;
use parking_lot::Mutex;
use rusqlite::Connection;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};

/// Cloneable handle to a single serialized connection
#[derive(Clone)]
pub struct SqlitePool {
    conn: Arc<Mutex<Connection>>,
}

fn ensure_parent_dir(path: &Path) -> SqliteResult<()> {
    match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => std::fs::create_dir_all(dir)
            .map_err(|e| SqliteError::Connection(format!("cannot create {}: {e}", dir.display()))),
        _ => Ok(()),
    }
}

fn open_connection(config: &SqliteConfig) -> SqliteResult<Connection> {
    if config.is_memory() {
        return Ok(Connection::open_in_memory()?);
    }
    ensure_parent_dir(&config.path)?;
    Ok(Connection::open(&config.path)?)
}

impl SqlitePool {
    /// Open the database, apply pragmas and bring the schema up to date
    pub fn new(config: SqliteConfig) -> SqliteResult<Self> {
        info!(path = %config.path.display(), "opening grove database");
        let conn = open_connection(&config)?;

        for pragma in config.pragmas() {
            debug!(%pragma, "applying pragma");
            conn.execute_batch(&pragma)?;
        }
        schema::apply_migrations(&conn)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn memory() -> SqliteResult<Self> {
        Self::new(SqliteConfig::memory())
    }

    /// Lock the connection for the duration of `f`
    pub fn with_connection_mut<F, T>(&self, f: F) -> SqliteResult<T>
    where
        F: FnOnce(&mut Connection) -> SqliteResult<T>,
    {
        let mut guard = self.conn.lock();
        f(&mut guard)
    }

    /// Run `f` on the blocking pool, mapping failures into [`StorageError`]
    pub async fn run<F, T>(&self, f: F) -> Result<T, StorageError>
    where
        F: FnOnce(&mut Connection) -> SqliteResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let pool = self.clone();
        let joined = tokio::task::spawn_blocking(move || pool.with_connection_mut(f)).await;
        match joined {
            Ok(result) => result.map_err(StorageError::from),
            Err(join) => Err(StorageError::Backend(format!("sqlite task failed: {join}"))),
        }
    }
}
