//! ProgressStore implementation for SQLite

use crate::connection::SqlitePool;
use crate::error::SqliteResult;
use async_trait::async_trait;
use grove_core::{ProgressStore, StorageResult, UpdateFn};
use rusqlite::{params, Connection, OptionalExtension, TransactionBehavior};
use serde_json::Value;
use tracing::debug;

/// Key-value progress store over the `progress` table.
///
/// `update` runs its read-modify-write inside one immediate transaction, so
/// concurrent writers to the same key cannot lose updates.
#[derive(Clone)]
pub struct SqliteProgressStore {
    pool: SqlitePool,
}

impl SqliteProgressStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

fn read_value(conn: &Connection, key: &str) -> SqliteResult<Option<Value>> {
    let raw: Option<String> = conn
        .query_row("SELECT value FROM progress WHERE key = ?1", [key], |row| {
            row.get(0)
        })
        .optional()?;
    raw.map(|s| serde_json::from_str(&s))
        .transpose()
        .map_err(Into::into)
}

fn write_value(conn: &Connection, key: &str, value: &Value) -> SqliteResult<()> {
    conn.execute(
        r#"
        INSERT INTO progress (key, value, updated_at)
        VALUES (?1, ?2, datetime('now'))
        ON CONFLICT(key) DO UPDATE SET
            value = excluded.value,
            updated_at = excluded.updated_at
        "#,
        params![key, value.to_string()],
    )?;
    Ok(())
}

#[async_trait]
impl ProgressStore for SqliteProgressStore {
    async fn get(&self, key: &str) -> StorageResult<Option<Value>> {
        let key = key.to_string();
        self.pool.run(move |conn| read_value(conn, &key)).await
    }

    async fn set(&self, key: &str, value: Value) -> StorageResult<()> {
        let key = key.to_string();
        self.pool
            .run(move |conn| {
                debug!(key = %key, "progress set");
                write_value(conn, &key, &value)
            })
            .await
    }

    async fn update(&self, key: &str, f: UpdateFn) -> StorageResult<Value> {
        let key = key.to_string();
        self.pool
            .run(move |conn| {
                let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
                let current = read_value(&tx, &key)?;
                let next = match f(current) {
                    Ok(next) => next,
                    // dropping the transaction rolls it back
                    Err(e) => return Ok(Err(e)),
                };
                write_value(&tx, &key, &next)?;
                tx.commit()?;
                debug!(key = %key, "progress updated");
                Ok(Ok(next))
            })
            .await?
    }

    async fn delete(&self, key: &str) -> StorageResult<()> {
        let key = key.to_string();
        self.pool
            .run(move |conn| {
                conn.execute("DELETE FROM progress WHERE key = ?1", [&key])?;
                Ok(())
            })
            .await
    }
}
