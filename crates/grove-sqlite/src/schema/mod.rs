//! Versioned schema for the grove database

use crate::error::{SqliteError, SqliteResult};
use rusqlite::{Connection, OptionalExtension};
use tracing::{debug, info};

struct Migration {
    version: i32,
    name: &'static str,
    sql: &'static str,
}

const MIGRATIONS: &[Migration] = &[Migration {
    version: 1,
    name: "progress and thoughts",
    sql: include_str!("v1.sql"),
}];

fn latest() -> i32 {
    MIGRATIONS.last().map_or(0, |m| m.version)
}

fn applied_version(conn: &Connection) -> SqliteResult<i32> {
    let version = conn
        .query_row("SELECT MAX(version) FROM schema_migrations", [], |row| {
            row.get::<_, Option<i32>>(0)
        })
        .optional()?
        .flatten();
    Ok(version.unwrap_or(0))
}

/// Bring the schema up to the newest version; a no-op on an up-to-date database
pub fn apply_migrations(conn: &Connection) -> SqliteResult<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS schema_migrations (
            version INTEGER PRIMARY KEY,
            applied_at TEXT NOT NULL DEFAULT (datetime('now'))
        );",
    )?;

    let current = applied_version(conn)?;
    debug!(current, latest = latest(), "schema version");

    for migration in MIGRATIONS.iter().filter(|m| m.version > current) {
        conn.execute_batch(migration.sql).map_err(|e| {
            SqliteError::Schema(format!("v{} ({}): {e}", migration.version, migration.name))
        })?;
        conn.execute(
            "INSERT INTO schema_migrations (version) VALUES (?1)",
            [migration.version],
        )?;
        info!(version = migration.version, name = migration.name, "migration applied");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reapplying_keeps_single_home_row() {
        let conn = Connection::open_in_memory().unwrap();
        apply_migrations(&conn).unwrap();
        apply_migrations(&conn).unwrap();

        assert_eq!(applied_version(&conn).unwrap(), latest());
        let homes: i64 = conn
            .query_row("SELECT COUNT(*) FROM thoughts WHERE parent_id IS NULL", [], |r| r.get(0))
            .unwrap();
        assert_eq!(homes, 1);
    }

    #[test]
    fn test_fresh_database_reports_version_zero() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch("CREATE TABLE schema_migrations (version INTEGER PRIMARY KEY)")
            .unwrap();
        assert_eq!(applied_version(&conn).unwrap(), 0);
    }
}
