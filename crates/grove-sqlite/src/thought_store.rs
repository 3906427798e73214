//! Thought tree storage for SQLite
//!
//! Implements the merge engine, subtree pull and placeholder writer over the
//! `thoughts` table. Merging is find-or-create by value beneath each parent,
//! so re-applying a chunk after an interrupted import adds nothing twice.

use crate::connection::SqlitePool;
use crate::error::{SqliteError, SqliteResult};
use async_trait::async_trait;
use grove_core::types::Lexeme;
use grove_core::{
    durability_channel, ImportMerger, MergeError, MergeReceipt, MergeRequest, Placeholder,
    PullOptions, StorageResult, SubtreeSync, Thought, ThoughtId, ThoughtIndices, ThoughtWriter,
};
use rusqlite::{params, Connection, OptionalExtension, TransactionBehavior};
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// SQLite-backed thought tree
#[derive(Clone)]
pub struct SqliteThoughtStore {
    pool: SqlitePool,
}

impl SqliteThoughtStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Structured snapshot of every stored thought.
    ///
    /// Children maps are always populated; lexemes are keyed by lowercased value.
    pub async fn snapshot(&self) -> StorageResult<ThoughtIndices> {
        self.pool.run(|conn| load_snapshot(conn)).await
    }

    /// Number of stored thoughts, excluding the home context
    pub async fn count(&self) -> StorageResult<usize> {
        self.pool
            .run(|conn| {
                let n: i64 = conn.query_row(
                    "SELECT COUNT(*) FROM thoughts WHERE parent_id IS NOT NULL",
                    [],
                    |row| row.get(0),
                )?;
                Ok(n as usize)
            })
            .await
    }
}

fn exists(conn: &Connection, id: &ThoughtId) -> SqliteResult<bool> {
    let found: Option<i64> = conn
        .query_row("SELECT 1 FROM thoughts WHERE id = ?1", [id.as_str()], |row| {
            row.get(0)
        })
        .optional()?;
    Ok(found.is_some())
}

fn find_or_create(conn: &Connection, parent: &ThoughtId, value: &str) -> SqliteResult<ThoughtId> {
    let existing: Option<String> = conn
        .query_row(
            "SELECT id FROM thoughts WHERE parent_id = ?1 AND value = ?2 ORDER BY rank LIMIT 1",
            params![parent.as_str(), value],
            |row| row.get(0),
        )
        .optional()?;
    if let Some(id) = existing {
        return Ok(ThoughtId::new(id));
    }

    let id = ThoughtId::generate();
    conn.execute(
        r#"
        INSERT INTO thoughts (id, parent_id, value, rank)
        VALUES (?1, ?2, ?3,
            (SELECT COALESCE(MAX(rank), 0) + 1 FROM thoughts WHERE parent_id = ?2))
        "#,
        params![id.as_str(), parent.as_str(), value],
    )?;
    Ok(id)
}

fn merge(conn: &mut Connection, request: &MergeRequest) -> Result<usize, MergeError> {
    let destination = request.destination.head();
    let tx = conn
        .transaction_with_behavior(TransactionBehavior::Immediate)
        .map_err(SqliteError::from)?;

    if !exists(&tx, &destination)? {
        return Err(MergeError::DestinationNotFound(destination));
    }

    let entries = request.entries();
    let mut stack = vec![destination];
    for (depth, value) in &entries {
        stack.truncate(depth + 1);
        let parent = stack.last().cloned().unwrap_or_else(ThoughtId::home);
        let id = find_or_create(&tx, &parent, value)?;
        stack.push(id);
    }

    tx.commit().map_err(SqliteError::from)?;
    Ok(entries.len())
}

fn load_snapshot(conn: &Connection) -> SqliteResult<ThoughtIndices> {
    let mut stmt = conn.prepare("SELECT id, parent_id, value, rank FROM thoughts")?;
    let rows = stmt.query_map([], |row| {
        Ok((
            row.get::<_, String>(0)?,
            row.get::<_, Option<String>>(1)?,
            row.get::<_, String>(2)?,
            row.get::<_, f64>(3)?,
        ))
    })?;

    let mut indices = ThoughtIndices::default();
    let mut children: BTreeMap<ThoughtId, Vec<ThoughtId>> = BTreeMap::new();
    for row in rows {
        let (id, parent_id, value, rank) = row?;
        let id = ThoughtId::new(id);
        let mut thought = Thought::new(id.clone(), value, rank);
        if let Some(parent) = parent_id {
            let parent = ThoughtId::new(parent);
            children.entry(parent.clone()).or_default().push(id.clone());
            thought.parent_id = Some(parent);
        }
        indices.thought_index.insert(id, thought);
    }

    let maps: Vec<_> = indices
        .thought_index
        .keys()
        .map(|id| {
            let child_ids = children.get(id).map(Vec::as_slice).unwrap_or_default();
            (id.clone(), indices.children_map_for(child_ids))
        })
        .collect();
    for (id, map) in maps {
        if let Some(thought) = indices.thought_index.get_mut(&id) {
            thought.children_map = Some(map);
        }
    }

    for thought in indices.thought_index.values() {
        if thought.id.is_home() {
            continue;
        }
        indices
            .lexeme_index
            .entry(thought.value.to_lowercase())
            .or_insert_with(Lexeme::default)
            .contexts
            .push(thought.id.clone());
    }

    Ok(indices)
}

#[async_trait]
impl ImportMerger for SqliteThoughtStore {
    /// Runs the merge on the blocking pool; the receipt resolves after commit.
    async fn dispatch(&self, request: MergeRequest) -> Result<MergeReceipt, MergeError> {
        let (signal, receipt) = durability_channel();
        let pool = self.pool.clone();

        tokio::task::spawn_blocking(move || {
            let result = pool
                .with_connection_mut(|conn| Ok(merge(conn, &request)))
                .map_err(MergeError::from)
                .and_then(|inner| inner);
            match &result {
                Ok(lines) => debug!(lines, destination = %request.destination, "chunk merged"),
                Err(e) => warn!(error = %e, destination = %request.destination, "chunk merge failed"),
            }
            signal.resolve(result.map(|_| ()));
        });

        Ok(receipt)
    }
}

#[async_trait]
impl SubtreeSync for SqliteThoughtStore {
    /// Reads each subtree in full so it is resident in SQLite's page cache.
    ///
    /// The database is the source of truth, so nothing is ever pending here and
    /// `force` has no further effect.
    async fn pull(&self, roots: &[ThoughtId], options: PullOptions) -> StorageResult<usize> {
        let roots = roots.to_vec();
        let max_depth = options.max_depth.map(|d| d as i64);
        self.pool
            .run(move |conn| {
                let mut stmt = conn.prepare(
                    r#"
                    WITH RECURSIVE subtree(id, depth) AS (
                        SELECT id, 0 FROM thoughts WHERE id = ?1
                        UNION ALL
                        SELECT t.id, subtree.depth + 1
                        FROM thoughts t JOIN subtree ON t.parent_id = subtree.id
                        WHERE ?2 IS NULL OR subtree.depth < ?2
                    )
                    SELECT COUNT(*) FROM subtree
                    "#,
                )?;
                let mut total = 0usize;
                for root in &roots {
                    let n: i64 =
                        stmt.query_row(params![root.as_str(), max_depth], |row| row.get(0))?;
                    total += n as usize;
                }
                debug!(roots = roots.len(), thoughts = total, "subtree pulled");
                Ok(total)
            })
            .await
    }
}

#[async_trait]
impl ThoughtWriter for SqliteThoughtStore {
    async fn create_placeholder(&self, placeholder: Placeholder) -> StorageResult<()> {
        self.pool
            .run(move |conn| {
                let parent = placeholder.parent.head();
                let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
                if !exists(&tx, &parent)? {
                    return Err(SqliteError::NotFound(parent.to_string()));
                }

                let before_rank: Option<f64> = tx
                    .query_row(
                        "SELECT rank FROM thoughts WHERE id = ?1 AND parent_id = ?2",
                        params![placeholder.before.as_str(), parent.as_str()],
                        |row| row.get(0),
                    )
                    .optional()?;

                let rank = match before_rank {
                    Some(before) => {
                        let previous: Option<f64> = tx.query_row(
                            "SELECT MAX(rank) FROM thoughts WHERE parent_id = ?1 AND rank < ?2",
                            params![parent.as_str(), before],
                            |row| row.get(0),
                        )?;
                        previous.map_or(before - 1.0, |p| (p + before) / 2.0)
                    }
                    None => {
                        let first: Option<f64> = tx.query_row(
                            "SELECT MIN(rank) FROM thoughts WHERE parent_id = ?1",
                            [parent.as_str()],
                            |row| row.get(0),
                        )?;
                        first.map_or(0.0, |f| f - 1.0)
                    }
                };

                tx.execute(
                    "INSERT INTO thoughts (id, parent_id, value, rank) VALUES (?1, ?2, '', ?3)",
                    params![placeholder.id.as_str(), parent.as_str(), rank],
                )?;
                tx.commit()?;
                Ok(())
            })
            .await
    }
}
