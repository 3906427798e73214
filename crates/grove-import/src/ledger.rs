//! Progress ledger
//!
//! Durable bookkeeping for in-flight imports, kept in the injected
//! [`ProgressStore`]:
//!
//! - `resumeImports`: the manifest collection, a JSON object keyed by import id
//! - `resumeImports-{id}`: the original text of one import (its blob)
//!
//! The collection is only ever changed through the store's atomic
//! read-modify-write, one whole entry at a time.

use grove_core::{
    creation_order, next_sequence, ImportId, ImportManifest, ManifestIndex, ProgressStore,
    StorageError, StorageResult,
};
use serde_json::Value;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::debug;

/// Key of the manifest collection
pub const MANIFESTS_KEY: &str = "resumeImports";

/// Key of the blob holding the text of import `id`
pub fn blob_key(id: &ImportId) -> String {
    format!("{MANIFESTS_KEY}-{id}")
}

/// An import left unfinished by an earlier run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingImport {
    pub manifest: ImportManifest,
    /// Whether the blob is still present
    pub has_blob: bool,
}

fn decode(value: Option<Value>) -> StorageResult<ManifestIndex> {
    match value {
        None | Some(Value::Null) => Ok(ManifestIndex::new()),
        Some(value) => Ok(serde_json::from_value(value)?),
    }
}

/// Typed view over the progress store
#[derive(Clone)]
pub struct ProgressLedger {
    store: Arc<dyn ProgressStore>,
}

impl ProgressLedger {
    pub fn new(store: Arc<dyn ProgressStore>) -> Self {
        Self { store }
    }

    /// All recorded manifests, ordered by id
    pub async fn manifests(&self) -> StorageResult<ManifestIndex> {
        decode(self.store.get(MANIFESTS_KEY).await?)
    }

    /// Manifests in the order their imports were first recorded
    pub async fn manifests_in_order(&self) -> StorageResult<Vec<ImportManifest>> {
        Ok(creation_order(self.manifests().await?))
    }

    /// Insert or replace the entry for `manifest.id`.
    ///
    /// A new entry is stamped with the next creation sequence; a replaced
    /// entry keeps the sequence it was first recorded with.
    pub async fn upsert_manifest(&self, manifest: &ImportManifest) -> StorageResult<()> {
        let mut manifest = manifest.clone();
        debug!(
            import_id = %manifest.id,
            lines_completed = manifest.lines_completed,
            "recording import progress"
        );
        self.store
            .update(
                MANIFESTS_KEY,
                Box::new(move |current: Option<Value>| {
                    let mut index = decode(current)?;
                    manifest.sequence = match index.get(&manifest.id) {
                        Some(existing) => existing.sequence,
                        None => next_sequence(&index),
                    };
                    index.insert(manifest.id.clone(), manifest);
                    serde_json::to_value(index).map_err(StorageError::from)
                }),
            )
            .await?;
        Ok(())
    }

    /// Remove the entry for `id`; returns whether it existed
    pub async fn remove_manifest(&self, id: &ImportId) -> StorageResult<bool> {
        let id = id.clone();
        let removed = Arc::new(AtomicBool::new(false));
        let flag = removed.clone();
        self.store
            .update(
                MANIFESTS_KEY,
                Box::new(move |current: Option<Value>| {
                    let mut index = decode(current)?;
                    flag.store(index.remove(&id).is_some(), Ordering::SeqCst);
                    serde_json::to_value(index).map_err(StorageError::from)
                }),
            )
            .await?;
        Ok(removed.load(Ordering::SeqCst))
    }

    /// Store the original text of an import
    pub async fn put_blob(&self, id: &ImportId, text: &str) -> StorageResult<()> {
        self.store
            .set(&blob_key(id), Value::String(text.to_string()))
            .await
    }

    /// Original text of an import, if still present
    pub async fn blob(&self, id: &ImportId) -> StorageResult<Option<String>> {
        match self.store.get(&blob_key(id)).await? {
            None | Some(Value::Null) => Ok(None),
            Some(Value::String(text)) => Ok(Some(text)),
            Some(other) => Err(StorageError::deserialization(format!(
                "blob {} is not a string: {other}",
                blob_key(id)
            ))),
        }
    }

    pub async fn delete_blob(&self, id: &ImportId) -> StorageResult<()> {
        self.store.delete(&blob_key(id)).await
    }

    /// Manifests of unfinished imports in creation order, with blob presence
    pub async fn pending(&self) -> StorageResult<Vec<PendingImport>> {
        let mut pending = Vec::new();
        for manifest in self.manifests_in_order().await? {
            let has_blob = self.blob(&manifest.id).await?.is_some();
            pending.push(PendingImport { manifest, has_blob });
        }
        Ok(pending)
    }

    /// Drop all progress for `id`: blob first, then the manifest.
    ///
    /// Returns whether a manifest existed.
    pub async fn discard(&self, id: &ImportId) -> StorageResult<bool> {
        self.delete_blob(id).await?;
        self.remove_manifest(id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Utc};
    use grove_core::test_support::{InMemoryProgressStore, StoreCall};
    use grove_core::DestinationPath;
    use serde_json::json;

    fn manifest(id: &str) -> ImportManifest {
        ImportManifest::new(
            ImportId::from(id),
            format!("{id}.txt"),
            10,
            DateTime::<Utc>::from_timestamp(1_700_000_000, 0).unwrap(),
            DestinationPath::home(),
        )
    }

    #[tokio::test]
    async fn test_upsert_replaces_whole_entry() {
        let store = InMemoryProgressStore::new();
        let ledger = ProgressLedger::new(Arc::new(store.clone()));

        ledger.upsert_manifest(&manifest("a")).await.unwrap();
        ledger.upsert_manifest(&manifest("b")).await.unwrap();
        ledger
            .upsert_manifest(&manifest("a").with_lines_completed(20))
            .await
            .unwrap();

        let index = ledger.manifests().await.unwrap();
        assert_eq!(index.len(), 2);
        assert_eq!(index[&ImportId::from("a")].lines_completed, 20);
        assert_eq!(index[&ImportId::from("b")].lines_completed, 0);
        assert_eq!(
            store.peek(MANIFESTS_KEY).unwrap()["a"]["linesCompleted"],
            json!(20)
        );
    }

    #[tokio::test]
    async fn test_sequence_follows_first_write_not_id() {
        let ledger = ProgressLedger::new(Arc::new(InMemoryProgressStore::new()));

        ledger.upsert_manifest(&manifest("zz")).await.unwrap();
        ledger.upsert_manifest(&manifest("aa")).await.unwrap();
        ledger
            .upsert_manifest(&manifest("zz").with_lines_completed(20))
            .await
            .unwrap();

        let ordered = ledger.manifests_in_order().await.unwrap();
        let ids: Vec<_> = ordered.iter().map(|m| m.id.to_string()).collect();
        assert_eq!(ids, vec!["zz", "aa"]);
        assert_eq!(ordered[0].sequence, 1);
        assert_eq!(ordered[0].lines_completed, 20);
        assert_eq!(ordered[1].sequence, 2);
    }

    #[tokio::test]
    async fn test_collection_writes_go_through_update() {
        let store = InMemoryProgressStore::new();
        let ledger = ProgressLedger::new(Arc::new(store.clone()));

        ledger.upsert_manifest(&manifest("a")).await.unwrap();
        ledger.remove_manifest(&ImportId::from("a")).await.unwrap();

        let writes: Vec<_> = store
            .calls()
            .into_iter()
            .filter(|call| call.key() == MANIFESTS_KEY)
            .collect();
        assert!(writes.iter().all(|call| matches!(call, StoreCall::Update(_))));
    }

    #[tokio::test]
    async fn test_remove_reports_existence() {
        let ledger = ProgressLedger::new(Arc::new(InMemoryProgressStore::new()));
        ledger.upsert_manifest(&manifest("a")).await.unwrap();

        assert!(ledger.remove_manifest(&ImportId::from("a")).await.unwrap());
        assert!(!ledger.remove_manifest(&ImportId::from("a")).await.unwrap());
        assert!(ledger.manifests().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_blobs_and_pending() {
        let store = InMemoryProgressStore::new();
        let ledger = ProgressLedger::new(Arc::new(store.clone()));
        let id = ImportId::from("a");

        ledger.upsert_manifest(&manifest("a")).await.unwrap();
        ledger.put_blob(&id, "- x\n").await.unwrap();
        assert_eq!(store.keys(), vec!["resumeImports", "resumeImports-a"]);
        assert_eq!(ledger.blob(&id).await.unwrap().as_deref(), Some("- x\n"));

        let pending = ledger.pending().await.unwrap();
        assert_eq!(pending.len(), 1);
        assert!(pending[0].has_blob);

        store.remove_raw("resumeImports-a");
        assert!(!ledger.pending().await.unwrap()[0].has_blob);

        assert!(ledger.discard(&id).await.unwrap());
        assert_eq!(store.keys(), vec!["resumeImports"]);
        assert!(ledger.pending().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_missing_collection_reads_empty() {
        let ledger = ProgressLedger::new(Arc::new(InMemoryProgressStore::new()));
        assert!(ledger.manifests().await.unwrap().is_empty());
        assert!(ledger.blob(&ImportId::from("nope")).await.unwrap().is_none());
    }
}
