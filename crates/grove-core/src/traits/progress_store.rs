//! Durable key-value store for import progress

use crate::error::StorageResult;
use async_trait::async_trait;
use serde_json::Value;

/// Read-modify-write function passed to [`ProgressStore::update`].
///
/// Receives the current value (`None` if absent) and returns the replacement.
pub type UpdateFn = Box<dyn FnOnce(Option<Value>) -> StorageResult<Value> + Send>;

/// Durable key-value store holding import manifests and text blobs.
///
/// Values are whole JSON documents; every write replaces the entry for its key.
///
/// # Thread Safety
///
/// All methods take `&self`, so implementations must be internally synchronized.
#[async_trait]
pub trait ProgressStore: Send + Sync {
    /// Read the value stored under `key`
    async fn get(&self, key: &str) -> StorageResult<Option<Value>>;

    /// Replace the value stored under `key`
    async fn set(&self, key: &str, value: Value) -> StorageResult<()>;

    /// Atomically replace the value under `key` with `f(current)`, returning the new value
    async fn update(&self, key: &str, f: UpdateFn) -> StorageResult<Value>;

    /// Remove `key`. Deleting an absent key is not an error.
    async fn delete(&self, key: &str) -> StorageResult<()>;
}
