//! Subtree synchronization

use crate::error::StorageResult;
use crate::types::ThoughtId;
use async_trait::async_trait;

/// Options for [`SubtreeSync::pull`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PullOptions {
    /// Ignore any pending status and fetch anyway
    pub force: bool,
    /// Maximum depth to fetch; `None` fetches the whole subtree
    pub max_depth: Option<usize>,
}

impl PullOptions {
    /// Forced, unbounded pull
    pub fn forced() -> Self {
        Self {
            force: true,
            max_depth: None,
        }
    }
}

/// Loads subtrees into memory so that merges see their complete state.
///
/// An unbounded pull can be arbitrarily expensive for large subtrees.
#[async_trait]
pub trait SubtreeSync: Send + Sync {
    /// Fetch the subtrees rooted at `roots`, returning the number of thoughts loaded
    async fn pull(&self, roots: &[ThoughtId], options: PullOptions) -> StorageResult<usize>;
}
