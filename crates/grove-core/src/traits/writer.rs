//! Direct thought creation

use crate::error::StorageResult;
use crate::types::{DestinationPath, ThoughtId};
use async_trait::async_trait;

/// An empty thought inserted before an existing sibling
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placeholder {
    /// Id of the new thought
    pub id: ThoughtId,
    /// Path of the parent the placeholder is created in (empty = home)
    pub parent: DestinationPath,
    /// Sibling the placeholder is ranked before
    pub before: ThoughtId,
}

#[async_trait]
pub trait ThoughtWriter: Send + Sync {
    /// Create an empty thought ranked directly before `placeholder.before`
    async fn create_placeholder(&self, placeholder: Placeholder) -> StorageResult<()>;
}
