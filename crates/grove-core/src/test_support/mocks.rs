//! In-memory implementations of the collaborator traits
//!
//! These doubles are deterministic and observable: every store access, pull,
//! merge and alert is recorded so tests can assert on ordering and counts.
//! Failures can be injected to simulate interrupted imports.
//!
//! ```rust
//! use grove_core::test_support::InMemoryProgressStore;
//! use grove_core::traits::ProgressStore;
//! use serde_json::json;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let store = InMemoryProgressStore::new();
//! store.set("key", json!(1)).await?;
//! assert_eq!(store.get("key").await?, Some(json!(1)));
//! assert_eq!(store.calls().len(), 2);
//! # Ok(())
//! # }
//! ```

use crate::error::{MergeError, StorageError, StorageResult};
use crate::export::OutlineExporter;
use crate::traits::{
    Alert, ContextExporter, ExportFormat, ImportMerger, MergeReceipt, MergeRequest, Notifier,
    Placeholder, ProgressStore, PullOptions, SubtreeSync, ThoughtWriter, UpdateFn,
};
use crate::types::{Thought, ThoughtId, ThoughtIndices};
use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

// ============================================================================
// Progress store
// ============================================================================

/// A recorded progress store access
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreCall {
    Get(String),
    Set(String),
    Update(String),
    Delete(String),
}

impl StoreCall {
    pub fn key(&self) -> &str {
        match self {
            Self::Get(k) | Self::Set(k) | Self::Update(k) | Self::Delete(k) => k,
        }
    }
}

#[derive(Default)]
struct ProgressState {
    entries: BTreeMap<String, Value>,
    calls: Vec<StoreCall>,
    fail_writes: bool,
}

/// In-memory [`ProgressStore`] that records every call
#[derive(Clone, Default)]
pub struct InMemoryProgressStore {
    state: Arc<Mutex<ProgressState>>,
}

impl InMemoryProgressStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every call made so far, in order
    pub fn calls(&self) -> Vec<StoreCall> {
        self.state.lock().calls.clone()
    }

    /// Raw entry access that bypasses call recording
    pub fn peek(&self, key: &str) -> Option<Value> {
        self.state.lock().entries.get(key).cloned()
    }

    /// Keys currently stored
    pub fn keys(&self) -> Vec<String> {
        self.state.lock().entries.keys().cloned().collect()
    }

    /// Remove an entry without recording a call (out-of-band loss)
    pub fn remove_raw(&self, key: &str) {
        self.state.lock().entries.remove(key);
    }

    /// Make every subsequent write fail
    pub fn set_fail_writes(&self, enabled: bool) {
        self.state.lock().fail_writes = enabled;
    }

    fn record(&self, call: StoreCall) -> StorageResult<()> {
        let mut state = self.state.lock();
        let is_write = !matches!(call, StoreCall::Get(_));
        state.calls.push(call);
        if is_write && state.fail_writes {
            return Err(StorageError::backend("simulated write failure"));
        }
        Ok(())
    }
}

#[async_trait]
impl ProgressStore for InMemoryProgressStore {
    async fn get(&self, key: &str) -> StorageResult<Option<Value>> {
        self.record(StoreCall::Get(key.to_string()))?;
        Ok(self.state.lock().entries.get(key).cloned())
    }

    async fn set(&self, key: &str, value: Value) -> StorageResult<()> {
        self.record(StoreCall::Set(key.to_string()))?;
        self.state.lock().entries.insert(key.to_string(), value);
        Ok(())
    }

    async fn update(&self, key: &str, f: UpdateFn) -> StorageResult<Value> {
        self.record(StoreCall::Update(key.to_string()))?;
        let mut state = self.state.lock();
        let next = f(state.entries.get(key).cloned())?;
        state.entries.insert(key.to_string(), next.clone());
        Ok(next)
    }

    async fn delete(&self, key: &str) -> StorageResult<()> {
        self.record(StoreCall::Delete(key.to_string()))?;
        self.state.lock().entries.remove(key);
        Ok(())
    }
}

// ============================================================================
// Thought tree
// ============================================================================

#[derive(Debug, Clone)]
struct Node {
    value: String,
    rank: f64,
    parent: Option<ThoughtId>,
    children: Vec<ThoughtId>,
}

struct TreeState {
    nodes: HashMap<ThoughtId, Node>,
    next_id: u64,
    merges: Vec<MergeRequest>,
    pulls: Vec<(Vec<ThoughtId>, PullOptions)>,
    failing_merges: Vec<usize>,
}

/// In-memory thought tree implementing the merge, pull and placeholder collaborators.
///
/// Merging finds or creates each line's thought by value beneath its parent, so
/// re-applying a chunk does not duplicate content.
#[derive(Clone)]
pub struct InMemoryThoughtTree {
    state: Arc<Mutex<TreeState>>,
}

impl Default for InMemoryThoughtTree {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryThoughtTree {
    pub fn new() -> Self {
        let mut nodes = HashMap::new();
        nodes.insert(
            ThoughtId::home(),
            Node {
                value: String::new(),
                rank: 0.0,
                parent: None,
                children: Vec::new(),
            },
        );
        Self {
            state: Arc::new(Mutex::new(TreeState {
                nodes,
                next_id: 0,
                merges: Vec::new(),
                pulls: Vec::new(),
                failing_merges: Vec::new(),
            })),
        }
    }

    /// Make the `n`-th dispatch (1-based, counted from now on) fail.
    ///
    /// Calls accumulate, so several dispatches can be made to fail.
    pub fn fail_on_merge(&self, n: usize) {
        let mut state = self.state.lock();
        let target = state.merges.len() + n;
        state.failing_merges.push(target);
    }

    /// Insert a thought directly, returning its id
    pub fn insert(&self, parent: &ThoughtId, value: &str) -> ThoughtId {
        let mut state = self.state.lock();
        Self::find_or_create(&mut state, parent, value)
            .unwrap_or_else(|_| panic!("parent {parent} does not exist"))
    }

    /// Every merge request dispatched so far
    pub fn merges(&self) -> Vec<MergeRequest> {
        self.state.lock().merges.clone()
    }

    /// Every pull so far
    pub fn pulls(&self) -> Vec<(Vec<ThoughtId>, PullOptions)> {
        self.state.lock().pulls.clone()
    }

    /// Number of thoughts, excluding home
    pub fn len(&self) -> usize {
        self.state.lock().nodes.len() - 1
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Values of the children of `id`, in rank order
    pub fn child_values(&self, id: &ThoughtId) -> Vec<String> {
        let state = self.state.lock();
        Self::sorted_children(&state, id)
            .into_iter()
            .filter_map(|child| state.nodes.get(&child).map(|n| n.value.clone()))
            .collect()
    }

    /// Structured snapshot of the whole tree
    pub fn snapshot(&self) -> ThoughtIndices {
        let state = self.state.lock();
        let mut indices = ThoughtIndices::default();
        for (id, node) in &state.nodes {
            let mut thought = Thought::new(id.clone(), node.value.clone(), node.rank);
            thought.parent_id = node.parent.clone();
            thought.children_map = Some(
                node.children
                    .iter()
                    .map(|child| (child.as_str().to_string(), child.clone()))
                    .collect(),
            );
            indices.thought_index.insert(id.clone(), thought);
        }
        indices
    }

    /// The whole tree as outline text
    pub fn outline(&self) -> String {
        OutlineExporter
            .export_context(&self.snapshot(), &ThoughtId::home(), ExportFormat::PlainText)
            .unwrap_or_default()
    }

    fn sorted_children(state: &TreeState, id: &ThoughtId) -> Vec<ThoughtId> {
        let mut children: Vec<(f64, ThoughtId)> = state
            .nodes
            .get(id)
            .map(|n| n.children.clone())
            .unwrap_or_default()
            .into_iter()
            .filter_map(|c| state.nodes.get(&c).map(|n| (n.rank, c)))
            .collect();
        children.sort_by(|a, b| a.0.total_cmp(&b.0));
        children.into_iter().map(|(_, c)| c).collect()
    }

    fn find_or_create(
        state: &mut TreeState,
        parent: &ThoughtId,
        value: &str,
    ) -> Result<ThoughtId, MergeError> {
        let parent_node = state
            .nodes
            .get(parent)
            .ok_or_else(|| MergeError::DestinationNotFound(parent.clone()))?;

        let existing = parent_node
            .children
            .iter()
            .find(|c| state.nodes.get(*c).is_some_and(|n| n.value == value))
            .cloned();
        if let Some(id) = existing {
            return Ok(id);
        }

        let rank = parent_node
            .children
            .iter()
            .filter_map(|c| state.nodes.get(c).map(|n| n.rank))
            .fold(0.0_f64, f64::max)
            + 1.0;

        state.next_id += 1;
        let id = ThoughtId::new(format!("t{}", state.next_id));
        state.nodes.insert(
            id.clone(),
            Node {
                value: value.to_string(),
                rank,
                parent: Some(parent.clone()),
                children: Vec::new(),
            },
        );
        if let Some(parent_node) = state.nodes.get_mut(parent) {
            parent_node.children.push(id.clone());
        }
        Ok(id)
    }
}

#[async_trait]
impl ImportMerger for InMemoryThoughtTree {
    async fn dispatch(&self, request: MergeRequest) -> Result<MergeReceipt, MergeError> {
        let mut state = self.state.lock();
        state.merges.push(request.clone());
        if state.failing_merges.contains(&state.merges.len()) {
            return Err(MergeError::Failed("simulated merge failure".to_string()));
        }

        let mut stack = vec![request.destination.head()];
        for (depth, value) in request.entries() {
            stack.truncate(depth + 1);
            let parent = stack.last().cloned().unwrap_or_else(ThoughtId::home);
            let id = Self::find_or_create(&mut state, &parent, &value)?;
            stack.push(id);
        }

        Ok(MergeReceipt::ready(Ok(())))
    }
}

#[async_trait]
impl SubtreeSync for InMemoryThoughtTree {
    async fn pull(&self, roots: &[ThoughtId], options: PullOptions) -> StorageResult<usize> {
        let mut state = self.state.lock();
        state.pulls.push((roots.to_vec(), options));

        let mut count = 0;
        let mut frontier: Vec<(ThoughtId, usize)> = roots.iter().map(|r| (r.clone(), 0)).collect();
        while let Some((id, depth)) = frontier.pop() {
            let Some(node) = state.nodes.get(&id) else {
                continue;
            };
            count += 1;
            if options.max_depth.is_some_and(|max| depth >= max) {
                continue;
            }
            frontier.extend(node.children.iter().map(|c| (c.clone(), depth + 1)));
        }
        Ok(count)
    }
}

#[async_trait]
impl ThoughtWriter for InMemoryThoughtTree {
    async fn create_placeholder(&self, placeholder: Placeholder) -> StorageResult<()> {
        let mut state = self.state.lock();
        let parent = placeholder.parent.head();
        if !state.nodes.contains_key(&parent) {
            return Err(StorageError::NotFound(parent.to_string()));
        }

        let siblings = Self::sorted_children(&state, &parent);
        let ranks: Vec<f64> = siblings
            .iter()
            .filter_map(|s| state.nodes.get(s).map(|n| n.rank))
            .collect();
        let rank = match siblings.iter().position(|s| *s == placeholder.before) {
            Some(0) => ranks[0] - 1.0,
            Some(i) => (ranks[i - 1] + ranks[i]) / 2.0,
            None => ranks.first().map_or(0.0, |r| r - 1.0),
        };

        state.nodes.insert(
            placeholder.id.clone(),
            Node {
                value: String::new(),
                rank,
                parent: Some(parent.clone()),
                children: Vec::new(),
            },
        );
        if let Some(parent_node) = state.nodes.get_mut(&parent) {
            parent_node.children.push(placeholder.id);
        }
        Ok(())
    }
}

// ============================================================================
// Notifier
// ============================================================================

/// Records every alert it receives
#[derive(Default)]
pub struct RecordingNotifier {
    alerts: Mutex<Vec<Alert>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn alerts(&self) -> Vec<Alert> {
        self.alerts.lock().clone()
    }

    pub fn values(&self) -> Vec<Option<String>> {
        self.alerts.lock().iter().map(|a| a.value.clone()).collect()
    }
}

impl Notifier for RecordingNotifier {
    fn alert(&self, alert: Alert) {
        self.alerts.lock().push(alert);
    }
}
