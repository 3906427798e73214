//! Core types and collaborator traits for grove
//!
//! grove stores hierarchical "thoughts" and imports outline files into them.
//! This crate defines what every other crate agrees on:
//!
//! - [`types`]: ids, destination paths, import manifests, structured snapshots
//! - [`traits`]: the seams the import pipeline talks through (progress store,
//!   merge engine, subtree sync, placeholder writer, exporter, notifier)
//! - [`outline`]: line-level outline parsing shared by merge backends
//! - [`export`]: plain-text flattening of snapshots
//! - [`test_support`]: in-memory doubles used across the workspace's tests
//!
//! Backends live in other crates (`grove-sqlite`) and are injected into the
//! pipeline (`grove-import`) as trait objects.

pub mod error;
pub mod export;
pub mod notification;
pub mod outline;
pub mod test_support;
pub mod traits;
pub mod types;

pub use error::{ExportError, MergeError, StorageError, StorageResult};
pub use export::OutlineExporter;
pub use notification::{DedupNotifier, NullNotifier};
pub use traits::{
    durability_channel, Alert, AlertType, ContextExporter, DurabilitySignal, ExportFormat,
    ImportMerger, MergeReceipt, MergeRequest, Notifier, Placeholder, ProgressStore, PullOptions,
    SubtreeSync, ThoughtWriter, UpdateFn,
};
pub use types::{
    creation_order, next_sequence, DestinationPath, ImportId, ImportManifest, ManifestIndex,
    Thought, ThoughtId, ThoughtIndices, HOME_TOKEN,
};
