//! Collaborator traits
//!
//! The import pipeline only talks to the outside world through these traits.
//! Backends (SQLite, in-memory test doubles) implement them and are injected
//! into the pipeline as `Arc<dyn Trait>`.

pub mod export;
pub mod merger;
pub mod notify;
pub mod progress_store;
pub mod sync;
pub mod writer;

pub use export::{ContextExporter, ExportFormat};
pub use merger::{durability_channel, DurabilitySignal, ImportMerger, MergeReceipt, MergeRequest};
pub use notify::{Alert, AlertType, Notifier};
pub use progress_store::{ProgressStore, UpdateFn};
pub use sync::{PullOptions, SubtreeSync};
pub use writer::{Placeholder, ThoughtWriter};
