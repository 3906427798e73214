//! Resumable, chunked bulk import
//!
//! This crate imports outline files into a thought tree so that an import
//! interrupted at any point can be resumed later without losing more than one
//! chunk and without duplicating merged content.
//!
//! ## Components
//!
//! - [`request`]: caller-facing request and its validation
//! - [`normalizer`]: fresh files and recovered manifests as one [`ResumableFile`] shape
//! - [`snapshot`]: structured snapshot detection, legacy repair and flattening
//! - [`chunker`]: fixed-size, line-aligned chunking
//! - [`offset`]: lines completed to resume chunk index
//! - [`scheduler`]: strictly serial execution of async tasks
//! - [`ledger`]: manifests and text blobs over the progress store
//! - [`pipeline`]: the orchestrator tying it all together
//!
//! Files are imported one at a time and chunks within a file in ascending
//! order. The manifest update for chunk `k` is durable before chunk `k + 1`
//! is dispatched.

pub mod chunker;
pub mod error;
pub mod ledger;
pub mod normalizer;
pub mod offset;
pub mod pipeline;
pub mod request;
pub mod scheduler;
pub mod snapshot;
pub mod source;

pub use chunker::{chunk_outline, line_count, Chunk};
pub use error::{ImportError, ImportResult};
pub use ledger::{blob_key, PendingImport, ProgressLedger, MANIFESTS_KEY};
pub use normalizer::{ResumableFile, TextSource};
pub use offset::{lines_after_chunk, resume_offset};
pub use pipeline::{
    FileOutcome, FileReport, ImportPipeline, ImportServices, ImportSettings, ImportSummary,
};
pub use request::{ImportMode, ImportRequest};
pub use scheduler::{series, OnFailure, SerialScheduler, SeriesReport, Task};
pub use source::{DiskFile, MemoryFile, VirtualFile};
