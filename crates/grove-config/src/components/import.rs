//! Import component configuration
//!
//! Chunk size and notification timing for the bulk import pipeline.

use serde::{Deserialize, Serialize};

/// Lines of outline text merged per chunk.
///
/// Small enough that slow devices report steady progress, large enough that
/// per-chunk persistence overhead stays low.
pub const DEFAULT_CHUNK_SIZE: usize = 20;

/// How far a failed file import propagates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureScope {
    /// Abort the failed file only and continue with the next one
    #[default]
    File,
    /// Stop the whole run after the first failed file
    Run,
}

/// Import component configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImportConfig {
    pub chunk_size: usize,
    /// Clear delay attached to the progress alert of a file's last chunk
    pub progress_clear_delay_ms: u64,
    /// Clear delay of the final "import complete" alert
    pub complete_clear_delay_ms: u64,
    /// Depth limit of the pre-resume destination pull; unbounded when unset
    pub pull_max_depth: Option<usize>,
    pub failure_scope: FailureScope,
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            progress_clear_delay_ms: 5000,
            complete_clear_delay_ms: 5000,
            pull_max_depth: None,
            failure_scope: FailureScope::File,
        }
    }
}
