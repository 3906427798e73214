//! Import Orchestrator
//!
//! Drives files through the import state machine, one file at a time:
//!
//! ```text
//! Reading -> Persisting (fresh only) -> Normalizing -> Chunking -> Importing -> Completed
//! ```
//!
//! Progress is recorded in the [`ProgressLedger`] after every durable chunk, so
//! an interrupted run loses at most the chunk in flight. A file that fails
//! keeps its manifest; `resume` picks it up from the last recorded line.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use grove_import::{ImportPipeline, ImportRequest, ImportServices};
//!
//! let pipeline = ImportPipeline::new(services);
//! let summary = pipeline.run(ImportRequest::files(files)).await?;
//!
//! // later, after a crash
//! pipeline.run(ImportRequest::resume()).await?;
//! ```

use crate::chunker::{chunk_outline, line_count, Chunk};
use crate::error::{ImportError, ImportResult};
use crate::ledger::{PendingImport, ProgressLedger};
use crate::normalizer::{normalize, ResumableFile};
use crate::offset::{lines_after_chunk, resume_offset};
use crate::request::{ImportMode, ImportRequest};
use crate::scheduler::{series, task, OnFailure, SerialScheduler, Task};
use crate::snapshot;
use grove_config::{FailureScope, ImportConfig};
use grove_core::{
    Alert, AlertType, ContextExporter, DestinationPath, ImportId, ImportManifest, ImportMerger,
    MergeRequest, Notifier, Placeholder, ProgressStore, PullOptions, SubtreeSync, ThoughtId,
    ThoughtWriter,
};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Collaborators the pipeline talks through
#[derive(Clone)]
pub struct ImportServices {
    pub store: Arc<dyn ProgressStore>,
    pub merger: Arc<dyn ImportMerger>,
    pub sync: Arc<dyn SubtreeSync>,
    pub writer: Arc<dyn ThoughtWriter>,
    pub exporter: Arc<dyn ContextExporter>,
    pub notifier: Arc<dyn Notifier>,
}

/// Runtime import settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportSettings {
    /// Lines per chunk
    pub chunk_size: usize,
    /// Clear delay of each file's last progress alert
    pub progress_clear_delay: Duration,
    /// Clear delay of the final alert of a run
    pub complete_clear_delay: Duration,
    /// Depth limit of the pull before each resumed chunk
    pub pull_max_depth: Option<usize>,
    pub failure_scope: FailureScope,
}

impl From<&ImportConfig> for ImportSettings {
    fn from(config: &ImportConfig) -> Self {
        Self {
            chunk_size: config.chunk_size.max(1),
            progress_clear_delay: Duration::from_millis(config.progress_clear_delay_ms),
            complete_clear_delay: Duration::from_millis(config.complete_clear_delay_ms),
            pull_max_depth: config.pull_max_depth,
            failure_scope: config.failure_scope,
        }
    }
}

impl Default for ImportSettings {
    fn default() -> Self {
        Self::from(&ImportConfig::default())
    }
}

impl ImportSettings {
    #[must_use]
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }

    #[must_use]
    pub fn with_failure_scope(mut self, failure_scope: FailureScope) -> Self {
        self.failure_scope = failure_scope;
        self
    }

    fn on_failure(&self) -> OnFailure {
        match self.failure_scope {
            FailureScope::File => OnFailure::Continue,
            FailureScope::Run => OnFailure::Stop,
        }
    }
}

/// What happened to one completed file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileReport {
    /// Lines in the normalized outline
    pub total_lines: usize,
    /// Chunks merged by this run
    pub chunks_merged: usize,
    /// Chunks skipped because an earlier run already merged them
    pub chunks_skipped: usize,
}

/// Outcome of one file that was started
#[derive(Debug)]
pub struct FileOutcome {
    pub id: ImportId,
    pub name: String,
    pub resumed: bool,
    pub result: Result<FileReport, ImportError>,
}

/// Outcome of a whole run
#[derive(Debug, Default)]
pub struct ImportSummary {
    /// Where fresh files were imported, after placeholder redirection
    pub import_path: Option<DestinationPath>,
    /// Files that were started, in order
    pub files: Vec<FileOutcome>,
    /// Files never started because of an earlier failure or cancellation
    pub not_started: usize,
    pub cancelled: bool,
}

impl ImportSummary {
    pub fn completed(&self) -> usize {
        self.files.iter().filter(|f| f.result.is_ok()).count()
    }

    pub fn failed(&self) -> impl Iterator<Item = &FileOutcome> {
        self.files.iter().filter(|f| f.result.is_err())
    }

    /// True if every file completed
    pub fn is_success(&self) -> bool {
        self.not_started == 0 && !self.cancelled && self.failed().next().is_none()
    }
}

/// Position of a file within its run, for progress labels
#[derive(Debug, Clone, Copy)]
struct FilePosition {
    index: usize,
    total: usize,
}

impl FilePosition {
    fn label(&self, name: &str) -> String {
        if self.total > 1 {
            format!("{name} ({}/{})", self.index + 1, self.total)
        } else {
            name.to_string()
        }
    }
}

fn percent(done: usize, total: usize) -> usize {
    if total == 0 {
        100
    } else {
        done * 100 / total
    }
}

/// The import orchestrator
///
/// ```text
/// ImportPipeline
///   ├─> ProgressLedger   (manifests + blobs over ProgressStore)
///   ├─> ThoughtWriter    (insert-before placeholder)
///   ├─> ContextExporter  (structured snapshot flattening)
///   ├─> SubtreeSync      (pull before resumed chunks)
///   ├─> ImportMerger     (chunk merge + durability receipt)
///   └─> Notifier         (progress alerts)
/// ```
pub struct ImportPipeline {
    ledger: ProgressLedger,
    merger: Arc<dyn ImportMerger>,
    sync: Arc<dyn SubtreeSync>,
    writer: Arc<dyn ThoughtWriter>,
    exporter: Arc<dyn ContextExporter>,
    notifier: Arc<dyn Notifier>,
    settings: ImportSettings,
    cancel: CancellationToken,
}

impl ImportPipeline {
    /// Create a pipeline with default settings
    pub fn new(services: ImportServices) -> Self {
        Self::with_settings(services, ImportSettings::default())
    }

    /// Create a pipeline with custom settings
    pub fn with_settings(services: ImportServices, settings: ImportSettings) -> Self {
        Self {
            ledger: ProgressLedger::new(services.store),
            merger: services.merger,
            sync: services.sync,
            writer: services.writer,
            exporter: services.exporter,
            notifier: services.notifier,
            settings,
            cancel: CancellationToken::new(),
        }
    }

    /// Use `token` to stop the run between files
    #[must_use]
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    pub fn settings(&self) -> &ImportSettings {
        &self.settings
    }

    pub fn ledger(&self) -> &ProgressLedger {
        &self.ledger
    }

    /// Unfinished imports left by earlier runs
    pub async fn pending(&self) -> ImportResult<Vec<PendingImport>> {
        Ok(self.ledger.pending().await?)
    }

    /// Give up on an unfinished import, deleting its blob and manifest.
    ///
    /// Returns whether the import was known.
    pub async fn abandon(&self, id: &ImportId) -> ImportResult<bool> {
        let existed = self.ledger.discard(id).await?;
        if existed {
            info!(import_id = %id, "import abandoned");
        } else {
            debug!(import_id = %id, "abandon: no such import");
        }
        Ok(existed)
    }

    /// Run an import request.
    ///
    /// The request is validated before anything else happens. Per-file
    /// failures are reported in the summary; errors returned here concern the
    /// run as a whole.
    pub async fn run(&self, request: ImportRequest) -> ImportResult<ImportSummary> {
        let mode = request.into_mode()?;
        if self.cancel.is_cancelled() {
            return Err(ImportError::Cancelled);
        }

        let import_path = match &mode {
            ImportMode::Fresh {
                path,
                insert_before: true,
                ..
            } => Some(self.insert_placeholder(path).await?),
            ImportMode::Fresh { path, .. } => Some(path.clone()),
            ImportMode::Resume => None,
        };

        let files = normalize(
            mode,
            import_path.as_ref().unwrap_or(&DestinationPath::home()),
            &self.ledger,
        )
        .await?;
        let total = files.len();
        info!(files = total, "starting import run");

        let started: Vec<(ImportId, String, bool)> = files
            .iter()
            .map(|f| (f.id().clone(), f.name().to_string(), f.is_resumed()))
            .collect();

        let tasks: Vec<Task<'_, FileReport, ImportError>> = files
            .into_iter()
            .enumerate()
            .map(|(index, file)| {
                let position = FilePosition { index, total };
                task(move || self.import_file(file, position))
            })
            .collect();

        let report = SerialScheduler::new(self.settings.on_failure())
            .with_cancellation(self.cancel.clone())
            .run(tasks)
            .await;

        let summary = ImportSummary {
            import_path,
            not_started: report.not_started,
            cancelled: report.cancelled,
            files: started
                .into_iter()
                .zip(report.outcomes)
                .map(|((id, name, resumed), result)| FileOutcome {
                    id,
                    name,
                    resumed,
                    result,
                })
                .collect(),
        };

        for outcome in summary.failed() {
            if let Err(e) = &outcome.result {
                warn!(import_id = %outcome.id, name = %outcome.name, error = %e, "file import failed");
            }
        }
        if total > 0 {
            self.notify_finished(&summary);
        }
        info!(
            completed = summary.completed(),
            not_started = summary.not_started,
            cancelled = summary.cancelled,
            "import run finished"
        );
        Ok(summary)
    }

    /// Create an empty thought before the head of `path` and return the path
    /// that redirects into it. Done once per run, shared by every fresh file.
    async fn insert_placeholder(&self, path: &DestinationPath) -> ImportResult<DestinationPath> {
        let id = ThoughtId::generate();
        let parent = path.parent();
        let placeholder = Placeholder {
            id: id.clone(),
            parent: parent.clone(),
            before: path.head(),
        };
        self.writer
            .create_placeholder(placeholder)
            .await
            .map_err(ImportError::Placeholder)?;
        debug!(placeholder = %id, before = %path.head(), "created insert-before placeholder");
        Ok(parent.child(id))
    }

    async fn import_file(
        &self,
        file: ResumableFile,
        position: FilePosition,
    ) -> ImportResult<FileReport> {
        let label = position.label(file.name());
        let resumed = file.is_resumed();
        info!(import_id = %file.id(), name = %file.name(), resumed, "importing file");

        // Reading
        self.alert(if resumed {
            format!("Resume import of {label}")
        } else {
            format!("Reading {label}")
        });
        let text = file.text(&self.ledger).await?;

        // Persisting: the blob goes first so a manifest never points at nothing
        if !resumed {
            self.alert(format!("Storing {label}"));
            self.ledger.put_blob(file.id(), &text).await?;
            if let Err(e) = self.ledger.upsert_manifest(&file.manifest).await {
                // a blob is only reachable through its manifest
                if let Err(cleanup) = self.ledger.delete_blob(file.id()).await {
                    warn!(
                        import_id = %file.id(),
                        error = %cleanup,
                        "could not remove blob of unrecorded import"
                    );
                }
                return Err(e.into());
            }
        }

        // Normalizing
        let outline = if snapshot::is_structured(&text) {
            self.alert(format!("Parsing {label}"));
            let mut indices = snapshot::parse(&text)?;
            self.alert(format!("Normalizing {label}"));
            snapshot::repair_children_maps(&mut indices);
            snapshot::flatten(&indices, self.exporter.as_ref())?
        } else {
            text
        };

        // Chunking
        let chunk_size = self.settings.chunk_size;
        let total_lines = line_count(&outline);
        let chunks = chunk_outline(&outline, chunk_size);
        let skip = if file.manifest.lines_completed >= total_lines {
            chunks.len()
        } else {
            resume_offset(file.manifest.lines_completed, chunk_size).min(chunks.len())
        };
        debug!(
            import_id = %file.id(),
            total_lines,
            chunks = chunks.len(),
            skip,
            "outline chunked"
        );

        // Importing
        let chunk_count = chunks.len();
        let manifest = &file.manifest;
        let tasks: Vec<Task<'_, (), ImportError>> = chunks
            .into_iter()
            .skip(skip)
            .map(|chunk| {
                let label = label.as_str();
                task(move || {
                    self.import_chunk(manifest, chunk, chunk_count, total_lines, resumed, label)
                })
            })
            .collect();
        let merged = series(tasks).await?.len();

        // Completed
        self.ledger.delete_blob(file.id()).await?;
        self.ledger.remove_manifest(file.id()).await?;
        info!(import_id = %file.id(), name = %file.name(), merged, skipped = skip, "file imported");

        Ok(FileReport {
            total_lines,
            chunks_merged: merged,
            chunks_skipped: skip,
        })
    }

    async fn import_chunk(
        &self,
        manifest: &ImportManifest,
        chunk: Chunk,
        chunk_count: usize,
        total_lines: usize,
        resumed: bool,
        label: &str,
    ) -> ImportResult<()> {
        if resumed {
            let options = PullOptions {
                force: true,
                max_depth: self.settings.pull_max_depth,
            };
            self.sync.pull(&[manifest.path.head()], options).await?;
        }

        let is_last = chunk.index + 1 == chunk_count;
        let mut alert = Alert::new(format!(
            "Importing {label}... {}%",
            percent(chunk.index + 1, chunk_count)
        ))
        .with_type(AlertType::ImportFile);
        if is_last {
            alert = alert.with_clear_delay(self.settings.progress_clear_delay);
        }
        self.notifier.alert(alert);

        debug!(
            import_id = %manifest.id,
            chunk = chunk.index,
            start_line = chunk.start_line,
            lines = chunk.line_count,
            "dispatching chunk"
        );
        let request = MergeRequest::new(chunk.text, manifest.path.clone())
            .with_ancestors(chunk.ancestors);
        self.merger.dispatch(request).await?.durable().await?;

        let lines_completed = lines_after_chunk(chunk.index, self.settings.chunk_size, total_lines);
        self.ledger
            .upsert_manifest(&manifest.clone().with_lines_completed(lines_completed))
            .await?;
        Ok(())
    }

    fn alert(&self, message: String) {
        self.notifier
            .alert(Alert::new(message).with_type(AlertType::ImportFile));
    }

    fn notify_finished(&self, summary: &ImportSummary) {
        let failed = summary.failed().count();
        let message = if summary.cancelled {
            "Import cancelled".to_string()
        } else if failed > 0 {
            format!("Import finished with {failed} failed file(s)")
        } else {
            "Import complete".to_string()
        };
        self.notifier.alert(
            Alert::new(message)
                .with_type(AlertType::ImportFile)
                .with_clear_delay(self.settings.complete_clear_delay),
        );
    }
}
