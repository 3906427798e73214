//! File normalization
//!
//! Fresh files and resumed imports are turned into one uniform shape, a
//! [`ResumableFile`], so the pipeline handles both the same way.

use crate::error::{ImportError, ImportResult};
use crate::ledger::ProgressLedger;
use crate::request::ImportMode;
use crate::source::VirtualFile;
use grove_core::{DestinationPath, ImportId, ImportManifest};
use tracing::{debug, warn};

/// Where a file's text comes from
pub enum TextSource {
    /// Read from the caller-supplied file
    Fresh(Box<dyn VirtualFile>),
    /// Read from the blob stored by an earlier run
    Stored,
}

/// A file ready to be imported, new or resumed
pub struct ResumableFile {
    pub manifest: ImportManifest,
    source: TextSource,
}

impl ResumableFile {
    /// A file that has not been imported before, with a fresh id
    pub fn fresh(file: Box<dyn VirtualFile>, path: DestinationPath) -> Self {
        let manifest = ImportManifest::new(
            ImportId::generate(),
            file.name(),
            file.size(),
            file.last_modified(),
            path,
        );
        Self {
            manifest,
            source: TextSource::Fresh(file),
        }
    }

    /// An unfinished import recovered from its manifest
    pub fn resumed(manifest: ImportManifest) -> Self {
        Self {
            manifest,
            source: TextSource::Stored,
        }
    }

    pub fn id(&self) -> &ImportId {
        &self.manifest.id
    }

    pub fn name(&self) -> &str {
        &self.manifest.name
    }

    pub fn is_resumed(&self) -> bool {
        matches!(self.source, TextSource::Stored)
    }

    /// Full text of the file.
    ///
    /// A resumed import whose blob has gone missing reads as empty text.
    pub async fn text(&self, ledger: &ProgressLedger) -> ImportResult<String> {
        match &self.source {
            TextSource::Fresh(file) => file.text().await.map_err(|source| ImportError::Read {
                name: file.name().to_string(),
                source,
            }),
            TextSource::Stored => match ledger.blob(&self.manifest.id).await? {
                Some(text) => Ok(text),
                None => {
                    warn!(
                        import_id = %self.manifest.id,
                        name = %self.manifest.name,
                        "stored text missing, resuming with empty content"
                    );
                    Ok(String::new())
                }
            },
        }
    }
}

impl std::fmt::Debug for ResumableFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResumableFile")
            .field("manifest", &self.manifest)
            .field("resumed", &self.is_resumed())
            .finish()
    }
}

/// Normalize a validated request into the files to import.
///
/// Fresh files all attach at `import_path`, in input order. Resumed imports
/// keep their recorded destination and run in the order they were created.
pub async fn normalize(
    mode: ImportMode,
    import_path: &DestinationPath,
    ledger: &ProgressLedger,
) -> ImportResult<Vec<ResumableFile>> {
    match mode {
        ImportMode::Fresh { files, .. } => Ok(files
            .into_iter()
            .map(|file| ResumableFile::fresh(file, import_path.clone()))
            .collect()),
        ImportMode::Resume => {
            let manifests = ledger.manifests_in_order().await?;
            debug!(count = manifests.len(), "recovered unfinished imports");
            Ok(manifests.into_iter().map(ResumableFile::resumed).collect())
        }
    }
}
