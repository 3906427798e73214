//! Import requests
//!
//! A request either names new files or asks to resume unfinished imports.
//! Validation is pure: an invalid request is rejected before any storage is
//! touched.

use crate::error::{ImportError, ImportResult};
use crate::source::VirtualFile;
use grove_core::DestinationPath;

/// Caller-facing import request
#[derive(Default)]
pub struct ImportRequest {
    pub files: Option<Vec<Box<dyn VirtualFile>>>,
    /// Create an empty thought before `path` and import into it
    pub insert_before: bool,
    /// Destination; defaults to the home context
    pub path: Option<DestinationPath>,
    pub resume: bool,
}

impl ImportRequest {
    /// Import `files` into the home context
    pub fn files(files: Vec<Box<dyn VirtualFile>>) -> Self {
        Self {
            files: Some(files),
            ..Self::default()
        }
    }

    /// Resume every unfinished import
    pub fn resume() -> Self {
        Self {
            resume: true,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_path(mut self, path: DestinationPath) -> Self {
        self.path = Some(path);
        self
    }

    #[must_use]
    pub fn with_insert_before(mut self, insert_before: bool) -> Self {
        self.insert_before = insert_before;
        self
    }

    /// Validate into an [`ImportMode`]
    pub fn into_mode(self) -> ImportResult<ImportMode> {
        match (self.files, self.resume) {
            (None, false) => Err(ImportError::InvalidRequest(
                "either files or resume must be given".to_string(),
            )),
            (Some(_), true) => Err(ImportError::InvalidRequest(
                "files and resume are mutually exclusive".to_string(),
            )),
            (Some(files), false) => Ok(ImportMode::Fresh {
                files,
                path: self.path.unwrap_or_else(DestinationPath::home),
                insert_before: self.insert_before,
            }),
            (None, true) => Ok(ImportMode::Resume),
        }
    }
}

/// A validated request
pub enum ImportMode {
    Fresh {
        files: Vec<Box<dyn VirtualFile>>,
        path: DestinationPath,
        insert_before: bool,
    },
    /// Destinations come from the recorded manifests
    Resume,
}

impl std::fmt::Debug for ImportMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Fresh {
                files,
                path,
                insert_before,
            } => f
                .debug_struct("Fresh")
                .field("files", &files.iter().map(|file| file.name()).collect::<Vec<_>>())
                .field("path", path)
                .field("insert_before", insert_before)
                .finish(),
            Self::Resume => f.write_str("Resume"),
        }
    }
}
