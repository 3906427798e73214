//! Import sources
//!
//! A [`VirtualFile`] is anything that can be read as text and describes
//! itself with a name, size and modification time.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::io;
use std::path::{Path, PathBuf};

/// A readable file-like source
#[async_trait]
pub trait VirtualFile: Send + Sync {
    fn name(&self) -> &str;

    /// Size in bytes
    fn size(&self) -> u64;

    fn last_modified(&self) -> DateTime<Utc>;

    /// Full text content
    async fn text(&self) -> io::Result<String>;
}

/// A file on the local filesystem
#[derive(Debug, Clone)]
pub struct DiskFile {
    path: PathBuf,
    name: String,
    size: u64,
    last_modified: DateTime<Utc>,
}

impl DiskFile {
    /// Stat `path`. The content is not read until [`VirtualFile::text`].
    pub async fn open(path: impl AsRef<Path>) -> io::Result<Self> {
        let path = path.as_ref().to_path_buf();
        let metadata = tokio::fs::metadata(&path).await?;
        if !metadata.is_file() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("{} is not a file", path.display()),
            ));
        }

        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        let last_modified = metadata
            .modified()
            .map(DateTime::<Utc>::from)
            .unwrap_or_else(|_| Utc::now());

        Ok(Self {
            path,
            name,
            size: metadata.len(),
            last_modified,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl VirtualFile for DiskFile {
    fn name(&self) -> &str {
        &self.name
    }

    fn size(&self) -> u64 {
        self.size
    }

    fn last_modified(&self) -> DateTime<Utc> {
        self.last_modified
    }

    async fn text(&self) -> io::Result<String> {
        tokio::fs::read_to_string(&self.path).await
    }
}

/// An in-memory source
#[derive(Debug, Clone)]
pub struct MemoryFile {
    name: String,
    text: String,
    last_modified: DateTime<Utc>,
}

impl MemoryFile {
    pub fn new(name: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            text: text.into(),
            last_modified: Utc::now(),
        }
    }

    #[must_use]
    pub fn with_last_modified(mut self, last_modified: DateTime<Utc>) -> Self {
        self.last_modified = last_modified;
        self
    }
}

#[async_trait]
impl VirtualFile for MemoryFile {
    fn name(&self) -> &str {
        &self.name
    }

    fn size(&self) -> u64 {
        self.text.len() as u64
    }

    fn last_modified(&self) -> DateTime<Utc> {
        self.last_modified
    }

    async fn text(&self) -> io::Result<String> {
        Ok(self.text.clone())
    }
}
