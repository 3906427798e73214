//! Snapshot flattening

use crate::error::ExportError;
use crate::types::{ThoughtId, ThoughtIndices};
use std::str::FromStr;

/// Output format of [`ContextExporter::export_context`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExportFormat {
    /// `- value` outline, two spaces per level
    #[default]
    PlainText,
}

impl ExportFormat {
    pub fn mime_type(&self) -> &'static str {
        match self {
            Self::PlainText => "text/plain",
        }
    }
}

impl FromStr for ExportFormat {
    type Err = ExportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "text/plain" | "text" | "plain" => Ok(Self::PlainText),
            other => Err(ExportError::UnsupportedFormat(other.to_string())),
        }
    }
}

/// Flattens a structured snapshot into outline text
pub trait ContextExporter: Send + Sync {
    /// Export the descendants of `root` (excluding `root` itself)
    fn export_context(
        &self,
        snapshot: &ThoughtIndices,
        root: &ThoughtId,
        format: ExportFormat,
    ) -> Result<String, ExportError>;
}
