//! Plain-text outline export of structured snapshots

use crate::error::ExportError;
use crate::outline;
use crate::traits::{ContextExporter, ExportFormat};
use crate::types::{ThoughtId, ThoughtIndices};
use std::collections::HashSet;

/// Exports a snapshot as a `- value` outline ordered by rank.
///
/// Relies on the derived children maps; legacy snapshots must be repaired first.
#[derive(Debug, Clone, Copy, Default)]
pub struct OutlineExporter;

impl OutlineExporter {
    pub fn new() -> Self {
        Self
    }

    fn walk<'a>(
        snapshot: &'a ThoughtIndices,
        id: &ThoughtId,
        depth: usize,
        visiting: &mut HashSet<ThoughtId>,
        out: &mut Vec<(usize, &'a str)>,
    ) -> Result<(), ExportError> {
        if !visiting.insert(id.clone()) {
            return Err(ExportError::Cycle(id.clone()));
        }
        for child in snapshot.children_of(id) {
            out.push((depth, child.value.as_str()));
            Self::walk(snapshot, &child.id, depth + 1, visiting, out)?;
        }
        visiting.remove(id);
        Ok(())
    }
}

impl ContextExporter for OutlineExporter {
    fn export_context(
        &self,
        snapshot: &ThoughtIndices,
        root: &ThoughtId,
        format: ExportFormat,
    ) -> Result<String, ExportError> {
        match format {
            ExportFormat::PlainText => {}
        }

        if !snapshot.thought_index.contains_key(root) {
            return Err(ExportError::RootNotFound(root.clone()));
        }

        let mut entries = Vec::new();
        Self::walk(snapshot, root, 0, &mut HashSet::new(), &mut entries)?;
        Ok(outline::render(entries))
    }
}
