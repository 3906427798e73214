//! Structured snapshot normalization
//!
//! A structured snapshot is the JSON dump of a thought tree. Before it can be
//! chunked it is parsed, repaired if it predates derived children maps, and
//! flattened to outline text beneath the home context.

use crate::error::ImportResult;
use grove_core::{ContextExporter, ExportFormat, ThoughtId, ThoughtIndices};
use tracing::debug;

/// Structured snapshots are detected by their leading `{`
pub fn is_structured(text: &str) -> bool {
    text.starts_with('{')
}

/// Parse snapshot text
pub fn parse(text: &str) -> ImportResult<ThoughtIndices> {
    Ok(serde_json::from_str(text)?)
}

/// Synthesize the derived children map for every thought lacking one.
///
/// Returns the number of thoughts repaired. Current snapshots are untouched.
pub fn repair_children_maps(indices: &mut ThoughtIndices) -> usize {
    if !indices.needs_children_map() {
        return 0;
    }

    let repairs: Vec<_> = indices
        .thought_index
        .values()
        .filter(|thought| thought.children_map.is_none())
        .map(|thought| {
            let map = indices.children_map_for(&thought.raw_child_ids());
            (thought.id.clone(), map)
        })
        .collect();

    let repaired = repairs.len();
    for (id, map) in repairs {
        if let Some(thought) = indices.thought_index.get_mut(&id) {
            thought.children_map = Some(map);
        }
    }
    debug!(repaired, "synthesized children maps for legacy snapshot");
    repaired
}

/// Flatten a parsed snapshot to outline text rooted at the home context
pub fn flatten(indices: &ThoughtIndices, exporter: &dyn ContextExporter) -> ImportResult<String> {
    Ok(exporter.export_context(indices, &ThoughtId::home(), ExportFormat::PlainText)?)
}
