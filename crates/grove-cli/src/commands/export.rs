//! `grove export`

use anyhow::{Context, Result};
use grove_core::{ContextExporter, ExportFormat, OutlineExporter, ThoughtId};

use crate::backend::Backend;
use crate::config::CliConfig;

pub async fn execute(config: CliConfig, root: Option<String>) -> Result<()> {
    let backend = Backend::open(&config)?;
    let snapshot = backend.tree.snapshot().await?;
    let root = root.map(ThoughtId::from).unwrap_or_else(ThoughtId::home);

    let text = OutlineExporter
        .export_context(&snapshot, &root, ExportFormat::PlainText)
        .with_context(|| format!("Cannot export {root}"))?;
    if !text.is_empty() {
        println!("{text}");
    }
    Ok(())
}
