//! `grove pending`

use anyhow::Result;
use comfy_table::{Cell, Color, Table};
use grove_core::NullNotifier;
use grove_import::{ImportPipeline, PendingImport};
use serde_json::json;
use std::sync::Arc;

use crate::backend::Backend;
use crate::config::CliConfig;

pub async fn execute(config: CliConfig, format: String) -> Result<()> {
    let backend = Backend::open(&config)?;
    let pipeline = ImportPipeline::with_settings(
        backend.services(Arc::new(NullNotifier)),
        config.import_settings(),
    );
    let pending = pipeline.pending().await?;

    match format.as_str() {
        "json" => println!("{}", serde_json::to_string_pretty(&to_json(&pending))?),
        _ if pending.is_empty() => println!("No unfinished imports"),
        _ => println!("{}", table(&pending)),
    }
    Ok(())
}

fn to_json(pending: &[PendingImport]) -> serde_json::Value {
    pending
        .iter()
        .map(|p| {
            json!({
                "manifest": p.manifest,
                "hasBlob": p.has_blob,
            })
        })
        .collect()
}

pub fn table(pending: &[PendingImport]) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        "Id",
        "Name",
        "Lines done",
        "Size",
        "Modified",
        "Destination",
        "Text",
    ]);

    for p in pending {
        let blob = if p.has_blob {
            Cell::new("stored").fg(Color::Green)
        } else {
            Cell::new("missing").fg(Color::Red)
        };
        table.add_row(vec![
            Cell::new(p.manifest.id.as_str()),
            Cell::new(&p.manifest.name),
            Cell::new(p.manifest.lines_completed.to_string()),
            Cell::new(p.manifest.size.to_string()),
            Cell::new(p.manifest.last_modified.format("%Y-%m-%d %H:%M").to_string()),
            Cell::new(p.manifest.path.to_string()),
            blob,
        ]);
    }
    table
}
