//! `grove abandon`

use anyhow::{bail, Result};
use colored::Colorize;
use grove_core::{ImportId, NullNotifier};
use grove_import::ImportPipeline;
use std::sync::Arc;

use crate::backend::Backend;
use crate::config::CliConfig;

pub async fn execute(config: CliConfig, id: String) -> Result<()> {
    let backend = Backend::open(&config)?;
    let pipeline = ImportPipeline::with_settings(
        backend.services(Arc::new(NullNotifier)),
        config.import_settings(),
    );

    if !pipeline.abandon(&ImportId::new(id.clone())).await? {
        bail!("No unfinished import with id {id}");
    }
    println!("{} import {}", "Abandoned".yellow().bold(), id);
    Ok(())
}
