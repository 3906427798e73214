//! `grove import` and `grove resume`

use anyhow::{bail, Context, Result};
use colored::Colorize;
use grove_core::{DestinationPath, Notifier};
use grove_import::{DiskFile, ImportRequest, ImportSummary, VirtualFile};
use std::path::PathBuf;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::backend::Backend;
use crate::config::CliConfig;

/// Import `files` beneath `path`
pub async fn execute(
    config: CliConfig,
    files: Vec<PathBuf>,
    path: Option<String>,
    insert_before: bool,
    notifier: Arc<dyn Notifier>,
    cancel: CancellationToken,
) -> Result<()> {
    let mut sources: Vec<Box<dyn VirtualFile>> = Vec::with_capacity(files.len());
    for file in &files {
        let source = DiskFile::open(file)
            .await
            .with_context(|| format!("Cannot read {}", file.display()))?;
        sources.push(Box::new(source));
    }

    let mut request = ImportRequest::files(sources).with_insert_before(insert_before);
    if let Some(path) = path {
        request = request.with_path(DestinationPath::parse(&path));
    }

    let backend = Backend::open(&config)?;
    let summary = backend
        .pipeline(&config, notifier, cancel)
        .run(request)
        .await
        .context("Import failed")?;
    report(&summary)
}

/// Resume every unfinished import
pub async fn resume(
    config: CliConfig,
    notifier: Arc<dyn Notifier>,
    cancel: CancellationToken,
) -> Result<()> {
    let backend = Backend::open(&config)?;
    let summary = backend
        .pipeline(&config, notifier, cancel)
        .run(ImportRequest::resume())
        .await
        .context("Resume failed")?;

    if summary.files.is_empty() && summary.not_started == 0 {
        println!("Nothing to resume");
        return Ok(());
    }
    report(&summary)
}

fn report(summary: &ImportSummary) -> Result<()> {
    for outcome in &summary.files {
        match &outcome.result {
            Ok(file) => println!(
                "{} {} ({} lines, {} chunks)",
                "Imported".green().bold(),
                outcome.name,
                file.total_lines,
                file.chunks_merged
            ),
            Err(e) => println!("{} {}: {}", "Failed".red().bold(), outcome.name, e),
        }
    }
    if let Some(path) = &summary.import_path {
        info!(path = %path, "import destination");
    }

    if summary.cancelled {
        bail!(
            "Import cancelled; {} file(s) not started. Run `grove import` again for them",
            summary.not_started
        );
    }
    let failed = summary.failed().count();
    if failed > 0 || summary.not_started > 0 {
        bail!(
            "{failed} file(s) failed, {} not started. Run `grove resume` to continue",
            summary.not_started
        );
    }
    Ok(())
}
