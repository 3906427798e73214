//! SQLite-backed collaborators for the import pipeline

use crate::config::CliConfig;
use anyhow::{Context, Result};
use grove_core::{DedupNotifier, Notifier, OutlineExporter};
use grove_import::{ImportPipeline, ImportServices};
use grove_sqlite::{SqlitePool, SqliteProgressStore, SqliteThoughtStore};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

pub struct Backend {
    pub progress: SqliteProgressStore,
    pub tree: SqliteThoughtStore,
}

impl Backend {
    pub fn open(config: &CliConfig) -> Result<Self> {
        let pool = SqlitePool::new(config.sqlite_config()).with_context(|| {
            format!(
                "Failed to open database at {}",
                config.database_path().display()
            )
        })?;
        Ok(Self {
            progress: SqliteProgressStore::new(pool.clone()),
            tree: SqliteThoughtStore::new(pool),
        })
    }

    pub fn services(&self, notifier: Arc<dyn Notifier>) -> ImportServices {
        ImportServices {
            store: Arc::new(self.progress.clone()),
            merger: Arc::new(self.tree.clone()),
            sync: Arc::new(self.tree.clone()),
            writer: Arc::new(self.tree.clone()),
            exporter: Arc::new(OutlineExporter),
            notifier: Arc::new(DedupNotifier::new(notifier)),
        }
    }

    /// Pipeline over this backend, stopped between files by `cancel`
    pub fn pipeline(
        &self,
        config: &CliConfig,
        notifier: Arc<dyn Notifier>,
        cancel: CancellationToken,
    ) -> ImportPipeline {
        ImportPipeline::with_settings(self.services(notifier), config.import_settings())
            .with_cancellation(cancel)
    }
}
