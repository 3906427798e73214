//! Effective CLI configuration: config file plus command-line overrides

use anyhow::{Context, Result};
use grove_config::{ConfigLoader, GroveConfig};
use grove_import::ImportSettings;
use grove_sqlite::SqliteConfig;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct CliConfig {
    pub config: GroveConfig,
    /// File the configuration was loaded from, if an explicit one was given
    pub source: Option<PathBuf>,
}

impl CliConfig {
    /// Load the config file and apply overrides
    pub async fn load(
        config_path: Option<PathBuf>,
        db_path: Option<PathBuf>,
        chunk_size: Option<usize>,
    ) -> Result<Self> {
        let mut config = ConfigLoader::load_or_default(config_path.as_deref())
            .await
            .with_context(|| match &config_path {
                Some(path) => format!("Failed to load config from {}", path.display()),
                None => "Failed to load default config".to_string(),
            })?;

        if let Some(db_path) = db_path {
            config.storage.database_path = db_path;
        }
        if let Some(chunk_size) = chunk_size {
            config.import.chunk_size = chunk_size;
        }
        config.validate().context("Invalid configuration")?;

        Ok(Self {
            config,
            source: config_path,
        })
    }

    pub fn database_path(&self) -> &Path {
        &self.config.storage.database_path
    }

    pub fn sqlite_config(&self) -> SqliteConfig {
        SqliteConfig::new(self.database_path())
            .with_wal_mode(self.config.storage.wal_mode)
            .with_busy_timeout_ms(self.config.storage.busy_timeout_ms)
    }

    pub fn import_settings(&self) -> ImportSettings {
        ImportSettings::from(&self.config.import)
    }
}
