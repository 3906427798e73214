//! Configuration loading

use crate::config::GroveConfig;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

/// Errors raised while loading configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// I/O error reading the config file
    #[error("I/O error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// TOML parsing error
    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// TOML serialization error
    #[error("TOML serialization error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    /// A value is out of range
    #[error("Invalid configuration: {0}")]
    Validation(String),
}

/// Result type for configuration operations
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Loads [`GroveConfig`] from disk
pub struct ConfigLoader;

impl ConfigLoader {
    /// Default config file location (`~/.config/grove/config.toml`)
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("grove").join("config.toml"))
    }

    /// Load and validate the config file at `path`
    pub async fn load_from_file(path: impl AsRef<Path>) -> ConfigResult<GroveConfig> {
        let path = path.as_ref();
        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| ConfigError::Io {
                path: path.to_path_buf(),
                source,
            })?;
        let config: GroveConfig = toml::from_str(&content)?;
        config.validate()?;
        info!(path = %path.display(), "Loaded configuration");
        Ok(config)
    }

    /// Load an explicitly requested file, or the default file if it exists, or defaults.
    ///
    /// An explicit path that does not exist is an error; a missing default file is not.
    pub async fn load_or_default(path: Option<&Path>) -> ConfigResult<GroveConfig> {
        if let Some(path) = path {
            return Self::load_from_file(path).await;
        }

        match Self::default_path() {
            Some(default) if tokio::fs::try_exists(&default).await.unwrap_or(false) => {
                Self::load_from_file(&default).await
            }
            _ => {
                debug!("No config file found, using defaults");
                Ok(GroveConfig::default())
            }
        }
    }
}
