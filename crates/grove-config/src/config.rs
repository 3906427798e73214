//! Top-level configuration

use crate::components::{ImportConfig, LoggingConfig, StorageConfig};
use crate::loader::{ConfigError, ConfigResult};
use serde::{Deserialize, Serialize};

/// Complete grove configuration.
///
/// Every section is optional in the TOML file; missing sections and fields
/// fall back to their defaults.
///
/// ```toml
/// [storage]
/// database_path = "~/notes/grove.db"
///
/// [import]
/// chunk_size = 50
/// failure_scope = "run"
///
/// [logging]
/// level = "debug"
/// ```
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GroveConfig {
    pub storage: StorageConfig,
    pub import: ImportConfig,
    pub logging: LoggingConfig,
}

impl GroveConfig {
    /// Check invariants that serde cannot express
    pub fn validate(&self) -> ConfigResult<()> {
        if self.import.chunk_size == 0 {
            return Err(ConfigError::Validation(
                "import.chunk_size must be greater than zero".to_string(),
            ));
        }
        if self.storage.database_path.as_os_str().is_empty() {
            return Err(ConfigError::Validation(
                "storage.database_path must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// Render as TOML
    pub fn to_toml(&self) -> ConfigResult<String> {
        Ok(toml::to_string_pretty(self)?)
    }
}
