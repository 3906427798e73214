//! `grove config`

use anyhow::Result;

use crate::cli::ConfigCommands;
use crate::config::CliConfig;

pub async fn execute(config: CliConfig, cmd: ConfigCommands) -> Result<()> {
    match cmd {
        ConfigCommands::Show { format } => show(&config, &format),
    }
}

/// Show the current effective configuration
fn show(config: &CliConfig, format: &str) -> Result<()> {
    match format {
        "json" => println!("{}", serde_json::to_string_pretty(&config.config)?),
        _ => print!("{}", config.config.to_toml()?),
    }
    Ok(())
}
