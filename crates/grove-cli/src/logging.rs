//! Subscriber setup

use grove_config::{LogFormat, LoggingConfig};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;

/// Filter from, in order: `RUST_LOG`, the command-line level, the config file
pub fn env_filter(requested: Option<LevelFilter>, config: &LoggingConfig) -> EnvFilter {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return filter;
    }
    match requested {
        Some(level) => EnvFilter::new(level.to_string()),
        None => EnvFilter::try_new(&config.level).unwrap_or_else(|_| EnvFilter::new("info")),
    }
}

/// Install the global subscriber, writing to stderr so stdout stays clean
pub fn init(requested: Option<LevelFilter>, config: &LoggingConfig) {
    let filter = env_filter(requested, config);
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    match config.format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Pretty => builder.pretty().init(),
        LogFormat::Text => builder.with_target(false).init(),
    }
}
