use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use tracing_subscriber::filter::LevelFilter;

/// Log level options for CLI
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    /// No logging output
    Off,
    /// Error messages only
    Error,
    /// Warnings and errors
    Warn,
    /// Informational messages
    Info,
    /// Debug messages
    Debug,
    /// Trace-level messages (most verbose)
    Trace,
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Off => LevelFilter::OFF,
            LogLevel::Error => LevelFilter::ERROR,
            LogLevel::Warn => LevelFilter::WARN,
            LogLevel::Info => LevelFilter::INFO,
            LogLevel::Debug => LevelFilter::DEBUG,
            LogLevel::Trace => LevelFilter::TRACE,
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "grove")]
#[command(about = "grove - thought tree store with resumable outline import")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Set log level (off, error, warn, info, debug, trace)
    /// If not specified, uses config file value
    #[arg(short = 'l', long, global = true, value_enum)]
    pub log_level: Option<LogLevel>,

    /// Enable verbose logging (shortcut for --log-level=debug)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Config file path (defaults to ~/.config/grove/config.toml)
    #[arg(short = 'C', long, global = true)]
    pub config: Option<PathBuf>,

    /// Database path (overrides config file)
    #[arg(long, global = true, env = "GROVE_DB_PATH")]
    pub db_path: Option<PathBuf>,

    /// Lines per import chunk (overrides config file)
    #[arg(long, global = true)]
    pub chunk_size: Option<usize>,
}

impl Cli {
    /// Level requested on the command line, if any
    pub fn requested_level(&self) -> Option<LevelFilter> {
        if self.verbose {
            Some(LevelFilter::DEBUG)
        } else {
            self.log_level.map(LevelFilter::from)
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Import outline or snapshot files into the tree
    Import {
        /// Files to import, in order
        #[arg(required = true, value_name = "FILE")]
        files: Vec<PathBuf>,

        /// Destination as a `/`-separated list of thought ids (default: home)
        #[arg(short, long)]
        path: Option<String>,

        /// Insert a new empty thought before the destination and import into it
        #[arg(long)]
        insert_before: bool,
    },

    /// Resume every unfinished import
    Resume,

    /// List unfinished imports
    Pending {
        /// Output format (table, json)
        #[arg(short = 'f', long, default_value = "table")]
        format: String,
    },

    /// Discard an unfinished import
    Abandon {
        /// Import id, as listed by `grove pending`
        id: String,
    },

    /// Print the stored tree as outline text
    Export {
        /// Thought id to export beneath (default: home)
        #[arg(long)]
        root: Option<String>,
    },

    /// Configuration management
    #[command(subcommand)]
    Config(ConfigCommands),
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show the current effective configuration
    Show {
        /// Output format (toml, json)
        #[arg(short = 'f', long, default_value = "toml")]
        format: String,
    },
}
