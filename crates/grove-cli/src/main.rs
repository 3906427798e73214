use anyhow::Result;
use clap::Parser;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use grove_cli::{
    cli::{Cli, Commands},
    commands,
    config::CliConfig,
    interrupt::{self, Interrupt},
    logging,
    notifier::TerminalNotifier,
};
use grove_core::Notifier;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let requested_level = cli.requested_level();

    let config = CliConfig::load(cli.config, cli.db_path, cli.chunk_size).await?;
    logging::init(requested_level, &config.config.logging);
    debug!(database = %config.database_path().display(), "configuration loaded");

    // Ctrl-C stops the run between files; a second Ctrl-C exits immediately
    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if interrupt::watch(tokio::signal::ctrl_c, on_interrupt).await == Interrupt::Forced {
            std::process::exit(interrupt::FORCED_EXIT_CODE);
        }
    });

    let notifier: Arc<dyn Notifier> = Arc::new(TerminalNotifier);

    match cli.command {
        Commands::Import {
            files,
            path,
            insert_before,
        } => commands::import::execute(config, files, path, insert_before, notifier, cancel).await,
        Commands::Resume => commands::import::resume(config, notifier, cancel).await,
        Commands::Pending { format } => commands::pending::execute(config, format).await,
        Commands::Abandon { id } => commands::abandon::execute(config, id).await,
        Commands::Export { root } => commands::export::execute(config, root).await,
        Commands::Config(cmd) => commands::config::execute(config, cmd).await,
    }
}
