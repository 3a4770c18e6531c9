//! Chart cache CLI application.

mod cli;

use anyhow::Result;
use chart_config::{load_config, LoggingConfig};
use chart_monitor::setup_logging;
use clap::Parser;
use cli::{Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging; config errors are reported by the command itself
    let logging = load_config(&cli.config)
        .map(|config| config.logging)
        .unwrap_or_else(|_| LoggingConfig::default());
    let log = cli.log_settings(&logging);
    let _log_guard = setup_logging(&log.level, log.json, log.file.as_deref());

    // Execute command
    match cli.command {
        Commands::Simulate(args) => cli::commands::simulate::run(args, &cli.config).await,
        Commands::Resolution(args) => cli::commands::resolution::run(args).await,
        Commands::ValidateConfig => cli::commands::validate::run(&cli.config).await,
    }
}
