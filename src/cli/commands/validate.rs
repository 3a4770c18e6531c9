//! Validate configuration command.

use anyhow::{Context, Result};
use chart_config::{load_config, to_toml};
use std::path::Path;
use tracing::info;

/// Load, check and print the effective configuration.
pub async fn run(config_path: &Path) -> Result<()> {
    info!("Validating configuration: {:?}", config_path);

    let config = load_config(config_path)
        .with_context(|| format!("Failed to load config from {:?}", config_path))?;

    println!("Configuration is valid!");
    println!();
    println!("App: {} ({})", config.app.name, config.app.environment);
    println!("Logging: {} / {}", config.logging.level, config.logging.format);
    println!(
        "Absent responses: {}",
        if config.cache.retain_absent_responses {
            "retained"
        } else {
            "dropped"
        }
    );
    println!(
        "Simulation: latency {}ms, absent every {}",
        config.simulation.latency_ms, config.simulation.absent_every
    );
    println!();
    println!("Effective configuration:");
    println!("{}", to_toml(&config)?);

    Ok(())
}
