//! Simulate command.

use crate::cli::{OutputFormat, SimulateArgs};
use anyhow::{Context, Result};
use chart_backend::{RecordingSurface, SimulatedBackend};
use chart_config::{load_config, AppConfig};
use chart_controller::ChartController;
use chart_core::types::{format_timestamp, DataResponse, Resolution};
use std::fs::File;
use std::path::Path;
use std::time::Duration;
use tokio::sync::mpsc::UnboundedReceiver;
use tracing::{info, warn};

type Controller = ChartController<SimulatedBackend, RecordingSurface>;

/// Give up on a response after this long.
const RESPONSE_TIMEOUT: Duration = Duration::from_secs(10);

/// Run the chart against the simulated backend.
pub async fn run(args: SimulateArgs, config_path: &Path) -> Result<()> {
    let config = if config_path.exists() {
        load_config(config_path)
            .with_context(|| format!("Failed to load config from {:?}", config_path))?
    } else {
        warn!("Config file {:?} not found, using defaults", config_path);
        AppConfig::default()
    };

    info!(
        "Simulating window [{}, {})",
        format_timestamp(args.start),
        format_timestamp(args.end)
    );

    let (backend, mut responses) = SimulatedBackend::spawn(config.simulation.simulation_config());
    let mut controller = ChartController::with_config(
        backend,
        RecordingSurface::new(),
        args.start,
        args.end,
        config.cache.controller_config(),
    )
    .context("Failed to open chart window")?;

    drain(&mut controller, &mut responses).await?;

    for step in 1..=args.steps {
        let window = controller.window();
        controller.set_window(window.start + args.pan, window.end + args.pan)?;
        info!("Step {}: {}", step, controller.window());
        drain(&mut controller, &mut responses).await?;
    }

    match args.output {
        OutputFormat::Text => print_text(&controller),
        OutputFormat::Json => println!("{}", controller.surface().to_json()?),
    }

    if let Some(path) = args.save {
        let file = File::create(&path)
            .with_context(|| format!("Failed to create {:?}", path))?;
        controller.surface().write_csv(file)?;
        info!("Frames saved to {:?}", path);
    }

    Ok(())
}

/// Feed responses to the controller until no fetch is outstanding.
async fn drain(
    controller: &mut Controller,
    responses: &mut UnboundedReceiver<DataResponse>,
) -> Result<()> {
    while Resolution::all()
        .iter()
        .any(|&resolution| controller.cache().is_pending(resolution))
    {
        let response = tokio::time::timeout(RESPONSE_TIMEOUT, responses.recv())
            .await
            .context("Timed out waiting for the backend")?
            .context("Backend stopped responding")?;
        controller.on_data_received(response)?;
    }
    Ok(())
}

fn print_text(controller: &Controller) {
    let frames = controller.surface().frames();

    println!("Simulation results");
    println!("Window:          {}", controller.window());
    println!("Requests issued: {}", controller.backend().issued());
    println!("Frames rendered: {}", frames.len());
    println!();

    for frame in frames {
        let present: Vec<f64> = frame.samples.iter().flatten().copied().collect();
        let range = match (
            present.iter().copied().reduce(f64::min),
            present.iter().copied().reduce(f64::max),
        ) {
            (Some(min), Some(max)) => format!("{:.2} .. {:.2}", min, max),
            _ => "-".to_string(),
        };
        println!(
            "  frame {:>3}: {:>4} samples, {:>4} gaps, range {}",
            frame.index,
            frame.samples.len(),
            frame.gaps(),
            range
        );
    }
}
