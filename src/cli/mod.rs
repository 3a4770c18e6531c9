//! CLI definitions.

pub mod commands;

use chart_config::LoggingConfig;
use chrono::DateTime;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "chartcache")]
#[command(author, version, about = "Multi-resolution time-series chart cache")]
pub struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = "config/default.toml")]
    pub config: PathBuf,

    /// Log level (defaults to `logging.level` from the config)
    #[arg(short, long)]
    pub log_level: Option<LogLevel>,

    /// Enable JSON log format (also enabled by `logging.format = "json"`)
    #[arg(long)]
    pub json_logs: bool,

    /// Also write logs to this file (defaults to `logging.file`)
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Clone, ValueEnum)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

/// Effective logging options.
#[derive(Debug, PartialEq)]
pub struct LogSettings {
    pub level: String,
    pub json: bool,
    pub file: Option<PathBuf>,
}

impl Cli {
    /// Merge the logging flags over the `[logging]` config section.
    pub fn log_settings(&self, config: &LoggingConfig) -> LogSettings {
        LogSettings {
            level: self
                .log_level
                .as_ref()
                .map(|level| level.as_str().to_string())
                .unwrap_or_else(|| config.level.clone()),
            json: self.json_logs || config.format.eq_ignore_ascii_case("json"),
            file: self
                .log_file
                .clone()
                .or_else(|| config.file.as_ref().map(PathBuf::from)),
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Drive a chart against the simulated backend
    Simulate(SimulateArgs),
    /// Show the resolution chosen for a window
    Resolution(ResolutionArgs),
    /// Validate configuration
    ValidateConfig,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(clap::Args)]
pub struct SimulateArgs {
    /// Window start (epoch seconds or RFC 3339)
    #[arg(long, value_parser = parse_time)]
    pub start: i64,

    /// Window end (epoch seconds or RFC 3339)
    #[arg(long, value_parser = parse_time)]
    pub end: i64,

    /// Seconds to pan the window per step (negative pans back)
    #[arg(long, default_value = "0", allow_hyphen_values = true)]
    pub pan: i64,

    /// Number of pan steps after the initial window
    #[arg(long, default_value = "0")]
    pub steps: usize,

    /// Output format
    #[arg(long, value_enum, default_value = "text")]
    pub output: OutputFormat,

    /// Save rendered frames to a CSV file
    #[arg(long)]
    pub save: Option<PathBuf>,
}

#[derive(clap::Args)]
pub struct ResolutionArgs {
    /// Window start (epoch seconds or RFC 3339)
    #[arg(long, value_parser = parse_time)]
    pub start: i64,

    /// Window end (epoch seconds or RFC 3339)
    #[arg(long, value_parser = parse_time)]
    pub end: i64,
}

/// Parse epoch seconds or an RFC 3339 timestamp.
fn parse_time(value: &str) -> Result<i64, String> {
    if let Ok(secs) = value.parse::<i64>() {
        return Ok(secs);
    }
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.timestamp())
        .map_err(|e| format!("invalid time '{}': {}", value, e))
}
