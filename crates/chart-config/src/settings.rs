//! Configuration structures.

use chart_backend::SimulationConfig;
use chart_controller::ControllerConfig;
use serde::{Deserialize, Serialize};

/// Main application configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub app: AppSettings,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub cache: CacheSettings,
    #[serde(default)]
    pub simulation: SimulationSettings,
}

/// General app settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppSettings {
    pub name: String,
    pub environment: String,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            name: "chartcache".to_string(),
            environment: "development".to_string(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
    pub file: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
            file: None,
        }
    }
}

/// Cache policy settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CacheSettings {
    /// Keep all-absent backend responses instead of dropping them
    #[serde(default)]
    pub retain_absent_responses: bool,
}

impl CacheSettings {
    /// Controller configuration for these settings.
    pub fn controller_config(&self) -> ControllerConfig {
        ControllerConfig {
            retain_absent_responses: self.retain_absent_responses,
        }
    }
}

/// Simulated backend settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationSettings {
    pub latency_ms: u64,
    pub absent_every: usize,
    pub base_value: f64,
    pub amplitude: f64,
    pub period_secs: i64,
}

impl Default for SimulationSettings {
    fn default() -> Self {
        let defaults = SimulationConfig::default();
        Self {
            latency_ms: defaults.latency_ms,
            absent_every: defaults.absent_every,
            base_value: defaults.base_value,
            amplitude: defaults.amplitude,
            period_secs: defaults.period_secs,
        }
    }
}

impl SimulationSettings {
    /// Simulated backend configuration for these settings.
    pub fn simulation_config(&self) -> SimulationConfig {
        SimulationConfig {
            latency_ms: self.latency_ms,
            absent_every: self.absent_every,
            base_value: self.base_value,
            amplitude: self.amplitude,
            period_secs: self.period_secs,
        }
    }
}
