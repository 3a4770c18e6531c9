//! Configuration management.

mod settings;

pub use settings::{AppConfig, AppSettings, CacheSettings, LoggingConfig, SimulationSettings};

use config::{Config, Environment, File};
use std::path::Path;
use thiserror::Error;

/// Configuration loading errors.
#[derive(Error, Debug)]
pub enum ConfigLoadError {
    #[error("Failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    #[error("Failed to render configuration: {0}")]
    Render(#[from] toml::ser::Error),
}

/// Load configuration from file and environment.
///
/// Variables such as `CHART__CACHE__RETAIN_ABSENT_RESPONSES=true` override
/// the file.
pub fn load_config(path: &Path) -> Result<AppConfig, ConfigLoadError> {
    let config = Config::builder()
        .add_source(File::from(path).required(true))
        .add_source(
            Environment::with_prefix("CHART")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    Ok(config.try_deserialize()?)
}

/// Render a configuration back to TOML.
pub fn to_toml(config: &AppConfig) -> Result<String, ConfigLoadError> {
    Ok(toml::to_string_pretty(config)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn default_config_path() -> PathBuf {
        PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../config/default.toml")
    }

    #[test]
    fn test_load_shipped_config() {
        let config = load_config(&default_config_path()).unwrap();

        assert_eq!(config.app.name, "chartcache");
        assert!(!config.cache.retain_absent_responses);
        assert_eq!(config.simulation.latency_ms, 50);
    }

    #[test]
    fn test_missing_file_is_an_error() {
        assert!(load_config(Path::new("does/not/exist.toml")).is_err());
    }

    #[test]
    fn test_render_to_toml() {
        let rendered = to_toml(&AppConfig::default()).unwrap();
        assert!(rendered.contains("retain_absent_responses = false"));
    }
}
