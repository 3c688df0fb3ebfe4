pub mod app;
pub mod pipeline;

pub use app::ServerConfig;
pub use pipeline::{DataConfig, ImportanceConfig, ModelConfig, PredictionMode};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// Application configuration, read from an optional TOML file and then
/// overridden by environment variables
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub data: DataConfig,

    #[serde(default)]
    pub model: ModelConfig,

    #[serde(default)]
    pub importance: ImportanceConfig,

    #[serde(default)]
    pub server: ServerConfig,
}

impl Config {
    /// Load configuration from a TOML file, falling back to defaults when it does not exist
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(path) => path.to_path_buf(),
            None => PathBuf::from("sleep-quality.toml"),
        };

        if !path.exists() {
            tracing::info!("Config file {:?} not found, using defaults", path);
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file {:?}", path))?;
        let config: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file {:?}", path))?;

        Ok(config)
    }

    /// Load and apply environment overrides in one step
    pub fn from_env(path: Option<&Path>) -> Result<Self> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides()?;
        Ok(config)
    }

    pub fn apply_env_overrides(&mut self) -> Result<()> {
        if let Ok(path) = env::var("SLEEP_HEALTH_DATASET") {
            self.data.health_path = PathBuf::from(path);
        }
        if let Ok(path) = env::var("SLEEP_WEATHER_DATASET") {
            self.data.weather_path = PathBuf::from(path);
        }
        if let Ok(mode) = env::var("SLEEP_PREDICTION_MODE") {
            self.model.prediction_mode = mode.parse()?;
        }
        self.server.apply_env()
    }
}
