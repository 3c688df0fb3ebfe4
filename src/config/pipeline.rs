use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::str::FromStr;

/// Locations of the two source datasets
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataConfig {
    /// Health export with sleep stages and HRV (`Date` column)
    #[serde(default = "default_health_path")]
    pub health_path: PathBuf,

    /// Daily weather readings (`fecha` column)
    #[serde(default = "default_weather_path")]
    pub weather_path: PathBuf,
}

fn default_health_path() -> PathBuf {
    PathBuf::from("HealthDataSet.csv")
}

fn default_weather_path() -> PathBuf {
    PathBuf::from("datos_diarios_limpios.csv")
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            health_path: default_health_path(),
            weather_path: default_weather_path(),
        }
    }
}

/// How the predictor obtains its fitted model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PredictionMode {
    /// Reuse the fitted model while the datasets' fingerprint is unchanged
    Cached,
    /// Reload and retrain on every request
    Recompute,
}

impl FromStr for PredictionMode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "cached" => Ok(PredictionMode::Cached),
            "recompute" => Ok(PredictionMode::Recompute),
            other => bail!("Unknown prediction mode '{}' (expected cached or recompute)", other),
        }
    }
}

/// Training parameters of the elastic net model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Fraction of rows held out for evaluation
    #[serde(default = "default_test_ratio")]
    pub test_ratio: f64,

    /// Seed of the train/test shuffle
    #[serde(default = "default_seed")]
    pub seed: u64,

    /// Overall regularization strength
    #[serde(default = "default_penalty")]
    pub penalty: f64,

    /// Share of the penalty given to L1 (1.0 = lasso, 0.0 = ridge)
    #[serde(default = "default_l1_ratio")]
    pub l1_ratio: f64,

    #[serde(default = "default_mode")]
    pub prediction_mode: PredictionMode,
}

fn default_test_ratio() -> f64 {
    0.3
}

fn default_seed() -> u64 {
    123
}

fn default_penalty() -> f64 {
    1.0
}

fn default_l1_ratio() -> f64 {
    0.5
}

fn default_mode() -> PredictionMode {
    PredictionMode::Cached
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            test_ratio: default_test_ratio(),
            seed: default_seed(),
            penalty: default_penalty(),
            l1_ratio: default_l1_ratio(),
            prediction_mode: default_mode(),
        }
    }
}

/// Parameters of the tree ensemble used for feature importance
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportanceConfig {
    #[serde(default = "default_trees")]
    pub n_trees: usize,

    #[serde(default = "default_max_depth")]
    pub max_depth: usize,

    #[serde(default = "default_seed")]
    pub seed: u64,

    /// Width of the score bands the trees classify into
    #[serde(default = "default_band_width")]
    pub band_width: f64,

    #[serde(default = "default_top_n")]
    pub top_n: usize,
}

fn default_trees() -> usize {
    100
}

fn default_max_depth() -> usize {
    10
}

fn default_band_width() -> f64 {
    10.0
}

fn default_top_n() -> usize {
    15
}

impl Default for ImportanceConfig {
    fn default() -> Self {
        Self {
            n_trees: default_trees(),
            max_depth: default_max_depth(),
            seed: default_seed(),
            band_width: default_band_width(),
            top_n: default_top_n(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prediction_mode_parsing() {
        assert_eq!("cached".parse::<PredictionMode>().unwrap(), PredictionMode::Cached);
        assert_eq!("Recompute".parse::<PredictionMode>().unwrap(), PredictionMode::Recompute);
        assert!("sometimes".parse::<PredictionMode>().is_err());
    }

    #[test]
    fn test_model_defaults() {
        let config = ModelConfig::default();
        assert_eq!(config.test_ratio, 0.3);
        assert_eq!(config.seed, 123);
        assert_eq!(config.penalty, 1.0);
        assert_eq!(config.l1_ratio, 0.5);
        assert_eq!(config.prediction_mode, PredictionMode::Cached);
    }
}
