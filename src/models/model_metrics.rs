use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Error metrics of a fitted model on one partition
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PartitionMetrics {
    /// Root mean square error, in score points
    pub rmse: f64,

    /// Mean absolute error, in score points
    pub mae: f64,

    /// Mean absolute percentage error as a fraction (0.05 = 5%)
    pub mape: f64,

    /// Coefficient of determination
    pub r_squared: f64,

    /// Rows evaluated
    pub sample_count: usize,
}

/// Train and test evaluation of the sleep score model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelMetrics {
    pub train: PartitionMetrics,
    pub test: PartitionMetrics,

    /// Model version
    pub model_version: String,

    /// Evaluation timestamp
    pub evaluated_at: DateTime<Utc>,
}

/// Metrics rounded for display: errors to three decimals, MAPE as a percentage string
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsReport {
    #[serde(rename = "RMSE train")]
    pub rmse_train: f64,
    #[serde(rename = "MAE train")]
    pub mae_train: f64,
    #[serde(rename = "MAPE train")]
    pub mape_train: String,
    #[serde(rename = "RMSE test")]
    pub rmse_test: f64,
    #[serde(rename = "MAE test")]
    pub mae_test: f64,
    #[serde(rename = "MAPE test")]
    pub mape_test: String,
}

impl ModelMetrics {
    pub fn report(&self) -> MetricsReport {
        MetricsReport {
            rmse_train: round3(self.train.rmse),
            mae_train: round3(self.train.mae),
            mape_train: percent(self.train.mape),
            rmse_test: round3(self.test.rmse),
            mae_test: round3(self.test.mae),
            mape_test: percent(self.test.mape),
        }
    }
}

fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}

fn percent(fraction: f64) -> String {
    format!("{:.2}%", 100.0 * fraction)
}
