use serde::{Deserialize, Serialize};

/// Distribution summary of the sleep score
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TargetStatistics {
    pub count: usize,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub median: f64,
    /// First quartile (25%)
    pub q1: f64,
    /// Third quartile (75%)
    pub q3: f64,
}

/// Pearson correlation of one column with the sleep score
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureCorrelation {
    pub feature: String,
    pub correlation: f64,
    /// Rows where both values were present
    pub paired_samples: usize,
}

/// Square correlation matrix over a set of columns
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrelationMatrix {
    pub names: Vec<String>,
    /// Row-major, rounded to two decimals
    pub values: Vec<Vec<f64>>,
}

/// Relative contribution of one feature in the importance ensemble
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureImportance {
    pub feature: String,
    /// Share of total impurity decrease; all importances sum to 1
    pub importance: f64,
}
