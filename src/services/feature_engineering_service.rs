use ndarray::{Array1, Array2};
use tracing::debug;

use crate::error::Result;
use crate::models::schema;
use crate::models::{DailyRecords, FeatureFrame};

/// Service for separating model inputs from the sleep score
#[derive(Debug, Clone, Default)]
pub struct FeatureEngineeringService;

impl FeatureEngineeringService {
    pub fn new() -> Self {
        Self
    }

    /// Columns that never become features: the sleep stages, the date and the score
    pub fn is_excluded(name: &str) -> bool {
        name == schema::DATE || name == schema::TARGET || schema::SLEEP_STAGE_COLUMNS.contains(&name)
    }

    /// Split daily records into a feature matrix and the target vector.
    ///
    /// Features are every remaining column, in record order. The target keeps
    /// its missing values.
    pub fn split(&self, records: &DailyRecords) -> Result<(FeatureFrame, Array1<f64>)> {
        let target = Array1::from(records.require(schema::TARGET)?.to_vec());

        let features: Vec<_> = records
            .columns()
            .iter()
            .filter(|c| !Self::is_excluded(&c.name))
            .collect();

        let names: Vec<String> = features.iter().map(|c| c.name.clone()).collect();
        let values = Array2::from_shape_fn((records.len(), features.len()), |(row, col)| {
            features[col].values[row]
        });

        debug!("Split {} rows into {} features", records.len(), names.len());
        Ok((FeatureFrame { names, values }, target))
    }
}
