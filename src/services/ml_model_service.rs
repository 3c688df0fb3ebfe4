use chrono::{DateTime, Utc};
use linfa::prelude::*;
use linfa_elasticnet::ElasticNet;
use ndarray::{Array1, Array2, Axis};
use rand::{rngs::StdRng, seq::SliceRandom, SeedableRng};
use tracing::{info, instrument, warn};

use crate::config::ModelConfig;
use crate::error::{PipelineError, Result};
use crate::models::{FeatureFrame, ModelMetrics, PartitionMetrics};

/// Replaces missing feature values with per-column means learned from training rows.
///
/// Columns with no observed value at fit time have no mean and are left out
/// of every transformed matrix.
#[derive(Debug, Clone, PartialEq)]
pub struct MeanImputer {
    input_names: Vec<String>,
    statistics: Vec<f64>,
    kept: Vec<usize>,
}

impl MeanImputer {
    /// Learn column means from the given rows
    pub fn fit(frame: &FeatureFrame) -> Self {
        let statistics = frame.column_means().to_vec();
        let kept: Vec<usize> = statistics
            .iter()
            .enumerate()
            .filter(|(_, mean)| !mean.is_nan())
            .map(|(i, _)| i)
            .collect();

        for (name, mean) in frame.names.iter().zip(&statistics) {
            if mean.is_nan() {
                warn!("Feature '{}' has no observed values in the training rows, dropping it", name);
            }
        }

        Self {
            input_names: frame.names.clone(),
            statistics,
            kept,
        }
    }

    /// Learned mean of every input column, NaN for dropped columns
    pub fn statistics(&self) -> &[f64] {
        &self.statistics
    }

    /// Names of the columns present after transformation
    pub fn feature_names(&self) -> Vec<String> {
        self.kept.iter().map(|&i| self.input_names[i].clone()).collect()
    }

    pub fn transform(&self, values: &Array2<f64>) -> Array2<f64> {
        let mut output = values.select(Axis(1), &self.kept);
        for (mut column, &source) in output.axis_iter_mut(Axis(1)).zip(&self.kept) {
            let mean = self.statistics[source];
            column.mapv_inplace(|v| if v.is_nan() { mean } else { v });
        }
        output
    }

    pub fn transform_row(&self, row: &Array1<f64>) -> Array1<f64> {
        self.kept
            .iter()
            .map(|&i| if row[i].is_nan() { self.statistics[i] } else { row[i] })
            .collect()
    }
}

/// Row indices of a train/test partition
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrainTestSplit {
    pub train: Vec<usize>,
    pub test: Vec<usize>,
}

/// Deterministic shuffled partition: the first `ceil(test_ratio * n)` rows of
/// a seeded permutation form the test set, the rest the training set
pub fn train_test_split(n_rows: usize, test_ratio: f64, seed: u64) -> Result<TrainTestSplit> {
    let n_test = (test_ratio * n_rows as f64).ceil() as usize;
    if n_test == 0 || n_test >= n_rows {
        return Err(PipelineError::InsufficientData(format!(
            "{} rows cannot be split with test ratio {}",
            n_rows, test_ratio
        )));
    }

    let mut order: Vec<usize> = (0..n_rows).collect();
    order.shuffle(&mut StdRng::seed_from_u64(seed));
    let train = order.split_off(n_test);

    Ok(TrainTestSplit { train, test: order })
}

/// Indices of the finite entries of a target vector
fn labelled_rows(target: &Array1<f64>) -> Vec<usize> {
    target
        .iter()
        .enumerate()
        .filter(|(_, y)| !y.is_nan())
        .map(|(i, _)| i)
        .collect()
}

/// Everything a prediction needs: the fitted model, its imputer and the
/// unimputed training rows
#[derive(Debug)]
pub struct TrainedModel {
    pub model_version: String,
    pub model: ElasticNet<f64>,
    pub imputer: MeanImputer,
    pub train_features: FeatureFrame,
    /// Target of the training rows, missing values included
    pub train_target: Array1<f64>,
    pub metrics: ModelMetrics,
    pub trained_at: DateTime<Utc>,
}

impl TrainedModel {
    /// Predict from rows that are already imputed
    pub fn predict_imputed(&self, rows: &Array2<f64>) -> Array1<f64> {
        self.model.predict(rows)
    }

    /// Model coefficients paired with their feature names
    pub fn coefficients(&self) -> Vec<(String, f64)> {
        self.imputer
            .feature_names()
            .into_iter()
            .zip(self.model.hyperplane().iter().copied())
            .collect()
    }

    pub fn intercept(&self) -> f64 {
        self.model.intercept()
    }
}

/// Service for fitting and evaluating the sleep score regression
#[derive(Debug, Clone)]
pub struct MLModelService {
    config: ModelConfig,
}

impl MLModelService {
    pub fn new(config: ModelConfig) -> Self {
        Self { config }
    }

    /// Fit the elastic net on a seeded 70/30 split and evaluate both partitions.
    ///
    /// The imputer only sees training rows. Rows with a missing target are
    /// removed from both partitions after imputation.
    #[instrument(skip_all, fields(rows = features.nrows(), features = features.ncols()))]
    pub fn train(&self, features: &FeatureFrame, target: &Array1<f64>) -> Result<TrainedModel> {
        if features.nrows() != target.len() {
            return Err(PipelineError::ShapeMismatch {
                column: "target".to_string(),
                expected: features.nrows(),
                actual: target.len(),
            });
        }

        let split = train_test_split(features.nrows(), self.config.test_ratio, self.config.seed)?;

        let train_features = features.select_rows(&split.train);
        let test_features = features.select_rows(&split.test);
        let train_target = target.select(Axis(0), &split.train);
        let test_target = target.select(Axis(0), &split.test);

        let imputer = MeanImputer::fit(&train_features);
        let train_imputed = imputer.transform(&train_features.values);
        let test_imputed = imputer.transform(&test_features.values);

        let train_rows = labelled_rows(&train_target);
        let test_rows = labelled_rows(&test_target);
        if train_rows.len() < 2 {
            return Err(PipelineError::InsufficientData(format!(
                "need at least 2 labelled training rows, got {}",
                train_rows.len()
            )));
        }
        if test_rows.is_empty() {
            return Err(PipelineError::InsufficientData(
                "no labelled rows left in the test partition".to_string(),
            ));
        }
        if imputer.feature_names().is_empty() {
            return Err(PipelineError::InsufficientData(
                "no feature column has observed values".to_string(),
            ));
        }

        let x_train = train_imputed.select(Axis(0), &train_rows);
        let y_train = train_target.select(Axis(0), &train_rows);
        let x_test = test_imputed.select(Axis(0), &test_rows);
        let y_test = test_target.select(Axis(0), &test_rows);

        let dataset = Dataset::new(x_train.clone(), y_train.clone());
        let model = ElasticNet::<f64>::params()
            .penalty(self.config.penalty)
            .l1_ratio(self.config.l1_ratio)
            .fit(&dataset)?;

        let model_version = format!("elasticnet_v{}", Utc::now().timestamp());

        let train_metrics = self.evaluate(&model.predict(&x_train), &y_train)?;
        let test_metrics = self.evaluate(&model.predict(&x_test), &y_test)?;

        info!(
            "Elastic net trained on {} rows. Test RMSE: {:.3}, MAE: {:.3}, R²: {:.3}",
            y_train.len(),
            test_metrics.rmse,
            test_metrics.mae,
            test_metrics.r_squared
        );

        let metrics = ModelMetrics {
            train: train_metrics,
            test: test_metrics,
            model_version: model_version.clone(),
            evaluated_at: Utc::now(),
        };

        Ok(TrainedModel {
            model_version,
            model,
            imputer,
            train_features,
            train_target,
            metrics,
            trained_at: Utc::now(),
        })
    }

    fn evaluate(&self, predictions: &Array1<f64>, targets: &Array1<f64>) -> Result<PartitionMetrics> {
        if predictions.iter().any(|p| !p.is_finite()) {
            return Err(PipelineError::NonFinite("elastic net prediction".to_string()));
        }

        Ok(PartitionMetrics {
            rmse: self.calculate_rmse(predictions, targets),
            mae: self.calculate_mae(predictions, targets),
            mape: self.calculate_mape(predictions, targets),
            r_squared: self.calculate_r_squared(predictions, targets),
            sample_count: targets.len(),
        })
    }

    /// Calculate Mean Absolute Error
    pub fn calculate_mae(&self, predictions: &Array1<f64>, targets: &Array1<f64>) -> f64 {
        (predictions - targets).mapv(f64::abs).mean().unwrap_or(f64::NAN)
    }

    /// Calculate Root Mean Square Error
    pub fn calculate_rmse(&self, predictions: &Array1<f64>, targets: &Array1<f64>) -> f64 {
        (predictions - targets)
            .mapv(|x| x.powi(2))
            .mean()
            .unwrap_or(f64::NAN)
            .sqrt()
    }

    /// Calculate Mean Absolute Percentage Error as a fraction.
    ///
    /// The denominator is floored at machine epsilon, so near-zero targets
    /// produce very large values rather than infinities.
    pub fn calculate_mape(&self, predictions: &Array1<f64>, targets: &Array1<f64>) -> f64 {
        predictions
            .iter()
            .zip(targets.iter())
            .map(|(p, t)| (t - p).abs() / t.abs().max(f64::EPSILON))
            .sum::<f64>()
            / targets.len() as f64
    }

    /// Calculate R-squared
    pub fn calculate_r_squared(&self, predictions: &Array1<f64>, targets: &Array1<f64>) -> f64 {
        let target_mean = targets.mean().unwrap_or(f64::NAN);
        let ss_tot = targets.mapv(|t| (t - target_mean).powi(2)).sum();
        let ss_res = (targets - predictions).mapv(|x| x.powi(2)).sum();
        1.0 - (ss_res / ss_tot)
    }
}
