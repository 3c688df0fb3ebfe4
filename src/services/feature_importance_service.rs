use linfa::prelude::*;
use linfa_trees::DecisionTree;
use ndarray::{Array1, Array2, Axis};
use rand::{rngs::StdRng, Rng, SeedableRng};
use tracing::{debug, info, instrument, warn};

use crate::config::ImportanceConfig;
use crate::error::{PipelineError, Result};
use crate::models::FeatureImportance;
use crate::services::ml_model_service::TrainedModel;

const MAX_SCORE: f64 = 100.0;

/// Ranks features by their mean impurity decrease across a bagged ensemble
/// of decision trees
#[derive(Debug, Clone)]
pub struct FeatureImportanceService {
    config: ImportanceConfig,
}

impl FeatureImportanceService {
    pub fn new(config: ImportanceConfig) -> Self {
        Self { config }
    }

    /// Class of a score: consecutive bands of `band_width` points, the last
    /// band closed at 100
    pub fn score_band(&self, score: f64) -> usize {
        let bands = (MAX_SCORE / self.config.band_width).ceil().max(1.0) as usize;
        let band = (score.max(0.0) / self.config.band_width).floor() as usize;
        band.min(bands - 1)
    }

    /// Fit the ensemble on the model's imputed training rows and return every
    /// feature ranked by importance, highest first
    #[instrument(skip_all, fields(trees = self.config.n_trees))]
    pub fn rank_all(&self, trained: &TrainedModel) -> Result<Vec<FeatureImportance>> {
        let imputed = trained.imputer.transform(&trained.train_features.values);
        let labelled: Vec<usize> = trained
            .train_target
            .iter()
            .enumerate()
            .filter(|(_, y)| !y.is_nan())
            .map(|(i, _)| i)
            .collect();

        let records = imputed.select(Axis(0), &labelled);
        let labels: Array1<usize> = trained
            .train_target
            .select(Axis(0), &labelled)
            .mapv(|score| self.score_band(score));

        let importances = self.ensemble_importances(&records, &labels)?;

        let mut ranked: Vec<FeatureImportance> = trained
            .imputer
            .feature_names()
            .into_iter()
            .zip(importances)
            .map(|(feature, importance)| FeatureImportance { feature, importance })
            .collect();
        ranked.sort_by(|a, b| b.importance.total_cmp(&a.importance));

        Ok(ranked)
    }

    /// Like [`FeatureImportanceService::rank_all`], keeping the configured top N
    pub fn rank(&self, trained: &TrainedModel) -> Result<Vec<FeatureImportance>> {
        let mut ranked = self.rank_all(trained)?;
        ranked.truncate(self.config.top_n);
        Ok(ranked)
    }

    fn ensemble_importances(&self, records: &Array2<f64>, labels: &Array1<usize>) -> Result<Vec<f64>> {
        let n_rows = records.nrows();
        let n_features = records.ncols();
        if n_rows < 2 || n_features == 0 {
            return Err(PipelineError::InsufficientData(format!(
                "feature importance needs at least 2 labelled rows and one feature, got {} x {}",
                n_rows, n_features
            )));
        }

        let mut rng = StdRng::seed_from_u64(self.config.seed);
        let mut totals = vec![0.0; n_features];
        let mut fitted = 0usize;

        for tree_index in 0..self.config.n_trees {
            let sample: Vec<usize> = (0..n_rows).map(|_| rng.gen_range(0..n_rows)).collect();
            let dataset = Dataset::new(
                records.select(Axis(0), &sample),
                labels.select(Axis(0), &sample),
            );

            let tree = DecisionTree::<f64, usize>::params()
                .max_depth(Some(self.config.max_depth))
                .fit(&dataset)?;

            let importance = tree.feature_importance();
            let sum: f64 = importance.iter().sum();
            if !sum.is_finite() || sum <= 0.0 {
                debug!("Tree {} made no split, skipping", tree_index);
                continue;
            }

            for (total, value) in totals.iter_mut().zip(&importance) {
                *total += value / sum;
            }
            fitted += 1;
        }

        if fitted == 0 {
            warn!("No tree in the ensemble split on any feature");
            return Ok(vec![0.0; n_features]);
        }

        let grand_total: f64 = totals.iter().sum();
        info!("Feature importance computed from {} of {} trees", fitted, self.config.n_trees);
        Ok(totals.into_iter().map(|t| t / grand_total).collect())
    }
}
