use chrono::NaiveDate;
use std::sync::Arc;
use tracing::{error, info, instrument};

use crate::config::{Config, PredictionMode};
use crate::error::{Diagnostic, Result};
use crate::models::{
    CorrelationMatrix, DailyRecords, FeatureCorrelation, FeatureImportance, ModelMetrics,
    PredictionInput, SleepDay, SleepPrediction, TargetStatistics,
};
use crate::services::data_loader_service::SourceBytes;
use crate::services::ml_model_service::TrainedModel;
use crate::services::{
    DataInsightsService, DataLoaderService, FeatureEngineeringService, FeatureImportanceService,
    MLModelService, ModelCacheService, ModelPredictionService,
};

/// Number of correlations returned when the caller does not ask for a limit
pub const DEFAULT_TOP_CORRELATIONS: usize = 20;

/// Entry point for consumers: loading, training, prediction and exploration
/// over the two configured datasets
pub struct SleepQualityService {
    config: Config,
    loader: DataLoaderService,
    splitter: FeatureEngineeringService,
    trainer: MLModelService,
    predictor: ModelPredictionService,
    importance: FeatureImportanceService,
    insights: DataInsightsService,
    cache: ModelCacheService,
}

impl SleepQualityService {
    pub fn new(config: &Config) -> Self {
        Self {
            config: config.clone(),
            loader: DataLoaderService::new(config.data.clone()),
            splitter: FeatureEngineeringService::new(),
            trainer: MLModelService::new(config.model.clone()),
            predictor: ModelPredictionService::new(),
            importance: FeatureImportanceService::new(config.importance.clone()),
            insights: DataInsightsService::new(),
            cache: ModelCacheService::new(),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Training-ready records: complete sleep stages and score, helper columns removed
    pub fn load_filtered_records(&self) -> Result<DailyRecords> {
        self.loader.load(false)
    }

    /// Every joined record with its sub-scores, incomplete rows included
    pub fn load_all_records(&self) -> Result<DailyRecords> {
        self.loader.load(true)
    }

    fn train_from(&self, sources: &SourceBytes) -> Result<TrainedModel> {
        let records = self.loader.load_from(sources, false)?;
        let (features, target) = self.splitter.split(&records)?;
        self.trainer.train(&features, &target)
    }

    /// A trained model for the current datasets.
    ///
    /// In cached mode the model is reused until either dataset's content
    /// changes; in recompute mode every call retrains.
    #[instrument(skip(self))]
    pub fn trained_model(&self) -> Result<Arc<TrainedModel>> {
        let sources = self.loader.read_sources()?;

        match self.config.model.prediction_mode {
            PredictionMode::Cached => {
                let fingerprint = sources.fingerprint();
                self.cache.get_or_train(&fingerprint, || self.train_from(&sources))
            }
            PredictionMode::Recompute => Ok(Arc::new(self.train_from(&sources)?)),
        }
    }

    /// Retrain now and replace the cached model, whatever the mode.
    ///
    /// A failed refresh empties the cache so the stale model is not served.
    #[instrument(skip(self))]
    pub fn force_refresh(&self) -> Result<Arc<TrainedModel>> {
        let trained = self.loader.read_sources().and_then(|sources| {
            let fingerprint = sources.fingerprint();
            self.train_from(&sources).map(|model| (fingerprint, model))
        });

        match trained {
            Ok((fingerprint, model)) => {
                info!("Model {} refreshed for fingerprint {}", model.model_version, fingerprint);
                Ok(self.cache.store(&fingerprint, model))
            }
            Err(e) => {
                self.cache.invalidate();
                Err(e)
            }
        }
    }

    pub fn cached_fingerprint(&self) -> Option<String> {
        self.cache.current_fingerprint()
    }

    /// Predict the sleep score for partial inputs.
    ///
    /// Any failure, from reading the datasets to a non-finite score, comes
    /// back as a [`Diagnostic`] carrying its kind and cause chain.
    pub fn predict(&self, input: &PredictionInput) -> std::result::Result<SleepPrediction, Diagnostic> {
        self.trained_model()
            .and_then(|model| self.predictor.predict(&model, input))
            .map_err(|e| {
                let diagnostic = Diagnostic::from(e);
                error!("Prediction failed ({:?}): {}", diagnostic.kind, diagnostic);
                diagnostic
            })
    }

    pub fn metrics(&self) -> Result<ModelMetrics> {
        Ok(self.trained_model()?.metrics.clone())
    }

    pub fn feature_importance(&self) -> Result<Vec<FeatureImportance>> {
        let model = self.trained_model()?;
        self.importance.rank(&model)
    }

    pub fn target_statistics(&self) -> Result<TargetStatistics> {
        self.insights.target_statistics(&self.load_filtered_records()?)
    }

    pub fn correlations(&self, top_n: usize) -> Result<Vec<FeatureCorrelation>> {
        self.insights
            .target_correlations(&self.load_filtered_records()?, top_n)
    }

    pub fn correlation_matrix(&self, names: &[&str]) -> Result<CorrelationMatrix> {
        self.insights
            .correlation_matrix(&self.load_filtered_records()?, names)
    }

    /// Dates with a complete night, newest first
    pub fn dates(&self) -> Result<Vec<NaiveDate>> {
        Ok(self.insights.available_dates(&self.load_filtered_records()?))
    }

    pub fn sleep_day(&self, date: NaiveDate) -> Result<SleepDay> {
        self.insights.sleep_day(&self.load_filtered_records()?, date)
    }
}
