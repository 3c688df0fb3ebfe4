// Pipeline services: loading, labelling, training, prediction and exploration

pub mod data_insights_service;
pub mod data_loader_service;
pub mod feature_engineering_service;
pub mod feature_importance_service;
pub mod label_synthesis_service;
pub mod ml_model_service;
pub mod model_cache_service;
pub mod model_prediction_service;
pub mod sleep_quality_service;

pub use data_insights_service::DataInsightsService;
pub use data_loader_service::{DataLoaderService, SourceBytes};
pub use feature_engineering_service::FeatureEngineeringService;
pub use feature_importance_service::FeatureImportanceService;
pub use label_synthesis_service::LabelSynthesisService;
pub use ml_model_service::{MLModelService, MeanImputer, TrainedModel};
pub use model_cache_service::ModelCacheService;
pub use model_prediction_service::ModelPredictionService;
pub use sleep_quality_service::SleepQualityService;
