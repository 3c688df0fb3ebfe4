// Data models for the sleep quality pipeline

pub mod daily_record;
pub mod insights;
pub mod model_metrics;
pub mod prediction;
pub mod schema;

pub use daily_record::{Column, DailyRecords, FeatureFrame, SleepDay, StageShare};
pub use insights::{CorrelationMatrix, FeatureCorrelation, FeatureImportance, TargetStatistics};
pub use model_metrics::{MetricsReport, ModelMetrics, PartitionMetrics};
pub use prediction::{InputField, PredictionInput, QualityCategory, SleepPrediction};
