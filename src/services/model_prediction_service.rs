use ndarray::Axis;
use tracing::{debug, instrument, warn};

use crate::error::{PipelineError, Result};
use crate::models::{PredictionInput, QualityCategory, SleepPrediction};
use crate::services::ml_model_service::TrainedModel;

pub const MIN_SCORE: f64 = 0.0;
pub const MAX_SCORE: f64 = 100.0;

/// Turns partial same-day inputs into a sleep score using a trained model
#[derive(Debug, Clone, Default)]
pub struct ModelPredictionService;

impl ModelPredictionService {
    pub fn new() -> Self {
        Self
    }

    /// Predict the sleep score for one day.
    ///
    /// The feature row starts from the training-frame means. Each provided
    /// field overrides its column when the model was trained with it and is
    /// reported as skipped otherwise. The score is clipped to 0-100.
    #[instrument(skip_all, fields(model_version = %trained.model_version))]
    pub fn predict(&self, trained: &TrainedModel, input: &PredictionInput) -> Result<SleepPrediction> {
        let frame = &trained.train_features;
        let mut row = frame.column_means();

        let mut applied_fields = Vec::new();
        let mut skipped_fields = Vec::new();

        for (field, value) in input.provided() {
            if !value.is_finite() {
                return Err(PipelineError::InvalidInput {
                    field: field.as_str().to_string(),
                    value,
                });
            }

            match frame.position(field.column_name()) {
                Some(index) => {
                    row[index] = value;
                    applied_fields.push(field);
                }
                None => {
                    warn!(
                        "Input '{}' ignored: column '{}' is not in the training features",
                        field.as_str(),
                        field.column_name()
                    );
                    skipped_fields.push(field);
                }
            }
        }

        let imputed = trained.imputer.transform_row(&row).insert_axis(Axis(0));
        let raw = trained
            .predict_imputed(&imputed)
            .first()
            .copied()
            .unwrap_or(f64::NAN);

        if !raw.is_finite() {
            return Err(PipelineError::NonFinite("sleep score prediction".to_string()));
        }

        let score = raw.clamp(MIN_SCORE, MAX_SCORE);
        debug!("Raw prediction {:.3}, clipped to {:.3}", raw, score);

        let category = QualityCategory::from_score(score);
        Ok(SleepPrediction {
            score,
            category,
            interpretation: category.interpretation().to_string(),
            applied_fields,
            skipped_fields,
            model_version: trained.model_version.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ModelConfig;
    use crate::models::{schema, FeatureFrame, InputField};
    use crate::services::ml_model_service::MLModelService;
    use ndarray::{Array1, Array2};

    /// Score rises with HRV and falls with temperature
    fn trained_model() -> TrainedModel {
        let n = 50;
        let mut values = Array2::zeros((n, 2));
        let mut target = Array1::zeros(n);
        for i in 0..n {
            let hrv = 20.0 + (i % 10) as f64 * 8.0;
            let temperature = 10.0 + (i % 7) as f64 * 3.0;
            values[[i, 0]] = hrv;
            values[[i, 1]] = temperature;
            target[i] = 30.0 + 0.5 * hrv - 0.8 * temperature;
        }
        let frame = FeatureFrame {
            names: vec![schema::HRV.to_string(), schema::TEMPERATURE.to_string()],
            values,
        };
        MLModelService::new(ModelConfig::default())
            .train(&frame, &target)
            .unwrap()
    }

    #[test]
    fn test_prediction_without_inputs_uses_means() {
        let trained = trained_model();
        let prediction = ModelPredictionService::new()
            .predict(&trained, &PredictionInput::default())
            .unwrap();

        assert!(prediction.score > 0.0 && prediction.score < 100.0);
        assert!(prediction.applied_fields.is_empty());
        assert_eq!(prediction.model_version, trained.model_version);
    }

    #[test]
    fn test_extreme_inputs_are_clipped() {
        let trained = trained_model();
        let service = ModelPredictionService::new();

        let high = PredictionInput {
            hrv: Some(10_000.0),
            ..PredictionInput::default()
        };
        let prediction = service.predict(&trained, &high).unwrap();
        assert_eq!(prediction.score, MAX_SCORE);
        assert_eq!(prediction.category, QualityCategory::Excellent);

        let low = PredictionInput {
            hrv: Some(-10_000.0),
            ..PredictionInput::default()
        };
        assert_eq!(service.predict(&trained, &low).unwrap().score, MIN_SCORE);
    }

    #[test]
    fn test_fields_without_column_are_reported() {
        let trained = trained_model();
        let input = PredictionInput {
            temperature: Some(18.0),
            wind: Some(30.0),
            humidity: Some(60.0),
            ..PredictionInput::default()
        };
        let prediction = ModelPredictionService::new().predict(&trained, &input).unwrap();

        assert_eq!(prediction.applied_fields, vec![InputField::Temperature]);
        assert_eq!(
            prediction.skipped_fields,
            vec![InputField::Humidity, InputField::Wind]
        );
    }

    #[test]
    fn test_non_finite_input_is_rejected() {
        let trained = trained_model();
        let input = PredictionInput {
            temperature: Some(f64::NAN),
            ..PredictionInput::default()
        };
        let result = ModelPredictionService::new().predict(&trained, &input);
        assert!(matches!(result, Err(PipelineError::InvalidInput { .. })));
    }
}
