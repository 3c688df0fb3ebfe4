use serde::{Deserialize, Serialize};

use crate::models::schema;

/// Same-day inputs a user can supply for a prediction.
///
/// Every field is optional; unspecified fields keep the training-set mean.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PredictionInput {
    /// Exercise minutes
    pub exercise_minutes: Option<f64>,

    /// Mean heart rate (bpm)
    pub heart_rate_mean: Option<f64>,

    /// Minimum heart rate (bpm)
    pub heart_rate_min: Option<f64>,

    /// Maximum heart rate (bpm)
    pub heart_rate_max: Option<f64>,

    /// Heart rate variability (ms)
    pub hrv: Option<f64>,

    /// Ambient temperature (°C)
    pub temperature: Option<f64>,

    /// Relative humidity (%)
    pub humidity: Option<f64>,

    /// Mean sea level pressure (hPa)
    pub pressure: Option<f64>,

    /// Precipitation (mm)
    pub precipitation: Option<f64>,

    /// Wind gust (km/h)
    pub wind: Option<f64>,
}

/// Input fields recognised by the predictor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InputField {
    ExerciseMinutes,
    HeartRateMean,
    HeartRateMin,
    HeartRateMax,
    Hrv,
    Temperature,
    Humidity,
    Pressure,
    Precipitation,
    Wind,
}

impl InputField {
    pub const ALL: [InputField; 10] = [
        InputField::ExerciseMinutes,
        InputField::HeartRateMean,
        InputField::HeartRateMin,
        InputField::HeartRateMax,
        InputField::Hrv,
        InputField::Temperature,
        InputField::Humidity,
        InputField::Pressure,
        InputField::Precipitation,
        InputField::Wind,
    ];

    /// Dataset column this field overrides
    pub fn column_name(self) -> &'static str {
        match self {
            InputField::ExerciseMinutes => schema::EXERCISE_MINUTES,
            InputField::HeartRateMean => schema::HEART_RATE_MEAN,
            InputField::HeartRateMin => schema::HEART_RATE_MIN,
            InputField::HeartRateMax => schema::HEART_RATE_MAX,
            InputField::Hrv => schema::HRV,
            InputField::Temperature => schema::TEMPERATURE,
            InputField::Humidity => schema::HUMIDITY,
            InputField::Pressure => schema::PRESSURE,
            InputField::Precipitation => schema::PRECIPITATION,
            InputField::Wind => schema::WIND,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            InputField::ExerciseMinutes => "exercise_minutes",
            InputField::HeartRateMean => "heart_rate_mean",
            InputField::HeartRateMin => "heart_rate_min",
            InputField::HeartRateMax => "heart_rate_max",
            InputField::Hrv => "hrv",
            InputField::Temperature => "temperature",
            InputField::Humidity => "humidity",
            InputField::Pressure => "pressure",
            InputField::Precipitation => "precipitation",
            InputField::Wind => "wind",
        }
    }
}

impl PredictionInput {
    pub fn get(&self, field: InputField) -> Option<f64> {
        match field {
            InputField::ExerciseMinutes => self.exercise_minutes,
            InputField::HeartRateMean => self.heart_rate_mean,
            InputField::HeartRateMin => self.heart_rate_min,
            InputField::HeartRateMax => self.heart_rate_max,
            InputField::Hrv => self.hrv,
            InputField::Temperature => self.temperature,
            InputField::Humidity => self.humidity,
            InputField::Pressure => self.pressure,
            InputField::Precipitation => self.precipitation,
            InputField::Wind => self.wind,
        }
    }

    /// Fields that carry a value, in declaration order
    pub fn provided(&self) -> Vec<(InputField, f64)> {
        InputField::ALL
            .iter()
            .filter_map(|&field| self.get(field).map(|value| (field, value)))
            .collect()
    }
}

/// Five-level sleep quality scale
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QualityCategory {
    Excellent,
    Good,
    Acceptable,
    Fair,
    Poor,
}

impl QualityCategory {
    /// Category of a 0-100 sleep score
    pub fn from_score(score: f64) -> Self {
        if score >= 80.0 {
            QualityCategory::Excellent
        } else if score >= 70.0 {
            QualityCategory::Good
        } else if score >= 60.0 {
            QualityCategory::Acceptable
        } else if score >= 50.0 {
            QualityCategory::Fair
        } else {
            QualityCategory::Poor
        }
    }

    /// Category of a night by total hours slept
    pub fn from_sleep_hours(hours: f64) -> Self {
        if hours >= 8.0 {
            QualityCategory::Excellent
        } else if hours >= 7.0 {
            QualityCategory::Good
        } else if hours >= 6.0 {
            QualityCategory::Acceptable
        } else if hours >= 5.0 {
            QualityCategory::Fair
        } else {
            QualityCategory::Poor
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            QualityCategory::Excellent => "Excellent",
            QualityCategory::Good => "Good",
            QualityCategory::Acceptable => "Acceptable",
            QualityCategory::Fair => "Fair",
            QualityCategory::Poor => "Poor",
        }
    }

    pub fn interpretation(self) -> &'static str {
        match self {
            QualityCategory::Excellent => {
                "Excellent sleep quality is expected. Conditions are optimal for a good rest."
            }
            QualityCategory::Good => {
                "Good sleep quality is expected. Conditions favour adequate rest."
            }
            QualityCategory::Acceptable => {
                "Acceptable sleep quality is expected. Some conditions could improve to optimise rest."
            }
            QualityCategory::Fair => {
                "Fair sleep quality is expected. Consider improving the environment or pre-sleep habits."
            }
            QualityCategory::Poor => {
                "Poor sleep quality is expected. Current conditions are unfavourable; try improving the environment and bedtime routine."
            }
        }
    }
}

/// Result of a single sleep score prediction
#[derive(Debug, Clone, Serialize)]
pub struct SleepPrediction {
    /// Predicted score, clipped to 0-100
    pub score: f64,

    pub category: QualityCategory,

    pub interpretation: String,

    /// Inputs written into the feature row
    pub applied_fields: Vec<InputField>,

    /// Inputs whose column is absent from the current schema
    pub skipped_fields: Vec<InputField>,

    /// Model version used for prediction
    pub model_version: String,
}
