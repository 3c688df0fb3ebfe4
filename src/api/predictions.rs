use axum::{
    extract::State,
    response::Json,
    routing::{get, post},
    Router,
};
use chrono::{DateTime, Utc};
use serde::Serialize;

use super::error::{run_blocking, ApiResult};
use super::routes::AppState;
use crate::models::{
    FeatureImportance, MetricsReport, ModelMetrics, PredictionInput, SleepPrediction,
};

#[derive(Debug, Serialize)]
pub struct MetricsResponse {
    /// Rounded metrics as displayed to users
    pub report: MetricsReport,
    /// Unrounded metrics for both partitions
    pub metrics: ModelMetrics,
}

#[derive(Debug, Serialize)]
pub struct RefreshResponse {
    pub model_version: String,
    /// md5 fingerprint of the datasets the model was trained on
    pub fingerprint: Option<String>,
    pub trained_at: DateTime<Utc>,
    pub report: MetricsReport,
}

pub fn prediction_routes() -> Router<AppState> {
    Router::new()
        .route("/predict", post(predict_sleep_quality))
        .route("/metrics", get(get_model_metrics))
        .route("/importance", get(get_feature_importance))
        .route("/model/refresh", post(refresh_model))
}

/// Predict tonight's sleep score from partial same-day inputs
pub async fn predict_sleep_quality(
    State(state): State<AppState>,
    Json(input): Json<PredictionInput>,
) -> ApiResult<SleepPrediction> {
    let service = state.service.clone();
    run_blocking(move || service.predict(&input)).await
}

pub async fn get_model_metrics(State(state): State<AppState>) -> ApiResult<MetricsResponse> {
    let service = state.service.clone();
    run_blocking(move || {
        let metrics = service.metrics()?;
        Ok::<_, crate::error::PipelineError>(MetricsResponse {
            report: metrics.report(),
            metrics,
        })
    })
    .await
}

pub async fn get_feature_importance(State(state): State<AppState>) -> ApiResult<Vec<FeatureImportance>> {
    let service = state.service.clone();
    run_blocking(move || service.feature_importance()).await
}

/// Retrain on the current datasets and replace the cached model
pub async fn refresh_model(State(state): State<AppState>) -> ApiResult<RefreshResponse> {
    let service = state.service.clone();
    run_blocking(move || {
        let model = service.force_refresh()?;
        Ok::<_, crate::error::PipelineError>(RefreshResponse {
            model_version: model.model_version.clone(),
            fingerprint: service.cached_fingerprint(),
            trained_at: model.trained_at,
            report: model.metrics.report(),
        })
    })
    .await
}
