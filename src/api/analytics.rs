use axum::{
    extract::{Path, Query, State},
    response::Json,
    routing::get,
    Router,
};
use chrono::NaiveDate;
use serde::Deserialize;

use super::error::{run_blocking, ApiResult};
use super::routes::AppState;
use crate::models::{CorrelationMatrix, DailyRecords, FeatureCorrelation, SleepDay, TargetStatistics};
use crate::services::sleep_quality_service::DEFAULT_TOP_CORRELATIONS;

#[derive(Debug, Deserialize)]
pub struct RecordsQuery {
    /// Return every joined row with its sub-scores (default: false)
    #[serde(default)]
    pub all: bool,
}

#[derive(Debug, Deserialize)]
pub struct MatrixQuery {
    /// Comma-separated column names (default: every column)
    pub columns: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CorrelationQuery {
    /// Number of correlations to return (default: 20)
    pub top_n: Option<usize>,
}

pub fn analytics_routes() -> Router<AppState> {
    Router::new()
        .route("/records", get(get_records))
        .route("/insights/target", get(get_target_statistics))
        .route("/insights/correlations", get(get_correlations))
        .route("/insights/correlation-matrix", get(get_correlation_matrix))
        .route("/days", get(list_days))
        .route("/days/:date", get(get_sleep_day))
}

pub async fn get_records(
    State(state): State<AppState>,
    Query(query): Query<RecordsQuery>,
) -> ApiResult<DailyRecords> {
    let service = state.service.clone();
    run_blocking(move || {
        if query.all {
            service.load_all_records()
        } else {
            service.load_filtered_records()
        }
    })
    .await
}

pub async fn get_target_statistics(State(state): State<AppState>) -> ApiResult<TargetStatistics> {
    let service = state.service.clone();
    run_blocking(move || service.target_statistics()).await
}

pub async fn get_correlations(
    State(state): State<AppState>,
    Query(query): Query<CorrelationQuery>,
) -> ApiResult<Vec<FeatureCorrelation>> {
    let service = state.service.clone();
    let top_n = query.top_n.unwrap_or(DEFAULT_TOP_CORRELATIONS);
    run_blocking(move || service.correlations(top_n)).await
}

pub async fn get_correlation_matrix(
    State(state): State<AppState>,
    Query(query): Query<MatrixQuery>,
) -> ApiResult<CorrelationMatrix> {
    let service = state.service.clone();
    run_blocking(move || {
        let columns: Vec<&str> = query
            .columns
            .as_deref()
            .map(|list| list.split(',').map(str::trim).filter(|c| !c.is_empty()).collect())
            .unwrap_or_default();
        service.correlation_matrix(&columns)
    })
    .await
}

pub async fn list_days(State(state): State<AppState>) -> ApiResult<Vec<NaiveDate>> {
    let service = state.service.clone();
    run_blocking(move || service.dates()).await
}

pub async fn get_sleep_day(
    State(state): State<AppState>,
    Path(date): Path<NaiveDate>,
) -> ApiResult<SleepDay> {
    let service = state.service.clone();
    run_blocking(move || service.sleep_day(date)).await
}
