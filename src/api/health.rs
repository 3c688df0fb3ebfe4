use axum::{extract::State, http::StatusCode, response::Json};
use serde_json::{json, Value};

use super::routes::AppState;

pub async fn health_check(State(state): State<AppState>) -> Result<Json<Value>, StatusCode> {
    Ok(Json(json!({
        "status": "healthy",
        "service": "sleep-quality",
        "version": env!("CARGO_PKG_VERSION"),
        "environment": state.service.config().server.environment,
        "prediction_mode": state.service.config().model.prediction_mode,
        "cached_model": state.service.cached_fingerprint(),
        "timestamp": chrono::Utc::now().to_rfc3339()
    })))
}
