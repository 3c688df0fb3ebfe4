use axum::{routing::get, Router};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use super::analytics::analytics_routes;
use super::health::health_check;
use super::predictions::prediction_routes;
use crate::services::SleepQualityService;

#[derive(Clone)]
pub struct AppState {
    pub service: Arc<SleepQualityService>,
}

pub fn create_routes(service: Arc<SleepQualityService>) -> Router {
    let state = AppState { service };

    Router::new()
        .route("/health", get(health_check))
        .merge(prediction_routes())
        .merge(analytics_routes())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
