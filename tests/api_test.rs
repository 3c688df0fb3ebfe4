mod common;

use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use common::*;
use serde_json::{json, Value};
use sleep_quality::api::create_routes;
use sleep_quality::config::PredictionMode;
use sleep_quality::SleepQualityService;
use std::sync::Arc;
use tower::ServiceExt;

fn app(fixture: &Fixture) -> Router {
    let service = SleepQualityService::new(&fixture.config(PredictionMode::Cached));
    create_routes(Arc::new(service))
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn test_health_check() {
    let fixture = Fixture::new();
    let (status, body) = send(app(&fixture), get("/health")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["prediction_mode"], "cached");
    assert_eq!(body["environment"], "development");
}

#[tokio::test]
async fn test_predict_clips_extreme_hrv() {
    let fixture = Fixture::new();
    let (status, body) = send(app(&fixture), post_json("/predict", json!({ "hrv": 10000 }))).await;

    assert_eq!(status, StatusCode::OK);
    let score = body["score"].as_f64().unwrap();
    assert!((0.0..=100.0).contains(&score));
    assert_eq!(body["applied_fields"], json!(["hrv"]));
}

#[tokio::test]
async fn test_predict_without_datasets_is_unavailable() {
    let fixture = Fixture::new();
    let mut config = fixture.config(PredictionMode::Cached);
    config.data.health_path = fixture.dir.path().join("nope.csv");
    let app = create_routes(Arc::new(SleepQualityService::new(&config)));

    let (status, body) = send(app, post_json("/predict", json!({}))).await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["error_code"], "DATASET_UNAVAILABLE");
    assert_eq!(body["details"]["kind"], "io");
}

#[tokio::test]
async fn test_metrics_report() {
    let fixture = Fixture::new();
    let (status, body) = send(app(&fixture), get("/metrics")).await;

    assert_eq!(status, StatusCode::OK);
    assert!(body["report"]["RMSE test"].is_number());
    assert!(body["report"]["MAPE train"].as_str().unwrap().ends_with('%'));
    assert_eq!(body["metrics"]["test"]["sample_count"], 12);
}

#[tokio::test]
async fn test_records_variants() {
    let fixture = Fixture::new();

    let (status, body) = send(app(&fixture), get("/records")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["fecha"].as_array().unwrap().len(), SHARED_DAYS - 2);

    let (_, body) = send(app(&fixture), get("/records?all=true")).await;
    assert_eq!(body["fecha"].as_array().unwrap().len(), SHARED_DAYS);
}

#[tokio::test]
async fn test_days_and_missing_day() {
    let fixture = Fixture::new();

    let (status, body) = send(app(&fixture), get("/days")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body[0], day(SHARED_DAYS - 1).to_string());

    let (status, body) = send(app(&fixture), get("/days/2024-01-01")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["stages"].as_array().unwrap().len(), 4);

    let (status, body) = send(app(&fixture), get("/days/1999-01-01")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error_code"], "NOT_FOUND");
}

#[tokio::test]
async fn test_insights_and_refresh() {
    let fixture = Fixture::new();

    let (status, body) = send(app(&fixture), get("/insights/target")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], SHARED_DAYS - 2);

    let (status, body) = send(app(&fixture), get("/insights/correlations?top_n=3")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 3);

    let (status, body) = send(
        app(&fixture),
        get("/insights/correlation-matrix?columns=Temperature,target"),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["values"][0][0], 1.0);
    assert_eq!(body["names"], json!(["Temperature", "target"]));

    let (status, body) = send(app(&fixture), get("/importance")).await;
    assert_eq!(status, StatusCode::OK);
    assert!(!body.as_array().unwrap().is_empty());

    let (status, body) = send(app(&fixture), post_json("/model/refresh", json!({}))).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["fingerprint"].as_str().unwrap().len() == 32);
}
