use axum::{http::StatusCode, response::Json};
use serde::Serialize;
use serde_json::json;
use tracing::error;

use crate::error::{Diagnostic, ErrorKind, PipelineError};

/// Error body returned by every endpoint
#[derive(Debug, Serialize)]
pub struct ApiError {
    /// Error code
    pub error_code: String,
    /// Error message
    pub message: String,
    /// Additional details
    pub details: Option<serde_json::Value>,
}

pub type ApiResult<T> = Result<Json<T>, (StatusCode, Json<ApiError>)>;

impl ApiError {
    pub fn new(code: &str, message: &str) -> Self {
        Self {
            error_code: code.to_string(),
            message: message.to_string(),
            details: None,
        }
    }

    pub fn with_details(code: &str, message: &str, details: serde_json::Value) -> Self {
        Self {
            error_code: code.to_string(),
            message: message.to_string(),
            details: Some(details),
        }
    }
}

fn error_code(kind: ErrorKind) -> &'static str {
    match kind {
        ErrorKind::Io => "DATASET_UNAVAILABLE",
        ErrorKind::Schema => "SCHEMA_ERROR",
        ErrorKind::Parse => "PARSE_ERROR",
        ErrorKind::Numerical => "NUMERICAL_ERROR",
        ErrorKind::Fit => "TRAINING_ERROR",
        ErrorKind::Input => "INVALID_INPUT",
        ErrorKind::NotFound => "NOT_FOUND",
    }
}

pub fn status_code(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::Input => StatusCode::BAD_REQUEST,
        ErrorKind::NotFound => StatusCode::NOT_FOUND,
        ErrorKind::Io => StatusCode::SERVICE_UNAVAILABLE,
        ErrorKind::Schema | ErrorKind::Parse | ErrorKind::Numerical | ErrorKind::Fit => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

impl From<Diagnostic> for (StatusCode, Json<ApiError>) {
    fn from(diagnostic: Diagnostic) -> Self {
        (
            status_code(diagnostic.kind),
            Json(ApiError::with_details(
                error_code(diagnostic.kind),
                &diagnostic.message,
                json!({ "kind": diagnostic.kind, "causes": diagnostic.causes }),
            )),
        )
    }
}

impl From<PipelineError> for (StatusCode, Json<ApiError>) {
    fn from(error: PipelineError) -> Self {
        Diagnostic::from(error).into()
    }
}

/// Run synchronous pipeline work off the async runtime
pub async fn run_blocking<T, E, F>(work: F) -> ApiResult<T>
where
    F: FnOnce() -> Result<T, E> + Send + 'static,
    T: Send + 'static,
    E: Into<(StatusCode, Json<ApiError>)> + Send + 'static,
{
    match tokio::task::spawn_blocking(work).await {
        Ok(result) => result.map(Json).map_err(Into::into),
        Err(e) => {
            error!("Pipeline task failed: {}", e);
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiError::new("INTERNAL_ERROR", "Pipeline task did not complete")),
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_not_found_maps_to_404() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let (status, Json(body)): (StatusCode, Json<ApiError>) =
            PipelineError::DateNotFound(date).into();
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body.error_code, "NOT_FOUND");
        assert_eq!(body.details.unwrap()["kind"], "not_found");
    }

    #[test]
    fn test_invalid_input_maps_to_400() {
        let error = PipelineError::InvalidInput {
            field: "hrv".to_string(),
            value: f64::INFINITY,
        };
        let (status, _): (StatusCode, Json<ApiError>) = error.into();
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}
