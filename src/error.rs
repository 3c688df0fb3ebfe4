use serde::Serialize;
use std::error::Error as StdError;
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised by the loading, labelling and training pipeline
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Failed to read dataset {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed CSV in {dataset}: {source}")]
    Csv {
        dataset: String,
        #[source]
        source: csv::Error,
    },

    #[error("Missing required column '{column}' in {dataset}")]
    MissingColumn { dataset: String, column: String },

    #[error("Invalid date '{value}' in {dataset} at row {row}")]
    DateParse {
        dataset: String,
        row: usize,
        value: String,
    },

    #[error("Column '{column}' has {actual} values, expected {expected}")]
    ShapeMismatch {
        column: String,
        expected: usize,
        actual: usize,
    },

    #[error("Insufficient training data: {0}")]
    InsufficientData(String),

    #[error("Non-finite value produced by {0}")]
    NonFinite(String),

    #[error("Invalid input for {field}: {value}")]
    InvalidInput { field: String, value: f64 },

    #[error("Elastic net fit failed: {0}")]
    Fit(#[from] linfa_elasticnet::ElasticNetError),

    #[error("Decision tree fit failed: {0}")]
    TreeFit(#[from] linfa::Error),

    #[error("Date not found in daily records: {0}")]
    DateNotFound(chrono::NaiveDate),
}

/// Coarse category of a pipeline failure, used by callers to branch on the cause
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Io,
    Schema,
    Parse,
    Numerical,
    Fit,
    Input,
    NotFound,
}

impl PipelineError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            PipelineError::Io { .. } => ErrorKind::Io,
            PipelineError::Csv { .. } => ErrorKind::Parse,
            PipelineError::DateParse { .. } => ErrorKind::Parse,
            PipelineError::MissingColumn { .. } => ErrorKind::Schema,
            PipelineError::ShapeMismatch { .. } => ErrorKind::Schema,
            PipelineError::NonFinite(_) => ErrorKind::Numerical,
            PipelineError::InsufficientData(_) => ErrorKind::Fit,
            PipelineError::Fit(_) => ErrorKind::Fit,
            PipelineError::TreeFit(_) => ErrorKind::Fit,
            PipelineError::InvalidInput { .. } => ErrorKind::Input,
            PipelineError::DateNotFound(_) => ErrorKind::NotFound,
        }
    }

    pub(crate) fn missing_column(dataset: &str, column: &str) -> Self {
        PipelineError::MissingColumn {
            dataset: dataset.to_string(),
            column: column.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, PipelineError>;

/// Recovered failure handed to callers of the prediction boundary
#[derive(Debug, Clone, Serialize)]
pub struct Diagnostic {
    pub kind: ErrorKind,
    pub message: String,
    /// Every `source()` below the top-level error, outermost first
    pub causes: Vec<String>,
}

impl From<PipelineError> for Diagnostic {
    fn from(error: PipelineError) -> Self {
        let mut causes = Vec::new();
        let mut source = error.source();
        while let Some(cause) = source {
            causes.push(cause.to_string());
            source = cause.source();
        }

        Self {
            kind: error.kind(),
            message: error.to_string(),
            causes,
        }
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)?;
        for cause in &self.causes {
            write!(f, "\n  caused by: {}", cause)?;
        }
        Ok(())
    }
}
