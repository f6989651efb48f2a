//! Error types for the revtag HTTP API.

use axum::http::StatusCode;
use axum::response::IntoResponse;
use revtag_analysis::AnalysisError;
use thiserror::Error;
use tracing::{error, warn};

/// Main error type for API operations.
#[derive(Error, Debug)]
pub enum ApiError {
    /// Missing or malformed request body.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The feedback log is missing or holds no records.
    #[error("No data available: {0}")]
    NoData(String),

    /// Model inference failed.
    #[error("Classification error: {0}")]
    Classification(String),

    /// Feedback log could not be read or written.
    #[error("Store error: {0}")]
    Store(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP server error.
    #[error("HTTP error: {0}")]
    Http(String),

    /// Internal server error.
    #[error("Internal server error: {0}")]
    Internal(String),

    /// Analysis (model or lexicon) error.
    #[error("Analysis error: {0}")]
    Analysis(#[from] AnalysisError),

    /// Core revtag error.
    #[error("Core error: {0}")]
    Core(#[from] revtag_core::Error),
}

/// Result alias for API operations.
pub type ApiResult<T> = Result<T, ApiError>;

impl ApiError {
    /// Convert to HTTP status code.
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            ApiError::NoData(_) => StatusCode::NOT_FOUND,
            ApiError::Analysis(AnalysisError::InvalidInput(_)) => StatusCode::BAD_REQUEST,
            ApiError::Classification(_)
            | ApiError::Store(_)
            | ApiError::Io(_)
            | ApiError::Http(_)
            | ApiError::Internal(_)
            | ApiError::Analysis(_)
            | ApiError::Core(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Short machine-readable message returned in the response body.
    pub fn public_message(&self) -> &'static str {
        match self {
            ApiError::InvalidInput(_) | ApiError::Analysis(AnalysisError::InvalidInput(_)) => {
                "Invalid input"
            }
            ApiError::NoData(_) => "No data available",
            ApiError::Classification(_) | ApiError::Analysis(_) => "Classification failed",
            _ => "Internal server error",
        }
    }
}

impl From<ApiError> for axum::response::Response {
    fn from(err: ApiError) -> Self {
        let status = err.status_code();
        if status.is_server_error() {
            error!("{}", err);
        } else {
            warn!("{}", err);
        }
        let body = serde_json::json!({ "error": err.public_message() });
        (status, axum::Json(body)).into_response()
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        self.into()
    }
}
