use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::matching::keywords::KeywordError;
use crate::store::StoreError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
///
/// Per-job scoring failures never reach this type; they are folded into
/// fallback `MatchResult`s by the scoring client.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("No resume has been uploaded")]
    NoResume,

    #[error("No job postings are loaded")]
    NoJobs,

    #[error("A matching run is already in progress")]
    AlreadyInProgress,

    #[error("The job set changed while matching was running")]
    JobSetChanged,

    #[error("Resume text extraction timed out after {0}s")]
    ExtractionTimeout(u64),

    #[error("Resume text extraction failed: {0}")]
    Extraction(String),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

impl From<KeywordError> for AppError {
    fn from(e: KeywordError) -> Self {
        AppError::Validation(e.to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::NoResume => (StatusCode::BAD_REQUEST, "NO_RESUME", self.to_string()),
            AppError::NoJobs => (StatusCode::BAD_REQUEST, "NO_JOBS", self.to_string()),
            AppError::AlreadyInProgress => {
                (StatusCode::CONFLICT, "ALREADY_IN_PROGRESS", self.to_string())
            }
            AppError::JobSetChanged => (StatusCode::CONFLICT, "JOB_SET_CHANGED", self.to_string()),
            AppError::ExtractionTimeout(_) => {
                tracing::error!("{self}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "EXTRACTION_TIMEOUT",
                    self.to_string(),
                )
            }
            AppError::Extraction(msg) => {
                tracing::error!("Resume extraction error: {msg}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "EXTRACTION_ERROR",
                    "Could not extract text from the uploaded resume".to_string(),
                )
            }
            AppError::Store(e) => {
                tracing::error!("Store error: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "STORE_ERROR",
                    "A storage error occurred".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}
