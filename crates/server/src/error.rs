// crates/server/src/error.rs
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Structured JSON error response for API errors.
#[derive(Debug, Serialize)]
#[cfg_attr(test, derive(serde::Deserialize))]
pub struct ErrorResponse {
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ErrorResponse {
    pub fn with_details(error: impl Into<String>, details: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            details: Some(details.into()),
        }
    }
}

/// API error types that map to HTTP status codes.
///
/// The surface is deliberately small: the only client-visible failures in
/// this backend are missing jobs and missing records. Subscriber delivery
/// failures never reach this layer (they are absorbed inside broadcast).
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Job not found: {0}")]
    JobNotFound(String),

    #[error("Record not found: {0}")]
    RecordNotFound(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_response) = match &self {
            ApiError::JobNotFound(id) => {
                tracing::warn!(job_id = %id, "Job not found");
                (
                    StatusCode::NOT_FOUND,
                    ErrorResponse::with_details("Job not found", format!("Job ID: {id}")),
                )
            }
            ApiError::RecordNotFound(id) => {
                tracing::warn!(record_id = %id, "Record not found");
                (
                    StatusCode::NOT_FOUND,
                    ErrorResponse::with_details("Record not found", format!("Record ID: {id}")),
                )
            }
        };

        (status, Json(error_response)).into_response()
    }
}

/// Result type alias for API handlers.
pub type ApiResult<T> = Result<T, ApiError>;
