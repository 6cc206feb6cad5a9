use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use studio_core::error::CoreError;
use studio_pipeline::{ErrorKind, JobError};

/// Application-level error type for HTTP handlers.
///
/// Wraps [`JobError`] and adds HTTP-specific variants.
/// Implements [`IntoResponse`] to produce consistent JSON error responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A job that failed somewhere between validation and archiving.
    #[error(transparent)]
    Job(#[from] JobError),

    /// A bad request with a human-readable message.
    #[error("Bad request: {0}")]
    BadRequest(String),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            // --- Job errors ---
            AppError::Job(err) => classify_job_error(err),

            // --- HTTP-specific errors ---
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone()),
        };

        let body = json!({
            "error": message,
            "code": code,
        });

        (status, axum::Json(body)).into_response()
    }
}

/// Map a failed job onto an HTTP status, error code, and message.
///
/// - Validation maps to 400 with the validation message.
/// - Configuration maps to 500; the message names the missing setting.
/// - Submission and poll failures map to 502.
/// - An exhausted poll maps to 504.
fn classify_job_error(err: &JobError) -> (StatusCode, &'static str, String) {
    match err.kind() {
        ErrorKind::Validation => match err {
            JobError::Invalid(CoreError::Validation(msg)) => {
                (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone())
            }
            other => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", other.to_string()),
        },
        ErrorKind::Configuration => {
            tracing::error!(error = %err, "Remote service is misconfigured");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "CONFIGURATION_ERROR",
                err.to_string(),
            )
        }
        ErrorKind::Submission => (StatusCode::BAD_GATEWAY, "SUBMISSION_FAILED", err.to_string()),
        ErrorKind::Poll => (StatusCode::BAD_GATEWAY, "JOB_FAILED", err.to_string()),
        ErrorKind::Timeout => (StatusCode::GATEWAY_TIMEOUT, "JOB_TIMEOUT", err.to_string()),
        ErrorKind::Cancelled => (
            StatusCode::SERVICE_UNAVAILABLE,
            "JOB_CANCELLED",
            err.to_string(),
        ),
        ErrorKind::Internal => {
            tracing::error!(error = %err, "Job failed internally");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                "An internal error occurred".to_string(),
            )
        }
    }
}
