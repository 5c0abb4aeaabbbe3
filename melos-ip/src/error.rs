//! Error types for melos-ip

use crate::services::PipelineError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// Resource not found (404)
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// Invalid request (400)
    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// Conflict (409) - e.g., token already registered
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Internal server error (500)
    #[error("Internal server error: {0}")]
    Internal(String),

    /// Pipeline error (mapped per variant)
    #[error(transparent)]
    Pipeline(#[from] PipelineError),

    /// melos-common error
    #[error("Common error: {0}")]
    Common(#[from] melos_common::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code, message) = match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, "CONFLICT", msg),
            ApiError::Internal(msg) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR", msg)
            }
            ApiError::Pipeline(err) => pipeline_response(err),
            ApiError::Common(melos_common::Error::NotFound(msg)) => {
                (StatusCode::NOT_FOUND, "NOT_FOUND", msg)
            }
            ApiError::Common(melos_common::Error::InvalidInput(msg)) => {
                (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg)
            }
            ApiError::Common(ref err) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "COMMON_ERROR",
                err.to_string(),
            ),
        };

        let body = Json(json!({
            "error": {
                "code": error_code,
                "message": message,
            }
        }));

        (status, body).into_response()
    }
}

fn pipeline_response(err: PipelineError) -> (StatusCode, &'static str, String) {
    match err {
        PipelineError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg),
        PipelineError::AlreadyRegistered(token_id) => (
            StatusCode::CONFLICT,
            "ALREADY_REGISTERED",
            format!("token {} is already registered", token_id),
        ),
        PipelineError::HashMismatch(msg) => {
            (StatusCode::UNPROCESSABLE_ENTITY, "HASH_MISMATCH", msg)
        }
        PipelineError::VerificationFailed(msg) => {
            (StatusCode::BAD_GATEWAY, "VERIFICATION_FAILED", msg)
        }
        PipelineError::Verification(err) => {
            (StatusCode::BAD_GATEWAY, "UPSTREAM_ERROR", err.to_string())
        }
        PipelineError::Gateway(err) => {
            (StatusCode::BAD_GATEWAY, "UPSTREAM_ERROR", err.to_string())
        }
        PipelineError::Ledger(err) => (StatusCode::BAD_GATEWAY, "LEDGER_ERROR", err.to_string()),
        PipelineError::Common(melos_common::Error::NotFound(msg)) => {
            (StatusCode::NOT_FOUND, "NOT_FOUND", msg)
        }
        PipelineError::Common(err) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            "INTERNAL_ERROR",
            err.to_string(),
        ),
        PipelineError::Serialization(err) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            "INTERNAL_ERROR",
            err.to_string(),
        ),
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;
