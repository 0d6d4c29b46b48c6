//! # Application Error
//!
//! Maps domain errors to structured HTTP responses. Only administrative
//! and authentication failures surface here — verification denials are
//! soft `{valid: false}` results built by the verify handler and never
//! pass through this type.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

use warrant_state::{LifecycleError, StoreError};

/// Application-level error type that maps to HTTP responses.
#[derive(Error, Debug)]
pub enum AppError {
    /// Missing or invalid shared secret / admin token / credentials.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// The request was structurally invalid.
    #[error("bad request: {0}")]
    BadRequest(String),

    /// Resource not found.
    #[error("not found: {0}")]
    NotFound(String),

    /// A uniqueness constraint rejected the request.
    #[error("conflict: {0}")]
    Conflict(String),

    /// The durability layer failed.
    #[error("internal error: {0}")]
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        let body = serde_json::json!({
            "error": {
                "code": status.as_u16(),
                "message": self.to_string(),
            }
        });
        (status, axum::Json(body)).into_response()
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Conflict { key } => Self::Conflict(format!("duplicate license key: {key}")),
            StoreError::Storage(source) => Self::Internal(format!("storage failure: {source}")),
        }
    }
}

impl From<LifecycleError> for AppError {
    fn from(err: LifecycleError) -> Self {
        match err {
            LifecycleError::NotFound { key } => Self::NotFound(format!("license not found: {key}")),
            LifecycleError::InvalidRequest(message) => Self::BadRequest(message),
            LifecycleError::Store(source) => source.into(),
        }
    }
}
