// ABOUTME: Centralized error taxonomy mapped onto the HTTP status contract
// ABOUTME: Upstream store failures surface their message; auth failures stay terse

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use std::fmt;

use crate::store::StoreError;

#[derive(Debug)]
pub enum AppError {
    Unauthenticated(String),
    Validation(String),
    NotFound(String),
    Upstream(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Unauthenticated(msg) => write!(f, "Unauthenticated: {}", msg),
            AppError::Validation(msg) => write!(f, "Validation error: {}", msg),
            AppError::NotFound(msg) => write!(f, "Not found: {}", msg),
            AppError::Upstream(msg) => write!(f, "Upstream failure: {}", msg),
        }
    }
}

impl std::error::Error for AppError {}

impl AppError {
    /// Map a store failure for a specific resource: an absent-or-not-owned row
    /// becomes a 404 for that resource, anything else surfaces as a 500.
    pub fn from_store(err: StoreError, resource: &str) -> Self {
        match err {
            StoreError::NotFound => AppError::NotFound(format!("{} not found", resource)),
            other => AppError::Upstream(other.to_string()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::Unauthenticated(msg) => {
                tracing::warn!("Unauthenticated request: {}", msg);
                (StatusCode::UNAUTHORIZED, msg)
            }
            AppError::Validation(msg) => {
                tracing::warn!("Invalid request: {}", msg);
                (StatusCode::BAD_REQUEST, msg)
            }
            AppError::NotFound(msg) => {
                tracing::info!("Resource not found: {}", msg);
                (StatusCode::NOT_FOUND, msg)
            }
            AppError::Upstream(msg) => {
                tracing::error!("Upstream failure: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, msg)
            }
        };

        let body = Json(json!({
            "error": error_message,
            "status": status.as_u16()
        }));

        (status, body).into_response()
    }
}

// Conversion implementations
impl From<crate::auth::AuthError> for AppError {
    fn from(_: crate::auth::AuthError) -> Self {
        // Provider rejection, zero-result and transport failure all read the
        // same to the caller: there is no local fallback.
        AppError::Unauthenticated("Invalid token".to_string())
    }
}

impl From<crate::object_store::ObjectStoreError> for AppError {
    fn from(err: crate::object_store::ObjectStoreError) -> Self {
        AppError::Upstream(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
