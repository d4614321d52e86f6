//! Error types for the record service
//!
//! Provides unified error handling using thiserror.

use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

use crate::store::StoreError;

// == Service Error Enum ==
/// Request-scoped failure outcomes.
///
/// Every variant is terminal for the request that produced it; nothing is
/// retried internally.
#[derive(Error, Debug)]
pub enum ServiceError {
    /// Missing, empty or unknown API key
    #[error("Invalid or missing API Key")]
    Unauthorized,

    /// Per-identity quota exhausted for the current window
    #[error("Rate limit exceeded, retry in {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    /// Key absent for get/update
    #[error("Key not found: {0}")]
    NotFound(String),

    /// Key already present on create
    #[error("Key already exists: {0}")]
    Conflict(String),

    /// Malformed or incomplete request body
    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// Durable store failure
    #[error("Storage failure: {0}")]
    Storage(String),
}

impl From<StoreError> for ServiceError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(key) => ServiceError::NotFound(key),
            StoreError::AlreadyExists(key) => ServiceError::Conflict(key),
            other => ServiceError::Storage(other.to_string()),
        }
    }
}

// == IntoResponse Implementation ==
impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            ServiceError::Unauthorized => (StatusCode::UNAUTHORIZED, self.to_string()),
            ServiceError::RateLimited { .. } => {
                (StatusCode::TOO_MANY_REQUESTS, "Rate limit exceeded".to_string())
            }
            ServiceError::NotFound(_) => (StatusCode::NOT_FOUND, "Key not found".to_string()),
            ServiceError::Conflict(_) => {
                (StatusCode::BAD_REQUEST, "Key already exists".to_string())
            }
            ServiceError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            ServiceError::Storage(detail) => {
                error!("Storage failure: {}", detail);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal storage error".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": message
        }));

        let mut response = (status, body).into_response();
        if let ServiceError::RateLimited { retry_after_secs } = self {
            response.headers_mut().insert(
                header::RETRY_AFTER,
                HeaderValue::from(retry_after_secs.max(1)),
            );
        }
        response
    }
}

// == Result Type Alias ==
/// Convenience Result type for the record service.
pub type Result<T> = std::result::Result<T, ServiceError>;
