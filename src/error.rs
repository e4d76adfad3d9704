//! Error types for the metadata cache
//!
//! Provides unified error handling using thiserror.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

// == Cache Error Enum ==
/// Unified error type for the cache, the metadata service and the
/// diagnostics surface.
///
/// The cache itself never reports absence as an error; `NotFound` is only
/// produced by the layers above it.
#[derive(Error, Debug)]
pub enum CacheError {
    /// Configuration rejected at construction time
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// Resident memory of the process could not be sampled
    #[error("Memory probe failed: {0}")]
    MemoryProbe(String),

    /// A background sweeper was requested outside a tokio runtime
    #[error("No tokio runtime available to run the cleanup task")]
    NoRuntime,

    /// Key not present in the requested cache
    #[error("Key not found: {0}")]
    NotFound(String),

    /// Invalid request data
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Metadata fetch behind a cache miss failed
    #[error("Fetch failed: {0}")]
    Fetch(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

// == IntoResponse Implementation ==
impl IntoResponse for CacheError {
    fn into_response(self) -> Response {
        let status = match &self {
            CacheError::NotFound(_) => StatusCode::NOT_FOUND,
            CacheError::InvalidRequest(_) | CacheError::InvalidConfiguration(_) => {
                StatusCode::BAD_REQUEST
            }
            CacheError::Fetch(_) => StatusCode::BAD_GATEWAY,
            CacheError::NoRuntime => StatusCode::SERVICE_UNAVAILABLE,
            CacheError::MemoryProbe(_) | CacheError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        let body = Json(json!({
            "error": self.to_string()
        }));

        (status, body).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for the crate.
pub type Result<T> = std::result::Result<T, CacheError>;
