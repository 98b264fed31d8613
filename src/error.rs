//! Error types for the refreshable cache
//!
//! Provides unified error handling using thiserror.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

// == Refresh Error ==
/// Outcome of a refresh source invocation that did not produce data.
///
/// Both an `Err` returned by the source and a panic raised inside it end up
/// here; nothing escapes the guarded call as an unwind.
#[derive(Error, Debug)]
pub enum RefreshError {
    /// The source returned an error
    #[error("refresh source failed: {0:#}")]
    Source(#[from] anyhow::Error),

    /// The source panicked
    #[error("refresh source panicked: {0}")]
    Panicked(String),
}

// == Cache Error Enum ==
/// Unified error type for the cache engine and its HTTP surface.
#[derive(Error, Debug)]
pub enum CacheError {
    /// Key not found in cache
    #[error("Key not found: {0}")]
    NotFound(String),

    /// Invalid request data
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Invalid engine configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Cache is full and eviction failed
    #[error("Cache full: {0}")]
    CacheFull(String),

    /// Every first-load attempt failed and the engine is set to fail fast
    #[error("First load failed after {attempts} attempt(s): {source}")]
    FirstLoadExhausted {
        attempts: u32,
        #[source]
        source: RefreshError,
    },

    /// The engine was built outside of a Tokio runtime
    #[error("No Tokio runtime available to run the refresh scheduler")]
    NoRuntime,

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

// == IntoResponse Implementation ==
impl IntoResponse for CacheError {
    fn into_response(self) -> Response {
        let status = match &self {
            CacheError::NotFound(_) => StatusCode::NOT_FOUND,
            CacheError::InvalidRequest(_) | CacheError::InvalidConfig(_) => {
                StatusCode::BAD_REQUEST
            }
            CacheError::CacheFull(_) | CacheError::FirstLoadExhausted { .. } => {
                StatusCode::SERVICE_UNAVAILABLE
            }
            CacheError::NoRuntime | CacheError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(json!({
            "error": self.to_string()
        }));

        (status, body).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for the cache engine.
pub type Result<T> = std::result::Result<T, CacheError>;
