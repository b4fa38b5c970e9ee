//! Error types for the dream cache
//!
//! Provides unified error handling using thiserror. Cache misses and empty
//! rate windows are normal states and never surface here.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::models::ErrorResponse;

// == Dream Error Enum ==
/// Unified error type for the dream cache.
#[derive(Error, Debug)]
pub enum DreamError {
    /// Configuration rejected at construction time
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// A quota window is at or above its threshold
    #[error("Rate limited: {0}")]
    RateLimited(String),

    /// The generation collaborator failed to produce a response
    #[error("Generation failed: {0}")]
    Generation(String),

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),
}

// == IntoResponse Implementation ==
impl IntoResponse for DreamError {
    fn into_response(self) -> Response {
        let status = match &self {
            DreamError::InvalidConfig(_) => StatusCode::BAD_REQUEST,
            DreamError::RateLimited(_) => StatusCode::TOO_MANY_REQUESTS,
            // A path that cannot be dreamed up is treated as not found
            DreamError::Generation(_) => StatusCode::NOT_FOUND,
            DreamError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        (status, Json(ErrorResponse::new(self.to_string()))).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for the dream cache.
pub type Result<T> = std::result::Result<T, DreamError>;
