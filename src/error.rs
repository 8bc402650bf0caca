//! Error types for the cache
//!
//! Provides unified error handling using thiserror.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::models::ErrorResponse;

// == Cache Error Enum ==
/// Unified error type for the cache and its HTTP front-end.
///
/// A lookup miss is never an error on its own; only [`get`] turns it into
/// [`CacheError::KeyNotFound`].
///
/// [`get`]: crate::cache::NWaySetAssociativeCache::get
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CacheError {
    /// Key not found in cache
    #[error("Key not found: {0}")]
    KeyNotFound(String),

    /// A caller-supplied argument was rejected
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// An index fell outside the destination
    #[error("Index {index} is out of range for length {len}")]
    OutOfRange { index: usize, len: usize },
}

// == IntoResponse Implementation ==
impl IntoResponse for CacheError {
    fn into_response(self) -> Response {
        let status = match &self {
            CacheError::KeyNotFound(_) => StatusCode::NOT_FOUND,
            CacheError::InvalidArgument(_) | CacheError::OutOfRange { .. } => {
                StatusCode::BAD_REQUEST
            }
        };

        let body = Json(ErrorResponse::new(self.to_string()));

        (status, body).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for the cache.
pub type Result<T> = std::result::Result<T, CacheError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        assert_eq!(
            CacheError::KeyNotFound("\"k\"".to_string()).to_string(),
            "Key not found: \"k\""
        );
        assert_eq!(
            CacheError::OutOfRange { index: 5, len: 4 }.to_string(),
            "Index 5 is out of range for length 4"
        );
    }

    #[test]
    fn test_error_status_codes() {
        let not_found = CacheError::KeyNotFound("k".to_string()).into_response();
        let invalid = CacheError::InvalidArgument("bad".to_string()).into_response();
        let range = CacheError::OutOfRange { index: 1, len: 0 }.into_response();

        assert_eq!(not_found.status(), StatusCode::NOT_FOUND);
        assert_eq!(invalid.status(), StatusCode::BAD_REQUEST);
        assert_eq!(range.status(), StatusCode::BAD_REQUEST);
    }
}
