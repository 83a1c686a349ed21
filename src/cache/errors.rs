//! Cache error types

use thiserror::Error;

/// Errors surfaced by cache-backed requests.
///
/// `Clone` so a single settled failure can be handed to every caller waiting
/// on the same de-duplicated request.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CacheError {
    /// The underlying request failed
    #[error("Request failed: {0}")]
    Fetch(String),

    /// The underlying request exceeded its deadline
    #[error("Request timed out: {0}")]
    Timeout(String),

    /// A payload could not be decoded into the expected shape
    #[error("Failed to decode payload: {0}")]
    Decode(String),
}

impl CacheError {
    pub fn fetch<E: std::fmt::Display>(error: E) -> Self {
        Self::Fetch(error.to_string())
    }
}

/// Result type for cache operations
pub type CacheResult<T> = Result<T, CacheError>;
