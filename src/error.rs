//! Crate-level error type.
//!
//! Status evaluation never fails; these errors come from the surrounding
//! plumbing (configuration, cache-backed reads, the booking source).

use crate::cache::CacheError;
use crate::config::ConfigurationError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DormError {
    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigurationError),

    #[error("Cache error: {0}")]
    Cache(#[from] CacheError),

    #[error("Booking source error: {0}")]
    Source(String),
}

impl DormError {
    pub fn source_error<E: std::fmt::Display>(error: E) -> Self {
        Self::Source(error.to_string())
    }
}

pub type Result<T> = std::result::Result<T, DormError>;
