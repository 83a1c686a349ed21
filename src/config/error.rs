//! Configuration Error Types
//!
//! Error handling for configuration loading and validation, with messages that
//! name the offending field.

use thiserror::Error;

/// Configuration-related errors with detailed context
#[derive(Debug, Error)]
pub enum ConfigurationError {
    /// Layered sources could not be read or merged
    #[error("Failed to load configuration from {source_description}: {error}")]
    LoadError {
        source_description: String,
        error: String,
    },

    /// Merged configuration did not match the expected shape
    #[error("Failed to deserialize configuration: {0}")]
    DeserializeError(String),

    /// Invalid configuration value
    #[error("Invalid value '{value}' for field '{field}': {context}")]
    InvalidValue {
        field: String,
        value: String,
        context: String,
    },
}

impl ConfigurationError {
    pub fn load_error<S: Into<String>, E: std::fmt::Display>(source_description: S, error: E) -> Self {
        Self::LoadError {
            source_description: source_description.into(),
            error: error.to_string(),
        }
    }

    pub fn invalid_value<F: Into<String>, V: Into<String>, C: Into<String>>(
        field: F,
        value: V,
        context: C,
    ) -> Self {
        Self::InvalidValue {
            field: field.into(),
            value: value.into(),
            context: context.into(),
        }
    }
}

impl From<config::ConfigError> for ConfigurationError {
    fn from(error: config::ConfigError) -> Self {
        Self::DeserializeError(error.to_string())
    }
}

pub type ConfigResult<T> = Result<T, ConfigurationError>;
