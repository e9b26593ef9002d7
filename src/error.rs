//! Error types and handling for Solarflex
//!
//! This module defines the error types used throughout the crate,
//! providing consistent error handling and reporting.

use thiserror::Error;

/// Result type alias for Solarflex operations
pub type Result<T> = std::result::Result<T, SolarflexError>;

/// Main error type for Solarflex
#[derive(Debug, Error)]
pub enum SolarflexError {
    /// Configuration-related errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Telemetry-related errors (missing or degenerate samples)
    #[error("Telemetry error: {message}")]
    Telemetry { message: String },

    /// Serialization/deserialization errors
    #[error("Serialization error: {message}")]
    Serialization { message: String },

    /// File I/O errors
    #[error("I/O error: {message}")]
    Io { message: String },

    /// Validation errors
    #[error("Validation error: {field} - {message}")]
    Validation { field: String, message: String },

    /// Generic errors with context
    #[error("Error: {message}")]
    Generic { message: String },
}

impl SolarflexError {
    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        SolarflexError::Config {
            message: message.into(),
        }
    }

    /// Create a new telemetry error
    pub fn telemetry<S: Into<String>>(message: S) -> Self {
        SolarflexError::Telemetry {
            message: message.into(),
        }
    }

    /// Create a new validation error
    pub fn validation<S: Into<String>>(field: S, message: S) -> Self {
        SolarflexError::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create a new I/O error
    pub fn io<S: Into<String>>(message: S) -> Self {
        SolarflexError::Io {
            message: message.into(),
        }
    }

    /// Create a new generic error
    pub fn generic<S: Into<String>>(message: S) -> Self {
        SolarflexError::Generic {
            message: message.into(),
        }
    }
}

impl From<std::io::Error> for SolarflexError {
    fn from(err: std::io::Error) -> Self {
        SolarflexError::io(err.to_string())
    }
}

impl From<serde_yaml::Error> for SolarflexError {
    fn from(err: serde_yaml::Error) -> Self {
        SolarflexError::Serialization {
            message: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for SolarflexError {
    fn from(err: serde_json::Error) -> Self {
        SolarflexError::Serialization {
            message: err.to_string(),
        }
    }
}
