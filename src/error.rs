//! Error types and handling for the `tripwise` service

use thiserror::Error;

use crate::llm::CapabilityError;
use crate::models::RequestError;

/// Main error type for the `tripwise` service
#[derive(Error, Debug)]
pub enum TripwiseError {
    /// Configuration-related errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Failures talking to the generative capability
    #[error("Capability error: {source}")]
    Capability {
        #[from]
        source: CapabilityError,
    },

    /// Input validation errors
    #[error("Invalid input: {message}")]
    Validation { message: String },

    /// I/O operation errors
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },

    /// General application errors
    #[error("Application error: {message}")]
    General { message: String },
}

impl TripwiseError {
    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a new validation error
    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Create a new general error
    pub fn general<S: Into<String>>(message: S) -> Self {
        Self::General {
            message: message.into(),
        }
    }

    /// Get a user-friendly error message
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            TripwiseError::Config { .. } => {
                "Configuration error. Please check your config file and API keys.".to_string()
            }
            TripwiseError::Capability { .. } => {
                "Unable to reach the plan generation service. Please try again later."
                    .to_string()
            }
            TripwiseError::Validation { message } => {
                format!("Invalid input: {message}")
            }
            TripwiseError::Io { .. } => {
                "File operation failed. Please check file permissions.".to_string()
            }
            TripwiseError::General { message } => message.clone(),
        }
    }
}

impl From<RequestError> for TripwiseError {
    fn from(err: RequestError) -> Self {
        Self::validation(err.to_string())
    }
}
