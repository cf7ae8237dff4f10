// --- File: crates/gastify_common/src/error.rs ---
use std::fmt;
use thiserror::Error;

/// The base error type shared across all Gastify crates.
///
/// Feature crates keep their own domain error enums and convert into this
/// type at the HTTP boundary, where `HttpStatusCode` supplies the status.
#[derive(Error, Debug)]
pub enum GastifyError {
    /// Error occurred during an HTTP request
    #[error("HTTP request failed: {0}")]
    HttpError(String),

    /// Error occurred while parsing data
    #[error("Failed to parse data: {0}")]
    ParseError(String),

    /// Error occurred due to missing or invalid configuration
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Error occurred during authentication or authorization
    #[error("Authentication error: {0}")]
    AuthError(String),

    /// Error occurred during validation
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Error occurred during external service call
    #[error("External service error: {service_name} - {message}")]
    ExternalServiceError {
        service_name: String,
        message: String,
    },

    /// Error occurred due to a conflict (e.g., capacity exhausted)
    #[error("Conflict: {0}")]
    ConflictError(String),

    /// Error occurred due to a resource not being found
    #[error("Not found: {0}")]
    NotFoundError(String),

    /// Error occurred due to an internal error
    #[error("Internal error: {0}")]
    InternalError(String),
}

/// A trait for converting errors to HTTP status codes.
pub trait HttpStatusCode {
    /// Returns the HTTP status code for this error.
    fn status_code(&self) -> u16;
}

impl HttpStatusCode for GastifyError {
    fn status_code(&self) -> u16 {
        match self {
            GastifyError::HttpError(_) => 500,
            GastifyError::ParseError(_) => 400,
            GastifyError::ConfigError(_) => 500,
            GastifyError::AuthError(_) => 401,
            GastifyError::ValidationError(_) => 400,
            GastifyError::ExternalServiceError { .. } => 502,
            GastifyError::ConflictError(_) => 409,
            GastifyError::NotFoundError(_) => 404,
            GastifyError::InternalError(_) => 500,
        }
    }
}

// Common error conversions
impl From<reqwest::Error> for GastifyError {
    fn from(err: reqwest::Error) -> Self {
        GastifyError::HttpError(err.to_string())
    }
}

impl From<serde_json::Error> for GastifyError {
    fn from(err: serde_json::Error) -> Self {
        GastifyError::ParseError(err.to_string())
    }
}

// Utility functions for error handling
pub fn config_error<T: fmt::Display>(message: T) -> GastifyError {
    GastifyError::ConfigError(message.to_string())
}

pub fn validation_error<T: fmt::Display>(message: T) -> GastifyError {
    GastifyError::ValidationError(message.to_string())
}

pub fn auth_error<T: fmt::Display>(message: T) -> GastifyError {
    GastifyError::AuthError(message.to_string())
}

pub fn conflict<T: fmt::Display>(message: T) -> GastifyError {
    GastifyError::ConflictError(message.to_string())
}

pub fn external_service_error<T: fmt::Display>(service_name: &str, message: T) -> GastifyError {
    GastifyError::ExternalServiceError {
        service_name: service_name.to_string(),
        message: message.to_string(),
    }
}

pub fn internal_error<T: fmt::Display>(message: T) -> GastifyError {
    GastifyError::InternalError(message.to_string())
}
