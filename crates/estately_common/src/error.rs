use std::fmt;
use thiserror::Error;

/// The base error type for all Estately errors.
///
/// Each crate extends this by implementing `From<SpecificError> for EstatelyError`.
#[derive(Error, Debug, Clone)]
pub enum EstatelyError {
    /// Error occurred during an HTTP request
    #[error("HTTP request failed: {0}")]
    HttpError(String),

    /// Error occurred while parsing data
    #[error("Failed to parse data: {0}")]
    ParseError(String),

    /// Error occurred due to missing or invalid configuration
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Error occurred during validation
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// The marketplace API answered with `error: true`
    #[error("{0}")]
    ApiError(String),

    /// Error occurred during external service call
    #[error("External service error: {service_name} - {message}")]
    ExternalServiceError {
        service_name: String,
        message: String,
    },

    /// Error occurred due to a conflict (e.g., slot no longer free)
    #[error("Conflict: {0}")]
    ConflictError(String),

    /// Error occurred due to a resource not being found
    #[error("Not found: {0}")]
    NotFoundError(String),

    /// Error occurred due to a timeout
    #[error("Timeout: {0}")]
    TimeoutError(String),

    /// Error occurred due to an internal error
    #[error("Internal error: {0}")]
    InternalError(String),
}

/// A trait for converting errors to HTTP status codes.
pub trait HttpStatusCode {
    /// Returns the HTTP status code for this error.
    fn status_code(&self) -> u16;
}

impl HttpStatusCode for EstatelyError {
    fn status_code(&self) -> u16 {
        match self {
            EstatelyError::HttpError(_) => 502,
            EstatelyError::ParseError(_) => 400,
            EstatelyError::ConfigError(_) => 500,
            EstatelyError::ValidationError(_) => 400,
            EstatelyError::ApiError(_) => 422,
            EstatelyError::ExternalServiceError { .. } => 502,
            EstatelyError::ConflictError(_) => 409,
            EstatelyError::NotFoundError(_) => 404,
            EstatelyError::TimeoutError(_) => 504,
            EstatelyError::InternalError(_) => 500,
        }
    }
}

impl EstatelyError {
    /// Message suitable for showing to an end user.
    ///
    /// Business errors carry the server's own wording; everything else is
    /// replaced by `fallback`.
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            EstatelyError::ApiError(message)
            | EstatelyError::ValidationError(message)
            | EstatelyError::ConflictError(message)
                if !message.trim().is_empty() =>
            {
                message.clone()
            }
            _ => fallback.to_string(),
        }
    }
}

/// A trait for adding context to errors.
pub trait Context<T, E> {
    /// Adds context to an error.
    fn context<C>(self, context: C) -> Result<T, EstatelyError>
    where
        C: fmt::Display + Send + Sync + 'static;

    /// Adds context to an error with a lazy context provider.
    fn with_context<C, F>(self, f: F) -> Result<T, EstatelyError>
    where
        C: fmt::Display + Send + Sync + 'static,
        F: FnOnce() -> C;
}

impl<T, E: std::error::Error + Send + Sync + 'static> Context<T, E> for Result<T, E> {
    fn context<C>(self, context: C) -> Result<T, EstatelyError>
    where
        C: fmt::Display + Send + Sync + 'static,
    {
        self.map_err(|error| EstatelyError::InternalError(format!("{}: {}", context, error)))
    }

    fn with_context<C, F>(self, f: F) -> Result<T, EstatelyError>
    where
        C: fmt::Display + Send + Sync + 'static,
        F: FnOnce() -> C,
    {
        self.map_err(|error| EstatelyError::InternalError(format!("{}: {}", f(), error)))
    }
}

impl From<reqwest::Error> for EstatelyError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            EstatelyError::TimeoutError(err.to_string())
        } else if err.is_decode() {
            EstatelyError::ParseError(err.to_string())
        } else {
            EstatelyError::HttpError(err.to_string())
        }
    }
}

impl From<serde_json::Error> for EstatelyError {
    fn from(err: serde_json::Error) -> Self {
        EstatelyError::ParseError(err.to_string())
    }
}

impl From<std::io::Error> for EstatelyError {
    fn from(err: std::io::Error) -> Self {
        EstatelyError::InternalError(err.to_string())
    }
}

// Utility functions for error handling
pub fn config_error<T: fmt::Display>(message: T) -> EstatelyError {
    EstatelyError::ConfigError(message.to_string())
}

pub fn validation_error<T: fmt::Display>(message: T) -> EstatelyError {
    EstatelyError::ValidationError(message.to_string())
}

pub fn api_error<T: fmt::Display>(message: T) -> EstatelyError {
    EstatelyError::ApiError(message.to_string())
}

pub fn not_found<T: fmt::Display>(message: T) -> EstatelyError {
    EstatelyError::NotFoundError(message.to_string())
}

pub fn conflict<T: fmt::Display>(message: T) -> EstatelyError {
    EstatelyError::ConflictError(message.to_string())
}

pub fn external_service_error<T: fmt::Display>(service_name: &str, message: T) -> EstatelyError {
    EstatelyError::ExternalServiceError {
        service_name: service_name.to_string(),
        message: message.to_string(),
    }
}

pub fn internal_error<T: fmt::Display>(message: T) -> EstatelyError {
    EstatelyError::InternalError(message.to_string())
}
