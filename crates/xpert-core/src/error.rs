//! Error types for xpert.

use thiserror::Error;

/// Result type alias using xpert's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for xpert operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Backend persistence call failed or returned a non-success status
    #[error("Storage error: {0}")]
    Storage(String),

    /// Model call failed before a reply was received
    #[error("Inference error: {0}")]
    Inference(String),

    /// Model reply was not valid JSON after unwrapping
    #[error("Parse error: {0}")]
    Parse(String),

    /// Model reply was valid JSON but not the expected shape
    #[error("Validation error: {0}")]
    Validation(String),

    /// Encoding or decoding of a payload failed
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// HTTP/network request failed outside the store and model backends
    #[error("Request error: {0}")]
    Request(String),
}

impl Error {
    /// Whether this error came from malformed or unexpected model output.
    ///
    /// These always degrade to "no usable result" for the owning request.
    pub fn is_model_output(&self) -> bool {
        matches!(self, Error::Parse(_) | Error::Validation(_))
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        Error::Request(e.to_string())
    }
}
