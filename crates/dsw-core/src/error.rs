//! Error types for the gateway core and adapters.

use thiserror::Error;

/// Main error type for upstream calls, configuration and tool mapping.
#[derive(Error, Debug)]
pub enum Error {
    /// HTTP request failed before a response arrived
    #[error("HTTP error: {0}")]
    Http(String),

    /// Upstream did not answer within the configured timeout
    #[error("Request timed out after {0} ms")]
    Timeout(u64),

    /// Authentication failed (401/403 from upstream)
    #[error("Authentication error: {0}")]
    Auth(String),

    /// Upstream resource does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// API returned an error
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Upstream answered with something we could not interpret,
    /// or tool arguments could not be mapped onto a request
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// Serialization/deserialization failed
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Generic error
    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

impl Error {
    /// Map an upstream HTTP status and message to an error variant.
    pub fn from_status(status: u16, message: String) -> Self {
        match status {
            401 | 403 => Error::Auth(message),
            404 => Error::NotFound(message),
            _ => Error::Api { status, message },
        }
    }

    /// Message reported to callers in a `{success: false, error}` result.
    ///
    /// Upstream messages are passed through verbatim; everything else uses
    /// the display form.
    pub fn upstream_message(&self) -> String {
        match self {
            Error::Auth(message) | Error::NotFound(message) | Error::Api { message, .. }
                if !message.is_empty() =>
            {
                message.clone()
            }
            other => other.to_string(),
        }
    }
}

/// Result type alias for gateway operations.
pub type Result<T> = std::result::Result<T, Error>;
