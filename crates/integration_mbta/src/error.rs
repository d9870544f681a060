//! MBTA client error types

use thiserror::Error;

/// Errors that can occur while talking to the MBTA API
#[derive(Debug, Error)]
pub enum MbtaError {
    /// The server answered with a status other than the expected one
    #[error("Unexpected server response: HTTP {status_code}: {body}")]
    UnexpectedServerResponse {
        /// Status code actually returned
        status_code: u16,
        /// Raw response body, kept for diagnostics
        body: String,
    },

    /// The requested entity does not exist
    #[error("Entity not found: {id}")]
    NotFound {
        /// Identifier that was looked up
        id: String,
    },

    /// Connection to the MBTA API failed
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// A successful response body could not be decoded
    #[error("Parse error: {0}")]
    ParseError(String),

    /// The operation did not finish within its deadline
    #[error("Request timed out after {timeout_ms} ms")]
    Timeout {
        /// The deadline that was exceeded, in milliseconds
        timeout_ms: u64,
    },

    /// The caller cancelled the operation
    #[error("Request cancelled")]
    Cancelled,

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigurationError(String),
}

impl MbtaError {
    /// Build a not-found error for the given id
    pub fn not_found(id: impl Into<String>) -> Self {
        Self::NotFound { id: id.into() }
    }

    /// Status code reported by the upstream server, if any
    #[must_use]
    pub const fn status_code(&self) -> Option<u16> {
        match self {
            Self::UnexpectedServerResponse { status_code, .. } => Some(*status_code),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for MbtaError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::ParseError(err.to_string())
        } else {
            Self::ConnectionFailed(err.to_string())
        }
    }
}
