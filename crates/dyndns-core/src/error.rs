//! Error types for the dynamic DNS updater
//!
//! This module defines all error types used throughout the workspace.

use thiserror::Error;

/// Result type alias for updater operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for the updater
#[derive(Error, Debug)]
pub enum Error {
    /// Connection failure, timeout or unreadable response body
    #[error("Transport error: {0}")]
    Transport(String),

    /// Redirect pointed at a non-TLS location
    #[error("Refusing insecure redirect to {0}")]
    InsecureRedirect(String),

    /// Redirect chain exceeded the hop limit
    #[error("Too many redirects (limit {0})")]
    TooManyRedirects(usize),

    /// Registrar answered with a status >= 400
    #[error("Registrar API error: status {status}: {body}")]
    Api {
        /// HTTP status code
        status: u16,
        /// Response body as returned by the registrar
        body: String,
    },

    /// Neither address family could be discovered
    #[error("No public IP addresses found")]
    NoPublicAddress,

    /// Precondition violation on a registrar write
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Another reconciliation cycle holds the updater state
    #[error("A reconciliation cycle is already in progress")]
    CycleInProgress,

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Create a transport error
    pub fn transport(msg: impl Into<String>) -> Self {
        Self::Transport(msg.into())
    }

    /// Create a registrar API error
    pub fn api(status: u16, body: impl Into<String>) -> Self {
        Self::Api {
            status,
            body: body.into(),
        }
    }

    /// Create an invalid input error
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_error_message_carries_status_and_body() {
        let err = Error::api(403, r#"{"message":"Permission Denied"}"#);
        let msg = err.to_string();
        assert!(msg.contains("403"));
        assert!(msg.contains("Permission Denied"));
    }
}
