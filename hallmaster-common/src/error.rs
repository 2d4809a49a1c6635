//! Common error types for the Hallmaster client
//!
//! Every failure is surfaced to the caller as-is. Nothing in this workspace
//! retries; timeouts belong to the HTTP transport.

use thiserror::Error;

/// Common result type for Hallmaster operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error taxonomy shared by the registry, collator, matcher and transport
#[derive(Error, Debug)]
pub enum Error {
    /// A color key (or other identity) is not known to the registry
    #[error("Not found: {0}")]
    NotFound(String),

    /// A directory response or booking entry is missing required fields
    #[error("Validation error: {0}")]
    Validation(String),

    /// Remote service could not be reached or answered with a failure status
    #[error("Transport error: {message}")]
    Transport {
        /// HTTP status code, when the server answered at all
        status: Option<u16>,
        message: String,
    },

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Transport failure with no HTTP status (connect, timeout, body read)
    pub fn transport(message: impl Into<String>) -> Self {
        Error::Transport {
            status: None,
            message: message.into(),
        }
    }

    /// Transport failure for a non-success HTTP status
    pub fn http_status(status: u16, body: impl Into<String>) -> Self {
        Error::Transport {
            status: Some(status),
            message: format!("HTTP {}: {}", status, body.into()),
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Validation(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_status_message() {
        let err = Error::http_status(503, "Service Unavailable");
        assert_eq!(err.to_string(), "Transport error: HTTP 503: Service Unavailable");
        match err {
            Error::Transport { status, .. } => assert_eq!(status, Some(503)),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_json_errors_are_validation_failures() {
        let err: Error = serde_json::from_str::<u32>("\"x\"").unwrap_err().into();
        assert!(matches!(err, Error::Validation(_)));
    }
}
