//! Error types for productlist-core
//!
//! This module provides the single error type used across the crate:
//! - Transport failures from the network collaborator (connection, HTTP status, decoding)
//! - The distinguished cancellation outcome of a managed task
//! - Configuration validation errors
//!
//! [`Error`] is `Clone` because one managed task outcome is delivered to every
//! caller awaiting that task.

use thiserror::Error;

/// Result type alias for productlist-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for productlist-core
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// Configuration error with context about which setting is invalid
    #[error("configuration error: {message}")]
    Config {
        /// Human-readable error message describing the configuration issue
        message: String,
        /// The configuration key that caused the error (e.g., "page_size")
        key: Option<String>,
    },

    /// Connection-level failure (DNS, refused, reset, timeout)
    #[error("network error: {message}")]
    Network {
        /// URL of the failed request, when known
        url: Option<String>,
        /// Description of the transport failure
        message: String,
        /// Whether the failure was a timeout
        timeout: bool,
    },

    /// Server answered with a non-success HTTP status
    #[error("HTTP {status} from {url}")]
    HttpStatus {
        /// URL of the failed request
        url: String,
        /// HTTP status code returned by the server
        status: u16,
    },

    /// Response body could not be decoded
    #[error("decoding error: {0}")]
    Decode(String),

    /// A URL could not be parsed or joined
    #[error("invalid URL {url}: {reason}")]
    InvalidUrl {
        /// The offending URL text
        url: String,
        /// Parser error message
        reason: String,
    },

    /// The managed task was cancelled before its computation completed
    #[error("task cancelled")]
    Cancelled,

    /// A managed task was awaited without ever being started
    #[error("task has not been started")]
    NotStarted,

    /// Other error
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Returns true for failures raised by the network collaborator
    ///
    /// These are the failures that move the pagination state machine to `Error`.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            Error::Network { .. }
                | Error::HttpStatus { .. }
                | Error::Decode(_)
                | Error::InvalidUrl { .. }
        )
    }

    /// Returns true if this is the cancellation outcome of a managed task
    ///
    /// Cancellation is "nothing to report", never a failure banner.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Error::Cancelled)
    }

    /// Machine-readable error code
    pub fn error_code(&self) -> &'static str {
        match self {
            Error::Config { .. } => "config_error",
            Error::Network { timeout: true, .. } => "timeout",
            Error::Network { .. } => "network_error",
            Error::HttpStatus { .. } => "http_status",
            Error::Decode(_) => "decode_error",
            Error::InvalidUrl { .. } => "invalid_url",
            Error::Cancelled => "cancelled",
            Error::NotStarted => "not_started",
            Error::Other(_) => "other",
        }
    }
}

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        let url = e.url().map(|u| u.to_string());
        if e.is_decode() {
            return Error::Decode(e.to_string());
        }
        if let Some(status) = e.status() {
            return Error::HttpStatus {
                url: url.unwrap_or_default(),
                status: status.as_u16(),
            };
        }
        Error::Network {
            url,
            message: e.to_string(),
            timeout: e.is_timeout(),
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Decode(e.to_string())
    }
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transport_classification() {
        let transport = [
            Error::Network {
                url: None,
                message: "connection refused".into(),
                timeout: false,
            },
            Error::HttpStatus {
                url: "https://example.com/products".into(),
                status: 503,
            },
            Error::Decode("expected value".into()),
            Error::InvalidUrl {
                url: "::".into(),
                reason: "relative URL without a base".into(),
            },
        ];
        for e in &transport {
            assert!(e.is_transport(), "{e} should be a transport error");
            assert!(!e.is_cancelled());
        }

        assert!(!Error::Cancelled.is_transport());
        assert!(Error::Cancelled.is_cancelled());
        assert!(!Error::NotStarted.is_transport());
        assert!(
            !Error::Config {
                message: "bad".into(),
                key: None
            }
            .is_transport()
        );
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(Error::Cancelled.error_code(), "cancelled");
        assert_eq!(
            Error::Network {
                url: None,
                message: "timed out".into(),
                timeout: true,
            }
            .error_code(),
            "timeout"
        );
        assert_eq!(
            Error::HttpStatus {
                url: "u".into(),
                status: 404
            }
            .error_code(),
            "http_status"
        );
    }

    #[test]
    fn test_display_messages() {
        let e = Error::HttpStatus {
            url: "https://dummyjson.com/products".into(),
            status: 500,
        };
        assert_eq!(e.to_string(), "HTTP 500 from https://dummyjson.com/products");
        assert_eq!(Error::Cancelled.to_string(), "task cancelled");
    }

    #[test]
    fn test_serde_json_error_maps_to_decode() {
        let err = serde_json::from_str::<u32>("not json").unwrap_err();
        let e: Error = err.into();
        assert!(matches!(e, Error::Decode(_)));
    }
}
