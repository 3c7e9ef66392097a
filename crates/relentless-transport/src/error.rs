//! Transport error types

use relentless_core::retry::TransportFailure;
use std::fmt;

/// Result type for transport operations
pub type Result<T> = std::result::Result<T, TransportError>;

/// Errors raised below the HTTP layer, before a response is available.
///
/// The retry engine treats every variant as retryable; see
/// [`TransportFailure`].
#[derive(Debug)]
pub enum TransportError {
    /// Connection could not be established (refused, DNS failure, TLS handshake)
    Connection(String),

    /// The attempt did not complete within its timeout
    Timeout,

    /// The request could not be built (malformed URL, invalid header)
    InvalidRequest(String),

    /// HTTP protocol error while sending or reading the response
    Http(String),

    /// I/O error
    Io(std::io::Error),

    /// Serialization error
    Serialization(String),

    /// Generic transport error
    Other(String),
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Connection(msg) => write!(f, "Connection error: {}", msg),
            Self::Timeout => write!(f, "Timeout"),
            Self::InvalidRequest(msg) => write!(f, "Invalid request: {}", msg),
            Self::Http(msg) => write!(f, "HTTP error: {}", msg),
            Self::Io(err) => write!(f, "I/O error: {}", err),
            Self::Serialization(msg) => write!(f, "Serialization error: {}", msg),
            Self::Other(msg) => write!(f, "{}", msg),
        }
    }
}

impl std::error::Error for TransportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl TransportFailure for TransportError {
    fn is_timeout(&self) -> bool {
        match self {
            Self::Timeout => true,
            Self::Io(err) => err.kind() == std::io::ErrorKind::TimedOut,
            _ => false,
        }
    }
}

impl From<std::io::Error> for TransportError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else if err.is_connect() {
            Self::Connection(err.to_string())
        } else if err.is_builder() {
            Self::InvalidRequest(err.to_string())
        } else {
            Self::Http(err.to_string())
        }
    }
}

impl From<serde_json::Error> for TransportError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}
