//! Error types for the relentless client
//!
//! Callers see one of four shapes: a validation error (nothing was sent), a
//! [`RequestFailure`] (terminal status or exhausted retries), a cancellation,
//! or a client setup problem.

use relentless_core::{FailureKind, RequestFailure, RetryError, ValidationError};
use relentless_transport::{HttpResponse, TransportError};
use thiserror::Error;

/// Result type alias for operations that can fail with a relentless error.
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the relentless client.
#[derive(Debug, Error)]
pub enum Error {
    /// The retry policy was rejected before any request was sent.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The call ended on a terminal status or ran out of attempts.
    #[error(transparent)]
    Request(Box<RequestFailure<HttpResponse>>),

    /// The call was cancelled while a request or a backoff wait was pending.
    #[error("request cancelled")]
    Cancelled,

    /// Invalid URL provided.
    #[error("Invalid URL {url:?}: {source}")]
    InvalidUrl {
        /// The rejected URL
        url: String,
        /// Parse failure
        #[source]
        source: url::ParseError,
    },

    /// HTTP client configuration or initialization error.
    #[error("HTTP client error: {0}")]
    HttpClient(#[from] TransportError),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Invalid configuration value.
    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl Error {
    /// The request failure, for terminal and exhausted calls.
    pub fn failure(&self) -> Option<&RequestFailure<HttpResponse>> {
        match self {
            Self::Request(failure) => Some(&**failure),
            _ => None,
        }
    }

    /// Last observed status code, if the call got as far as a response.
    pub fn status_code(&self) -> Option<u16> {
        self.failure().and_then(|f| f.status_code())
    }

    /// Last response, if the call got as far as a response.
    pub fn response(&self) -> Option<&HttpResponse> {
        self.failure().and_then(|f| f.response())
    }

    /// Number of attempts made before the call failed.
    ///
    /// Zero for errors raised before the first attempt.
    pub fn attempts(&self) -> u32 {
        self.failure().map_or(0, |f| f.attempts())
    }

    /// Whether a non-retryable status ended the call.
    pub fn is_terminal(&self) -> bool {
        self.failure().is_some_and(|f| f.kind() == FailureKind::Terminal)
    }

    /// Whether the call ran out of attempts.
    pub fn is_exhausted(&self) -> bool {
        self.failure().is_some_and(|f| f.kind() == FailureKind::Exhausted)
    }

    /// Whether the call was cancelled.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

impl From<RequestFailure<HttpResponse>> for Error {
    fn from(failure: RequestFailure<HttpResponse>) -> Self {
        Self::Request(Box::new(failure))
    }
}

impl From<RetryError<HttpResponse>> for Error {
    fn from(err: RetryError<HttpResponse>) -> Self {
        match err {
            RetryError::Validation(err) => Self::Validation(err),
            RetryError::Failed(failure) => Self::Request(failure),
            RetryError::Cancelled => Self::Cancelled,
        }
    }
}
