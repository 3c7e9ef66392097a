//! Error taxonomy for retried calls.
//!
//! Three failure shapes reach the caller and must stay distinguishable:
//!
//! - [`ValidationError`]: the policy was rejected before any network activity.
//! - [`RequestFailure`]: the call ended in a terminal status or ran out of
//!   attempts; [`RequestFailure::kind`] tells which.
//! - [`RetryError::Cancelled`]: the caller cancelled the call.
//!
//! Intermediate retryable failures are never surfaced on their own; only the
//! one present when attempts run out becomes part of a [`RequestFailure`].

use std::error::Error as StdError;
use std::fmt;
use std::time::Duration;
use thiserror::Error;

/// A policy invariant was violated at the call boundary.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    /// `max_retries` was negative.
    #[error("max_retries must be >= 0, got {0}")]
    NegativeMaxRetries(i64),

    /// `max_retries` exceeded the supported attempt counter.
    #[error("max_retries must be <= {max}, got {0}", max = u32::MAX)]
    MaxRetriesTooLarge(i64),

    /// `backoff_factor` was negative or not a finite number.
    #[error("backoff_factor must be >= 0, got {0}")]
    InvalidBackoffFactor(f64),

    /// `jitter_factor` was negative or not a finite number.
    #[error("jitter_factor must be >= 0, got {0}")]
    InvalidJitterFactor(f64),

    /// The per-attempt timeout was zero.
    #[error("timeout must be > 0, got {0:?}")]
    NonPositiveTimeout(Duration),
}

/// Why a call ended in a [`RequestFailure`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// A response outside the retryable set ended the call on the spot.
    Terminal,

    /// The last allowed attempt still failed with a retryable outcome.
    Exhausted,
}

/// The single caller-visible failure of a retried call.
///
/// Built exactly once per call, at the moment a terminal response arrives or
/// the attempts run out. `status_code` and `response` are `None` when the
/// final failure was a network-level error, in which case that error is
/// available through [`std::error::Error::source`].
pub struct RequestFailure<R> {
    kind: FailureKind,
    method: String,
    url: String,
    status_code: Option<u16>,
    response: Option<R>,
    attempts: u32,
    message: String,
    source: Option<Box<dyn StdError + Send + Sync>>,
}

impl<R> RequestFailure<R> {
    /// A response with a non-retryable status.
    pub fn terminal(
        method: impl Into<String>,
        url: impl Into<String>,
        status_code: u16,
        response: R,
        attempts: u32,
    ) -> Self {
        let method = method.into();
        let url = url.into();
        let message = format!("{method} request to {url} failed with status {status_code}");
        Self {
            kind: FailureKind::Terminal,
            method,
            url,
            status_code: Some(status_code),
            response: Some(response),
            attempts,
            message,
            source: None,
        }
    }

    /// The last attempt returned a retryable status.
    pub fn exhausted_with_status(
        method: impl Into<String>,
        url: impl Into<String>,
        status_code: u16,
        response: R,
        attempts: u32,
    ) -> Self {
        let method = method.into();
        let url = url.into();
        let message = format!(
            "{method} request to {url} failed with status {status_code} after {attempts} attempts"
        );
        Self {
            kind: FailureKind::Exhausted,
            method,
            url,
            status_code: Some(status_code),
            response: Some(response),
            attempts,
            message,
            source: None,
        }
    }

    /// The last attempt failed below HTTP (connection, DNS, timeout).
    ///
    /// `timed_out` selects the timeout wording of the summary.
    pub fn exhausted_with_error(
        method: impl Into<String>,
        url: impl Into<String>,
        error: Box<dyn StdError + Send + Sync>,
        timed_out: bool,
        attempts: u32,
    ) -> Self {
        let method = method.into();
        let url = url.into();
        let message = if timed_out {
            format!("{method} request to {url} timed out ({attempts} attempts)")
        } else {
            format!("{method} request to {url} failed after {attempts} attempts: {error}")
        };
        Self {
            kind: FailureKind::Exhausted,
            method,
            url,
            status_code: None,
            response: None,
            attempts,
            message,
            source: Some(error),
        }
    }

    /// Terminal status or exhausted retries.
    pub fn kind(&self) -> FailureKind {
        self.kind
    }

    /// Whether the call was cut short by a non-retryable status.
    pub fn is_terminal(&self) -> bool {
        self.kind == FailureKind::Terminal
    }

    /// HTTP method of the failed call.
    pub fn method(&self) -> &str {
        &self.method
    }

    /// Target URL of the failed call.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Last observed status code, `None` for network-level failures.
    pub fn status_code(&self) -> Option<u16> {
        self.status_code
    }

    /// Last observed response, `None` for network-level failures.
    pub fn response(&self) -> Option<&R> {
        self.response.as_ref()
    }

    /// Take ownership of the last observed response.
    pub fn into_response(self) -> Option<R> {
        self.response
    }

    /// Number of transport invocations made before giving up.
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    /// Human-readable summary.
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl<R> fmt::Debug for RequestFailure<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestFailure")
            .field("kind", &self.kind)
            .field("method", &self.method)
            .field("url", &self.url)
            .field("status_code", &self.status_code)
            .field("attempts", &self.attempts)
            .field("message", &self.message)
            .field("source", &self.source)
            .finish_non_exhaustive()
    }
}

impl<R> fmt::Display for RequestFailure<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl<R> StdError for RequestFailure<R> {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.source
            .as_deref()
            .map(|err| err as &(dyn StdError + 'static))
    }
}

/// Error returned by the retry controllers.
pub enum RetryError<R> {
    /// The policy was rejected before the first attempt.
    Validation(ValidationError),

    /// The call failed with a terminal status or exhausted its attempts.
    Failed(Box<RequestFailure<R>>),

    /// The caller cancelled the call while a request or a backoff wait was in flight.
    Cancelled,
}

impl<R> RetryError<R> {
    /// The request failure, if this is one.
    pub fn as_failure(&self) -> Option<&RequestFailure<R>> {
        match self {
            Self::Failed(failure) => Some(&**failure),
            _ => None,
        }
    }
}

impl<R> From<ValidationError> for RetryError<R> {
    fn from(err: ValidationError) -> Self {
        Self::Validation(err)
    }
}

impl<R> From<RequestFailure<R>> for RetryError<R> {
    fn from(failure: RequestFailure<R>) -> Self {
        Self::Failed(Box::new(failure))
    }
}

impl<R> fmt::Debug for RetryError<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Validation(err) => f.debug_tuple("Validation").field(err).finish(),
            Self::Failed(failure) => f.debug_tuple("Failed").field(failure).finish(),
            Self::Cancelled => f.write_str("Cancelled"),
        }
    }
}

impl<R> fmt::Display for RetryError<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "Invalid retry policy: {err}"),
            Self::Failed(failure) => write!(f, "{failure}"),
            Self::Cancelled => f.write_str("Request cancelled"),
        }
    }
}

impl<R> StdError for RetryError<R> {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Failed(failure) => failure.source(),
            Self::Cancelled => None,
        }
    }
}
