//! Structured logging for calls made through the clients
//!
//! Per-attempt events (attempt started, retryable failure, wait) come from the
//! retry engine itself. This module adds one event at the start and one at
//! the end of every call, carrying the totals.

use crate::error::Error;
use relentless_transport::{HttpRequest, HttpResponse};
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// HTTP request metadata for structured logging
#[derive(Debug, Clone)]
pub struct RequestMetadata {
    /// HTTP method (GET, POST, etc.)
    pub method: String,
    /// Request URL
    pub url: String,
    /// Request body size in bytes (optional)
    pub body_size: Option<usize>,
}

impl RequestMetadata {
    /// Create new request metadata
    pub fn new(method: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            url: url.into(),
            body_size: None,
        }
    }

    /// Metadata describing `request`
    pub fn from_request(request: &HttpRequest) -> Self {
        let metadata = Self::new(request.method.as_str(), request.url.as_str());
        match &request.body {
            Some(body) => metadata.with_body_size(body.len()),
            None => metadata,
        }
    }

    /// Set the request body size
    pub fn with_body_size(mut self, size: usize) -> Self {
        self.body_size = Some(size);
        self
    }

    /// Log request being sent
    pub fn log_request(&self, max_retries: i64) {
        debug!(
            method = %self.method,
            url = %self.url,
            body_size = self.body_size,
            max_retries,
            "Starting HTTP call"
        );
    }

    /// Log a call that ended without a usable response.
    ///
    /// Request failures are already reported at `warn` by the retry loop.
    pub fn log_failure(&self, error: &Error, elapsed: Duration) {
        debug!(
            method = %self.method,
            url = %self.url,
            status = error.status_code(),
            attempts = error.attempts(),
            elapsed_ms = elapsed.as_millis(),
            error = %error,
            "HTTP call failed"
        );
    }
}

/// HTTP response metadata for structured logging
#[derive(Debug, Clone)]
pub struct ResponseMetadata {
    /// HTTP status code
    pub status: u16,
    /// Response body size in bytes (optional)
    pub body_size: Option<usize>,
    /// Time elapsed for the whole call, waits included
    pub elapsed: Duration,
    /// Number of retries taken (if any)
    pub retries: u32,
}

impl ResponseMetadata {
    /// Create new response metadata
    pub fn new(status: u16, elapsed: Duration) -> Self {
        Self {
            status,
            body_size: None,
            elapsed,
            retries: 0,
        }
    }

    /// Metadata describing `response`
    pub fn from_response(response: &HttpResponse, elapsed: Duration) -> Self {
        Self::new(response.status, elapsed).with_body_size(response.body.len())
    }

    /// Set the response body size
    pub fn with_body_size(mut self, size: usize) -> Self {
        self.body_size = Some(size);
        self
    }

    /// Set the number of retries
    pub fn with_retries(mut self, retries: u32) -> Self {
        self.retries = retries;
        self
    }

    /// Log successful response
    pub fn log_success(&self, request: &RequestMetadata) {
        info!(
            method = %request.method,
            url = %request.url,
            status = self.status,
            elapsed_ms = self.elapsed.as_millis(),
            body_size = self.body_size,
            retries = self.retries,
            "HTTP call succeeded"
        );
    }
}

/// Timer for measuring call duration
#[derive(Debug, Clone, Copy)]
pub struct RequestTimer {
    start: Instant,
}

impl RequestTimer {
    /// Start a new timer
    pub fn start() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    /// Get elapsed duration
    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }
}

/// Log the end of a call: its status and retry count, or why it failed.
pub fn log_outcome(
    request: &RequestMetadata,
    result: &Result<HttpResponse, Error>,
    timer: RequestTimer,
    retries: u32,
) {
    match result {
        Ok(response) => ResponseMetadata::from_response(response, timer.elapsed())
            .with_retries(retries)
            .log_success(request),
        Err(err) => request.log_failure(err, timer.elapsed()),
    }
}

/// Install a `tracing` subscriber that prints to stderr.
///
/// Filtering follows `RUST_LOG` and defaults to `info`. Returns `false` if a
/// global subscriber was already installed.
#[cfg(feature = "trace")]
pub fn init_tracing() -> bool {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .is_ok()
}
