//! Per-call request options
//!
//! [`RequestOptions`] carries what a single call adds on top of the client:
//! headers, query parameters, a body, and overrides for any field of the
//! client's retry policy. Everything is copied into the request descriptor
//! once and re-sent unchanged on every attempt.

use crate::error::{Error, Result};
use bytes::Bytes;
use http::Method;
use relentless_core::RetryPolicy;
use relentless_transport::HttpRequest;
use serde::Serialize;
use std::borrow::Cow;
use std::collections::{BTreeSet, HashMap};
use std::time::Duration;

/// Options for a single call.
///
/// # Examples
///
/// ```rust
/// use relentless::RequestOptions;
/// use std::time::Duration;
///
/// let options = RequestOptions::new()
///     .header("accept", "application/json")
///     .query("page", "2")
///     .max_retries(5)
///     .timeout(Duration::from_secs(2));
/// ```
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    headers: HashMap<String, String>,
    query: Vec<(String, String)>,
    body: Option<Bytes>,
    max_retries: Option<i64>,
    backoff_factor: Option<f64>,
    jitter_factor: Option<f64>,
    retryable_statuses: Option<BTreeSet<u16>>,
    timeout: Option<Duration>,
}

impl RequestOptions {
    /// Empty options: no extra headers, no body, the client's policy.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a header.
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }

    /// Append a query parameter.
    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    /// Set a raw body.
    pub fn body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Set a text body.
    pub fn text(self, text: impl Into<String>) -> Self {
        self.body(text.into())
    }

    /// Serialize `value` as a JSON body and set `Content-Type`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Serialization`] if `value` cannot be serialized.
    pub fn json<T: Serialize + ?Sized>(self, value: &T) -> Result<Self> {
        let body = serde_json::to_vec(value)?;
        Ok(self.header("content-type", "application/json").body(body))
    }

    /// Override the number of retries.
    pub fn max_retries(mut self, max_retries: i64) -> Self {
        self.max_retries = Some(max_retries);
        self
    }

    /// Override the backoff factor.
    pub fn backoff_factor(mut self, backoff_factor: f64) -> Self {
        self.backoff_factor = Some(backoff_factor);
        self
    }

    /// Override the jitter factor.
    pub fn jitter_factor(mut self, jitter_factor: f64) -> Self {
        self.jitter_factor = Some(jitter_factor);
        self
    }

    /// Override the retryable status codes.
    pub fn retryable_statuses(mut self, statuses: impl IntoIterator<Item = u16>) -> Self {
        self.retryable_statuses = Some(statuses.into_iter().collect());
        self
    }

    /// Override the per-attempt timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Override every policy field at once.
    pub fn policy(self, policy: RetryPolicy) -> Self {
        self.max_retries(policy.max_retries)
            .backoff_factor(policy.backoff_factor)
            .jitter_factor(policy.jitter_factor)
            .retryable_statuses(policy.retryable_statuses)
            .timeout(policy.timeout)
    }

    fn has_policy_overrides(&self) -> bool {
        self.max_retries.is_some()
            || self.backoff_factor.is_some()
            || self.jitter_factor.is_some()
            || self.retryable_statuses.is_some()
            || self.timeout.is_some()
    }

    /// The policy for this call: `base` with the overrides applied.
    pub(crate) fn resolve_policy<'a>(&self, base: &'a RetryPolicy) -> Cow<'a, RetryPolicy> {
        if !self.has_policy_overrides() {
            return Cow::Borrowed(base);
        }

        let mut policy = base.clone();
        if let Some(max_retries) = self.max_retries {
            policy.max_retries = max_retries;
        }
        if let Some(backoff_factor) = self.backoff_factor {
            policy.backoff_factor = backoff_factor;
        }
        if let Some(jitter_factor) = self.jitter_factor {
            policy.jitter_factor = jitter_factor;
        }
        if let Some(statuses) = &self.retryable_statuses {
            policy.retryable_statuses = statuses.clone();
        }
        if let Some(timeout) = self.timeout {
            policy.timeout = timeout;
        }
        Cow::Owned(policy)
    }

    /// Build the request descriptor sent on every attempt.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidUrl`] if `url` is not an absolute URL.
    pub(crate) fn into_request(
        self,
        method: Method,
        url: &str,
        timeout: Duration,
    ) -> Result<HttpRequest> {
        url::Url::parse(url).map_err(|source| Error::InvalidUrl {
            url: url.to_string(),
            source,
        })?;

        Ok(HttpRequest {
            method,
            url: url.to_string(),
            headers: self.headers,
            query: self.query,
            body: self.body,
            timeout: Some(timeout),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_no_overrides_borrows_base() {
        let base = RetryPolicy::default();
        let options = RequestOptions::new().header("x", "y");
        assert!(matches!(options.resolve_policy(&base), Cow::Borrowed(_)));
    }

    #[test]
    fn test_overrides_apply_field_by_field() {
        let base = RetryPolicy::builder().max_retries(1).backoff_factor(2.0).build();
        let options = RequestOptions::new()
            .max_retries(4)
            .retryable_statuses([418])
            .timeout(Duration::from_secs(1));

        let policy = options.resolve_policy(&base);
        assert_eq!(policy.max_retries, 4);
        assert_eq!(policy.backoff_factor, 2.0);
        assert_eq!(policy.retryable_statuses, BTreeSet::from([418]));
        assert_eq!(policy.timeout, Duration::from_secs(1));
    }

    #[test]
    fn test_into_request_carries_pass_through() {
        let request = RequestOptions::new()
            .header("x-trace", "abc")
            .query("q", "rust")
            .json(&serde_json::json!({"a": 1}))
            .unwrap()
            .into_request(Method::POST, "https://example.com/search", Duration::from_secs(3))
            .unwrap();

        assert_eq!(request.method, Method::POST);
        assert_eq!(request.url, "https://example.com/search");
        assert_eq!(request.headers.get("x-trace").map(String::as_str), Some("abc"));
        assert_eq!(
            request.headers.get("content-type").map(String::as_str),
            Some("application/json")
        );
        assert_eq!(request.query, vec![("q".to_string(), "rust".to_string())]);
        assert_eq!(request.body.as_deref(), Some(br#"{"a":1}"#.as_slice()));
        assert_eq!(request.timeout, Some(Duration::from_secs(3)));
    }

    #[test]
    fn test_relative_url_is_rejected() {
        let err = RequestOptions::new()
            .into_request(Method::GET, "/relative/path", Duration::from_secs(1))
            .unwrap_err();
        assert!(matches!(err, Error::InvalidUrl { ref url, .. } if url == "/relative/path"));
    }
}
