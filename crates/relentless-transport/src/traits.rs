//! Request and response descriptors and the transport traits
//!
//! A transport performs exactly one HTTP exchange per call. Retrying,
//! classification and backoff live above it, in the retry controllers.

use crate::error::{Result, TransportError};
use async_trait::async_trait;
use bytes::Bytes;
use http::Method;
use relentless_core::retry::ResponseStatus;
use serde::Serialize;
use std::collections::HashMap;
use std::time::Duration;

/// HTTP request descriptor
///
/// Built once per call and re-sent unchanged on every attempt, so the body is
/// held as [`Bytes`] and cloned cheaply.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    /// HTTP method (GET, POST, etc.)
    pub method: Method,

    /// Request URL
    pub url: String,

    /// Request headers
    pub headers: HashMap<String, String>,

    /// Query parameters appended to the URL
    pub query: Vec<(String, String)>,

    /// Request body (optional)
    pub body: Option<Bytes>,

    /// Per-attempt timeout; `None` leaves the transport's default in place
    pub timeout: Option<Duration>,
}

impl HttpRequest {
    /// Create a new HTTP request
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            headers: HashMap::new(),
            query: Vec::new(),
            body: None,
            timeout: None,
        }
    }

    /// Add a header to the request
    pub fn with_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }

    /// Append a query parameter
    pub fn with_query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    /// Set the request body
    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Set the request body from string
    pub fn with_text_body(mut self, text: impl Into<String>) -> Self {
        self.body = Some(Bytes::from(text.into()));
        self
    }

    /// Serialize `value` as the JSON body and set `Content-Type`
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::Serialization`] if `value` cannot be serialized.
    pub fn with_json<T: Serialize + ?Sized>(self, value: &T) -> Result<Self> {
        let body = serde_json::to_vec(value)?;
        Ok(self
            .with_header("content-type", "application/json")
            .with_body(body))
    }

    /// Set the per-attempt timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

/// HTTP response
///
/// Represents an HTTP response received from the server.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    /// HTTP status code
    pub status: u16,

    /// Response headers
    pub headers: HashMap<String, String>,

    /// Response body
    pub body: Bytes,
}

impl HttpResponse {
    /// Create a new HTTP response
    pub fn new(status: u16, headers: HashMap<String, String>, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            headers,
            body: body.into(),
        }
    }

    /// Check if response is successful (2xx)
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Check if response is an error (4xx or 5xx)
    pub fn is_error(&self) -> bool {
        self.status >= 400
    }

    /// Get the response body as a string
    pub fn text(&self) -> std::result::Result<String, std::string::FromUtf8Error> {
        String::from_utf8(self.body.to_vec())
    }

    /// Parse response body as JSON
    ///
    /// # Errors
    ///
    /// Returns an error if the response body cannot be parsed as valid JSON
    pub fn json<T: serde::de::DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_slice(&self.body).map_err(TransportError::from)
    }

    /// Get a header value by name (case-insensitive)
    pub fn get_header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

impl ResponseStatus for HttpResponse {
    fn status_code(&self) -> u16 {
        self.status
    }

    fn header(&self, name: &str) -> Option<&str> {
        self.get_header(name)
    }
}

/// Performs one HTTP exchange, suspending while waiting on the network.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send an HTTP request and receive a response
    ///
    /// Any status code is a successful exchange; only failures below the
    /// HTTP layer are errors.
    async fn send_http(&self, request: &HttpRequest) -> Result<HttpResponse>;
}

/// Performs one HTTP exchange, blocking the calling thread.
pub trait BlockingTransport: Send + Sync {
    /// Send an HTTP request and receive a response
    fn send_http(&self, request: &HttpRequest) -> Result<HttpResponse>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use relentless_core::retry::RetryAfter;
    use rstest::rstest;

    #[test]
    fn test_request_builder() {
        let request = HttpRequest::new(Method::GET, "https://example.com/items")
            .with_header("Authorization", "Bearer token123")
            .with_query("page", "2")
            .with_query("tag", "a")
            .with_timeout(Duration::from_secs(3));

        assert_eq!(request.method, Method::GET);
        assert_eq!(request.headers.get("Authorization").map(String::as_str), Some("Bearer token123"));
        assert_eq!(
            request.query,
            vec![
                ("page".to_string(), "2".to_string()),
                ("tag".to_string(), "a".to_string())
            ]
        );
        assert_eq!(request.timeout, Some(Duration::from_secs(3)));
        assert!(request.body.is_none());
    }

    #[test]
    fn test_request_json_body() {
        let request = HttpRequest::new(Method::POST, "https://example.com")
            .with_json(&serde_json::json!({"name": "widget"}))
            .unwrap();

        assert_eq!(
            request.headers.get("content-type").map(String::as_str),
            Some("application/json")
        );
        assert_eq!(request.body.as_deref(), Some(br#"{"name":"widget"}"#.as_slice()));
    }

    #[test]
    fn test_response_helpers() {
        let mut headers = HashMap::new();
        headers.insert("Retry-After".to_string(), "7".to_string());
        let response = HttpResponse::new(429, headers, r#"{"error":"slow down"}"#);

        assert!(response.is_error());
        assert!(!response.is_success());
        assert_eq!(response.get_header("retry-after"), Some("7"));
        assert_eq!(response.status_code(), 429);
        assert_eq!(response.retry_after(), Some(RetryAfter::Delay(Duration::from_secs(7))));

        let body: serde_json::Value = response.json().unwrap();
        assert_eq!(body["error"], "slow down");
    }

    #[rstest]
    #[case(200, true, false)]
    #[case(204, true, false)]
    #[case(304, false, false)]
    #[case(404, false, true)]
    #[case(503, false, true)]
    fn test_status_predicates(#[case] status: u16, #[case] success: bool, #[case] error: bool) {
        let response = HttpResponse::new(status, HashMap::new(), "");
        assert_eq!(response.is_success(), success);
        assert_eq!(response.is_error(), error);
    }

    #[test]
    fn test_response_invalid_json() {
        let response = HttpResponse::new(200, HashMap::new(), "not json");
        assert!(matches!(
            response.json::<serde_json::Value>(),
            Err(TransportError::Serialization(_))
        ));
        assert_eq!(response.text().unwrap(), "not json");
    }
}
