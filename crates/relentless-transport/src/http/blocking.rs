//! Thread-blocking HTTP transport
//!
//! reqwest's blocking client runs its own internal runtime: construct, use and
//! drop it outside of any async context.

use super::client::HttpTransportConfig;
use super::{collect_headers, header_map};
use crate::error::{Result, TransportError};
use crate::traits::{BlockingTransport, HttpRequest, HttpResponse};
use reqwest::blocking::Client as BlockingClient;

/// Blocking HTTP transport implementation
#[derive(Clone, Debug)]
pub struct BlockingHttpTransport {
    client: BlockingClient,
}

impl BlockingHttpTransport {
    /// Create a new blocking transport with default configuration
    pub fn new() -> Result<Self> {
        Self::with_config(HttpTransportConfig::default())
    }

    /// Create a new blocking transport with custom configuration
    pub fn with_config(config: HttpTransportConfig) -> Result<Self> {
        let client = BlockingClient::builder()
            .connect_timeout(config.connect_timeout)
            .pool_max_idle_per_host(config.pool_max_idle_per_host)
            .user_agent(config.user_agent)
            .default_headers(header_map(&config.default_headers)?)
            // Per-attempt timeouts come from the request.
            .timeout(None)
            .build()
            .map_err(|e| TransportError::Connection(e.to_string()))?;

        Ok(Self { client })
    }

    /// Wrap an already configured reqwest blocking client
    pub fn from_client(client: BlockingClient) -> Self {
        Self { client }
    }
}

impl BlockingTransport for BlockingHttpTransport {
    fn send_http(&self, request: &HttpRequest) -> Result<HttpResponse> {
        let mut req = self
            .client
            .request(request.method.clone(), &request.url)
            .headers(header_map(&request.headers)?);

        if !request.query.is_empty() {
            req = req.query(&request.query);
        }
        if let Some(body) = &request.body {
            req = req.body(body.to_vec());
        }
        if let Some(timeout) = request.timeout {
            req = req.timeout(timeout);
        }

        let response = req.send()?;
        let status = response.status().as_u16();
        let headers = collect_headers(response.headers());
        let body = response.bytes()?;

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}
