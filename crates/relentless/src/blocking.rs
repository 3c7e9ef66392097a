//! Blocking client: the same calls as [`Client`](crate::Client), waiting on
//! the calling thread.
//!
//! The built-in transport uses reqwest's blocking client, which must not be
//! created or used from within an async runtime. Inside async code, use the
//! async client or move the call to `tokio::task::spawn_blocking`.

use crate::config::ClientConfig;
use crate::error::Result;
use crate::observability::{RequestMetadata, RequestTimer, log_outcome};
use crate::options::RequestOptions;
use http::Method;
use relentless_core::RetryPolicy;
use relentless_core::retry::BlockingController;
use relentless_transport::{BlockingHttpTransport, BlockingTransport, HttpResponse};
use std::fmt;
use std::sync::Arc;

/// Client whose calls block the calling thread, backoff waits included.
///
/// # Example
///
/// ```rust,no_run
/// use relentless::RequestOptions;
/// use relentless::blocking::BlockingClient;
///
/// # fn example() -> relentless::Result<()> {
/// let client = BlockingClient::new()?;
/// let response = client.get("https://example.com/health", RequestOptions::new())?;
/// println!("{}", response.status);
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct BlockingClient {
    transport: Arc<dyn BlockingTransport>,
    policy: RetryPolicy,
    controller: BlockingController,
}

impl BlockingClient {
    /// Create a client with the default configuration and its own transport.
    ///
    /// # Errors
    ///
    /// Returns [`Error::HttpClient`](crate::Error::HttpClient) if the HTTP
    /// client cannot be built.
    pub fn new() -> Result<Self> {
        Self::from_config(ClientConfig::default())
    }

    /// Create a client from a configuration object.
    ///
    /// # Errors
    ///
    /// Returns [`Error::HttpClient`](crate::Error::HttpClient) if the HTTP
    /// client cannot be built.
    pub fn from_config(config: ClientConfig) -> Result<Self> {
        let transport = BlockingHttpTransport::with_config(config.transport_config())?;
        Ok(Self {
            transport: Arc::new(transport),
            policy: config.policy,
            controller: BlockingController::new(),
        })
    }

    /// Create a client configured from `RELENTLESS_*` environment variables.
    ///
    /// # Errors
    ///
    /// See [`ClientConfig::from_env`] and [`BlockingClient::from_config`].
    #[cfg(feature = "env")]
    pub fn from_env() -> Result<Self> {
        Self::from_config(ClientConfig::from_env()?)
    }

    /// Create a client over a caller-supplied transport, with the default policy.
    pub fn with_transport(transport: Arc<dyn BlockingTransport>) -> Self {
        Self {
            transport,
            policy: RetryPolicy::default(),
            controller: BlockingController::new(),
        }
    }

    /// Replace the default policy for calls made through this client.
    pub fn with_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Default policy for calls made through this client.
    pub fn retry_policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Send a GET request.
    pub fn get(&self, url: &str, options: RequestOptions) -> Result<HttpResponse> {
        self.request(Method::GET, url, options)
    }

    /// Send a POST request.
    pub fn post(&self, url: &str, options: RequestOptions) -> Result<HttpResponse> {
        self.request(Method::POST, url, options)
    }

    /// Send a PUT request.
    pub fn put(&self, url: &str, options: RequestOptions) -> Result<HttpResponse> {
        self.request(Method::PUT, url, options)
    }

    /// Send a DELETE request.
    pub fn delete(&self, url: &str, options: RequestOptions) -> Result<HttpResponse> {
        self.request(Method::DELETE, url, options)
    }

    /// Send a PATCH request.
    pub fn patch(&self, url: &str, options: RequestOptions) -> Result<HttpResponse> {
        self.request(Method::PATCH, url, options)
    }

    /// Send a HEAD request.
    pub fn head(&self, url: &str, options: RequestOptions) -> Result<HttpResponse> {
        self.request(Method::HEAD, url, options)
    }

    /// Send an OPTIONS request.
    pub fn options(&self, url: &str, options: RequestOptions) -> Result<HttpResponse> {
        self.request(Method::OPTIONS, url, options)
    }

    /// Send a request with any method, retrying per the resolved policy.
    ///
    /// # Errors
    ///
    /// Same as [`Client::request`](crate::Client::request), minus cancellation.
    pub fn request(
        &self,
        method: Method,
        url: &str,
        options: RequestOptions,
    ) -> Result<HttpResponse> {
        let policy = options.resolve_policy(&self.policy);
        policy.validate()?;
        let request = options.into_request(method, url, policy.timeout)?;

        let metadata = RequestMetadata::from_request(&request);
        metadata.log_request(policy.max_retries);
        let timer = RequestTimer::start();

        let mut retries = 0;
        let result = self
            .controller
            .execute(&policy, request.method.as_str(), &request.url, |attempt| {
                retries = attempt.index();
                self.transport.send_http(&request)
            })
            .map_err(Into::into);

        log_outcome(&metadata, &result, timer, retries);
        result
    }
}

impl fmt::Debug for BlockingClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BlockingClient")
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}

/// Send a GET request with a one-off blocking client.
pub fn get(url: &str, options: RequestOptions) -> Result<HttpResponse> {
    BlockingClient::new()?.get(url, options)
}

/// Send a POST request with a one-off blocking client.
pub fn post(url: &str, options: RequestOptions) -> Result<HttpResponse> {
    BlockingClient::new()?.post(url, options)
}

/// Send a PUT request with a one-off blocking client.
pub fn put(url: &str, options: RequestOptions) -> Result<HttpResponse> {
    BlockingClient::new()?.put(url, options)
}

/// Send a DELETE request with a one-off blocking client.
pub fn delete(url: &str, options: RequestOptions) -> Result<HttpResponse> {
    BlockingClient::new()?.delete(url, options)
}

/// Send a PATCH request with a one-off blocking client.
pub fn patch(url: &str, options: RequestOptions) -> Result<HttpResponse> {
    BlockingClient::new()?.patch(url, options)
}

/// Send a HEAD request with a one-off blocking client.
pub fn head(url: &str, options: RequestOptions) -> Result<HttpResponse> {
    BlockingClient::new()?.head(url, options)
}

/// Send an OPTIONS request with a one-off blocking client.
pub fn options(url: &str, options: RequestOptions) -> Result<HttpResponse> {
    BlockingClient::new()?.options(url, options)
}
