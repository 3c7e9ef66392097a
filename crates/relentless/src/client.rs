//! Async client: one entry point per HTTP verb, each call retried

use crate::config::ClientConfig;
use crate::error::Result;
use crate::observability::{RequestMetadata, RequestTimer, log_outcome};
use crate::options::RequestOptions;
use http::Method;
use relentless_core::RetryPolicy;
use relentless_core::retry::AsyncController;
use relentless_transport::{HttpResponse, HttpTransport, Transport};
use std::fmt;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Client whose calls yield to the async runtime while waiting.
///
/// Every call runs its own attempt loop: concurrent calls share the transport
/// and nothing else. Cloning is cheap.
///
/// # Example
///
/// ```rust,no_run
/// use relentless::{Client, RequestOptions};
///
/// # async fn example() -> relentless::Result<()> {
/// let client = Client::new()?;
/// let response = client
///     .get("https://example.com/health", RequestOptions::new().max_retries(5))
///     .await?;
/// println!("{}", response.status);
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct Client {
    transport: Arc<dyn Transport>,
    policy: RetryPolicy,
    controller: AsyncController,
}

impl Client {
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
    /// client cannot be built, e.g. because a default header is invalid.
    pub fn from_config(config: ClientConfig) -> Result<Self> {
        let transport = HttpTransport::with_config(config.transport_config())?;
        Ok(Self {
            transport: Arc::new(transport),
            policy: config.policy,
            controller: AsyncController::new(),
        })
    }

    /// Create a client configured from `RELENTLESS_*` environment variables.
    ///
    /// # Errors
    ///
    /// See [`ClientConfig::from_env`] and [`Client::from_config`].
    #[cfg(feature = "env")]
    pub fn from_env() -> Result<Self> {
        Self::from_config(ClientConfig::from_env()?)
    }

    /// Create a client over a caller-supplied transport, with the default policy.
    ///
    /// The transport is shared, never mutated.
    pub fn with_transport(transport: Arc<dyn Transport>) -> Self {
        Self {
            transport,
            policy: RetryPolicy::default(),
            controller: AsyncController::new(),
        }
    }

    /// Replace the default policy for calls made through this client.
    pub fn with_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Abort calls made through this client once `token` is cancelled.
    ///
    /// A cancelled call fails with [`Error::Cancelled`](crate::Error::Cancelled).
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.controller = AsyncController::new().with_cancellation(token);
        self
    }

    /// Default policy for calls made through this client.
    pub fn retry_policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// The transport every attempt goes through.
    pub fn transport(&self) -> &Arc<dyn Transport> {
        &self.transport
    }

    /// Send a GET request.
    pub async fn get(&self, url: &str, options: RequestOptions) -> Result<HttpResponse> {
        self.request(Method::GET, url, options).await
    }

    /// Send a POST request.
    pub async fn post(&self, url: &str, options: RequestOptions) -> Result<HttpResponse> {
        self.request(Method::POST, url, options).await
    }

    /// Send a PUT request.
    pub async fn put(&self, url: &str, options: RequestOptions) -> Result<HttpResponse> {
        self.request(Method::PUT, url, options).await
    }

    /// Send a DELETE request.
    pub async fn delete(&self, url: &str, options: RequestOptions) -> Result<HttpResponse> {
        self.request(Method::DELETE, url, options).await
    }

    /// Send a PATCH request.
    pub async fn patch(&self, url: &str, options: RequestOptions) -> Result<HttpResponse> {
        self.request(Method::PATCH, url, options).await
    }

    /// Send a HEAD request.
    pub async fn head(&self, url: &str, options: RequestOptions) -> Result<HttpResponse> {
        self.request(Method::HEAD, url, options).await
    }

    /// Send an OPTIONS request.
    pub async fn options(&self, url: &str, options: RequestOptions) -> Result<HttpResponse> {
        self.request(Method::OPTIONS, url, options).await
    }

    /// Send a request with any method, retrying per the resolved policy.
    ///
    /// # Errors
    ///
    /// - [`Error::Validation`](crate::Error::Validation) or
    ///   [`Error::InvalidUrl`](crate::Error::InvalidUrl) before anything is sent
    /// - [`Error::Request`](crate::Error::Request) on a terminal status or
    ///   once the attempts run out
    /// - [`Error::Cancelled`](crate::Error::Cancelled) if the client's token fires
    pub async fn request(
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

        let transport = self.transport.as_ref();
        let mut retries = 0;
        let result = self
            .controller
            .execute(&policy, request.method.as_str(), &request.url, |attempt| {
                retries = attempt.index();
                transport.send_http(&request)
            })
            .await
            .map_err(Into::into);

        log_outcome(&metadata, &result, timer, retries);
        result
    }
}

impl fmt::Debug for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client")
            .field("policy", &self.policy)
            .field("controller", &self.controller)
            .finish_non_exhaustive()
    }
}

/// Send a GET request with a one-off client.
///
/// Builds a fresh transport per call; reuse a [`Client`] to share connections.
pub async fn get(url: &str, options: RequestOptions) -> Result<HttpResponse> {
    Client::new()?.get(url, options).await
}

/// Send a POST request with a one-off client.
pub async fn post(url: &str, options: RequestOptions) -> Result<HttpResponse> {
    Client::new()?.post(url, options).await
}

/// Send a PUT request with a one-off client.
pub async fn put(url: &str, options: RequestOptions) -> Result<HttpResponse> {
    Client::new()?.put(url, options).await
}

/// Send a DELETE request with a one-off client.
pub async fn delete(url: &str, options: RequestOptions) -> Result<HttpResponse> {
    Client::new()?.delete(url, options).await
}

/// Send a PATCH request with a one-off client.
pub async fn patch(url: &str, options: RequestOptions) -> Result<HttpResponse> {
    Client::new()?.patch(url, options).await
}

/// Send a HEAD request with a one-off client.
pub async fn head(url: &str, options: RequestOptions) -> Result<HttpResponse> {
    Client::new()?.head(url, options).await
}

/// Send an OPTIONS request with a one-off client.
pub async fn options(url: &str, options: RequestOptions) -> Result<HttpResponse> {
    Client::new()?.options(url, options).await
}
