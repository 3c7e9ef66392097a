//! # relentless
//!
//! HTTP calls that survive transient failures:
//! - Retries on connection errors, timeouts and configurable status codes
//! - Exponential backoff with optional additive jitter
//! - `Retry-After` honoured, in seconds or as an HTTP date
//! - Async [`Client`] and thread-blocking [`BlockingClient`] with the same semantics
//! - One entry point per HTTP verb, over the built-in reqwest transport or
//!   any [`Transport`]
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use relentless::{Client, RequestOptions, RetryPolicy};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = Client::new()?.with_policy(
//!         RetryPolicy::builder()
//!             .max_retries(5)
//!             .backoff_factor(0.5)
//!             .jitter_factor(0.1)
//!             .build(),
//!     );
//!
//!     match client.get("https://example.com/api", RequestOptions::new()).await {
//!         Ok(response) => println!("{}", response.text()?),
//!         Err(err) if err.is_terminal() => eprintln!("rejected: {err}"),
//!         Err(err) => eprintln!("gave up after {} attempts: {err}", err.attempts()),
//!     }
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]

// Re-export commonly used types
#[cfg(feature = "blocking")]
pub use blocking::BlockingClient;
pub use client::{Client, delete, get, head, options, patch, post, put};
pub use config::ClientConfig;
pub use error::{Error, Result};
pub use options::RequestOptions;

pub use relentless_core::{
    DEFAULT_BACKOFF_FACTOR, DEFAULT_JITTER_FACTOR, DEFAULT_MAX_RETRIES, DEFAULT_TIMEOUT,
    FailureKind, RETRY_STATUS_CODES, RequestFailure, RetryPolicy, RetryPolicyBuilder,
    ValidationError,
};
#[cfg(feature = "blocking")]
pub use relentless_transport::BlockingTransport;
pub use relentless_transport::{HttpRequest, HttpResponse, Method, Transport, TransportError};

// Module declarations
#[cfg(feature = "blocking")]
#[cfg_attr(docsrs, doc(cfg(feature = "blocking")))]
pub mod blocking;
pub mod client;
pub mod config;
pub mod error;
pub mod observability;
pub mod options;

// Re-export key dependencies for convenience
pub use async_trait::async_trait;
pub use tokio_util::sync::CancellationToken;

/// Prelude module for common imports
///
/// # Examples
///
/// ```rust
/// use relentless::prelude::*;
/// ```
pub mod prelude {
    #[cfg(feature = "blocking")]
    pub use crate::BlockingClient;
    pub use crate::{
        Client, ClientConfig, Error, HttpResponse, RequestOptions, Result, RetryPolicy,
    };
}

/// Crate version, automatically updated from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
