//! Transport layer for relentless
//!
//! A transport performs one HTTP exchange and reports either a response, with
//! any status code, or a [`TransportError`] raised below the HTTP layer.
//!
//! # Architecture
//!
//! - **[`Transport`]**: async exchange, implemented by [`HttpTransport`]
//! - **[`BlockingTransport`]**: thread-blocking exchange, implemented by
//!   `BlockingHttpTransport` (feature `blocking`)
//! - **[`HttpRequest`] / [`HttpResponse`]**: owned descriptors shared by both
//!
//! [`HttpResponse`] implements the retry engine's `ResponseStatus` and
//! [`TransportError`] its `TransportFailure`, so both plug straight into the
//! controllers in `relentless-core`.
//!
//! # Usage
//!
//! ```no_run
//! use relentless_transport::{HttpRequest, HttpTransport, Method, Transport};
//!
//! # async fn example() -> relentless_transport::Result<()> {
//! let transport = HttpTransport::new()?;
//! let request = HttpRequest::new(Method::GET, "https://example.com/health");
//! let response = transport.send_http(&request).await?;
//! println!("{}", response.status);
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
pub mod http;
pub mod traits;

// Re-export commonly used types
pub use error::{Result, TransportError};
#[cfg(feature = "blocking")]
pub use self::http::BlockingHttpTransport;
pub use self::http::{DEFAULT_USER_AGENT, HttpTransport, HttpTransportConfig};
pub use ::http::Method;
pub use traits::{BlockingTransport, HttpRequest, HttpResponse, Transport};
