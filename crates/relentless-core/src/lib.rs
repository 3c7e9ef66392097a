#![deny(unsafe_code)]
#![warn(missing_docs)]

//! Core retry engine for the relentless HTTP client.
//!
//! This crate decides, for every attempt of an HTTP call, whether to return,
//! retry, or give up, and how long to wait in between. It performs no I/O of
//! its own: the request is sent by a caller-supplied closure, which keeps the
//! engine independent of any particular HTTP client.
//!
//! - **Policy**: [`RetryPolicy`] with call-boundary validation
//! - **Classification**: transport errors and listed statuses retry, other
//!   error statuses end the call
//! - **Timing**: exponential backoff, additive jitter, `Retry-After` hints
//! - **Controllers**: a blocking and an async binding over one shared loop
//! - **Errors**: [`ValidationError`], [`RequestFailure`], [`RetryError`]
//!
//! # Examples
//!
//! ```rust
//! use relentless_core::prelude::*;
//!
//! struct Status(u16);
//!
//! impl ResponseStatus for Status {
//!     fn status_code(&self) -> u16 {
//!         self.0
//!     }
//!
//!     fn header(&self, _name: &str) -> Option<&str> {
//!         None
//!     }
//! }
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let policy = RetryPolicy::builder()
//!     .max_retries(2)
//!     .backoff_factor(0.3)
//!     .retryable_statuses([503])
//!     .build();
//!
//! let response = AsyncController::new()
//!     .execute(&policy, "GET", "https://example.com", |_attempt| async {
//!         Ok::<_, std::io::Error>(Status(200))
//!     })
//!     .await?;
//! assert_eq!(response.status_code(), 200);
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod policy;
pub mod retry;

pub use error::{FailureKind, RequestFailure, RetryError, ValidationError};
pub use policy::{
    DEFAULT_BACKOFF_FACTOR, DEFAULT_JITTER_FACTOR, DEFAULT_MAX_RETRIES, DEFAULT_TIMEOUT,
    RETRY_STATUS_CODES, RetryPolicy, RetryPolicyBuilder,
};

/// Convenient re-exports of commonly used items.
///
/// ```rust
/// use relentless_core::prelude::*;
/// ```
pub mod prelude {
    pub use crate::error::{FailureKind, RequestFailure, RetryError, ValidationError};
    pub use crate::policy::RetryPolicy;
    pub use crate::retry::{
        AsyncController, BlockingController, ResponseStatus, RetryAfter, TransportFailure,
    };
}
