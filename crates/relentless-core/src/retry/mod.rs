//! Retry decision engine.
//!
//! This module holds everything that decides the fate of a retried call, and
//! nothing that performs I/O:
//!
//! - [`classify`] maps a transport result to an [`AttemptOutcome`]
//! - [`next_delay`] maps an attempt index, a policy and an optional
//!   [`RetryAfter`] hint to a wait
//! - [`RetryState`] runs the attempt loop and builds the final
//!   [`RequestFailure`](crate::RequestFailure)
//!
//! Two controllers bind that loop to a concurrency model:
//!
//! - [`BlockingController`] sleeps the calling thread between attempts
//! - [`AsyncController`] awaits a timer instead, and supports cancellation
//!
//! Both produce identical classifications and delays for identical inputs;
//! only the way they wait differs.
//!
//! # Examples
//!
//! ```rust
//! use relentless_core::RetryPolicy;
//! use relentless_core::retry::next_delay;
//! use std::time::Duration;
//!
//! let policy = RetryPolicy::builder().backoff_factor(0.5).build();
//!
//! assert_eq!(next_delay(0, &policy, None), Duration::from_millis(500));
//! assert_eq!(next_delay(2, &policy, None), Duration::from_secs(2));
//! ```

mod backoff;
mod blocking;
mod classify;
mod controller;
mod retry_after;
mod state;

pub use backoff::{exponential_secs, next_delay, next_delay_with_rng};
pub use blocking::{BlockingController, Sleep, ThreadSleep};
pub use classify::{AttemptOutcome, FailureReason, ResponseStatus, classify};
pub use controller::AsyncController;
pub use retry_after::RetryAfter;
pub use state::{Attempt, RetryState, Step, TransportFailure};
