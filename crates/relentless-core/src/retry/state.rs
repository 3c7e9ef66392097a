//! The attempt loop shared by both controllers.
//!
//! [`RetryState`] owns every decision of a retried call: validation,
//! classification, when to give up, and how long to wait. Controllers only
//! invoke the transport, feed the result back, and carry out the returned
//! [`Step`]. The two bindings therefore differ in nothing but how they wait.

use super::backoff::next_delay;
use super::classify::{AttemptOutcome, FailureReason, ResponseStatus, classify};
use crate::error::{RequestFailure, ValidationError};
use crate::policy::RetryPolicy;
use std::error::Error as StdError;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// An error raised by a transport below the HTTP layer.
///
/// Every such error is retryable; `is_timeout` only changes the wording of
/// the final [`RequestFailure`].
pub trait TransportFailure: StdError + Send + Sync + 'static {
    /// Whether the attempt ran out of time.
    fn is_timeout(&self) -> bool {
        false
    }
}

impl TransportFailure for std::io::Error {
    fn is_timeout(&self) -> bool {
        self.kind() == std::io::ErrorKind::TimedOut
    }
}

/// One transport invocation within a retried call.
#[derive(Debug, Clone, Copy)]
pub struct Attempt {
    index: u32,
    started: Instant,
}

impl Attempt {
    /// 0-based index: 0 is the initial attempt, 1 the first retry.
    pub fn index(&self) -> u32 {
        self.index
    }

    /// 1-based attempt number, as shown in logs.
    pub fn number(&self) -> u32 {
        self.index.saturating_add(1)
    }

    /// Time since this attempt started.
    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    /// Whether this is a retry rather than the initial attempt.
    pub fn is_retry(&self) -> bool {
        self.index > 0
    }
}

/// What a controller must do after an attempt.
#[derive(Debug)]
pub enum Step<R> {
    /// Hand the response to the caller.
    Return(R),

    /// Raise this failure to the caller.
    Fail(RequestFailure<R>),

    /// Wait this long, then start the next attempt.
    Wait(Duration),
}

/// Attempt counter and decision logic for a single call.
///
/// Each call owns its own state; nothing is shared between concurrent calls.
#[derive(Debug)]
pub struct RetryState<'a> {
    policy: &'a RetryPolicy,
    method: &'a str,
    url: &'a str,
    max_retries: u32,
    next_index: u32,
    started: Instant,
}

impl<'a> RetryState<'a> {
    /// Validate `policy` and prepare the attempt loop.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] if the policy is invalid. No attempt has
    /// been made at that point.
    pub fn new(
        policy: &'a RetryPolicy,
        method: &'a str,
        url: &'a str,
    ) -> Result<Self, ValidationError> {
        let max_retries = policy.validate()?;
        Ok(Self {
            policy,
            method,
            url,
            max_retries,
            next_index: 0,
            started: Instant::now(),
        })
    }

    /// The policy driving this call.
    pub fn policy(&self) -> &RetryPolicy {
        self.policy
    }

    /// Total number of attempts allowed (`max_retries + 1`).
    pub fn max_attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }

    /// Start the next attempt.
    pub fn begin(&mut self) -> Attempt {
        let attempt = Attempt {
            index: self.next_index,
            started: Instant::now(),
        };
        debug!(
            method = self.method,
            url = self.url,
            attempt = attempt.number(),
            max_attempts = self.max_attempts(),
            "Sending request"
        );
        attempt
    }

    /// Feed back the result of `attempt` and decide what happens next.
    pub fn record<R, E>(&mut self, attempt: Attempt, result: Result<R, E>) -> Step<R>
    where
        R: ResponseStatus,
        E: TransportFailure,
    {
        let attempts = attempt.number();

        match classify(result, &self.policy.retryable_statuses) {
            AttemptOutcome::Success(response) => {
                if attempt.is_retry() {
                    info!(
                        method = self.method,
                        url = self.url,
                        attempt = attempts,
                        elapsed_ms = self.started.elapsed().as_millis(),
                        "Request succeeded after retries"
                    );
                }
                Step::Return(response)
            }

            AttemptOutcome::TerminalFailure(response) => {
                let status = response.status_code();
                debug!(
                    method = self.method,
                    url = self.url,
                    status,
                    "Request failed with non-retryable status"
                );
                self.fail(RequestFailure::terminal(
                    self.method,
                    self.url,
                    status,
                    response,
                    attempts,
                ))
            }

            AttemptOutcome::RetryableFailure {
                reason,
                suggested_delay,
            } => {
                self.log_retryable(&attempt, &reason);

                if attempt.index >= self.max_retries {
                    return self.fail(self.exhausted(reason, attempts));
                }

                let delay = next_delay(attempt.index, self.policy, suggested_delay.as_ref());
                debug!(
                    method = self.method,
                    url = self.url,
                    delay_ms = delay.as_millis(),
                    from_retry_after = suggested_delay.is_some(),
                    "Waiting before retry"
                );
                self.next_index = attempt.index.saturating_add(1);
                Step::Wait(delay)
            }
        }
    }

    fn exhausted<R, E>(&self, reason: FailureReason<R, E>, attempts: u32) -> RequestFailure<R>
    where
        R: ResponseStatus,
        E: TransportFailure,
    {
        match reason {
            FailureReason::Status(response) => RequestFailure::exhausted_with_status(
                self.method,
                self.url,
                response.status_code(),
                response,
                attempts,
            ),
            FailureReason::Transport(err) => {
                let timed_out = err.is_timeout();
                RequestFailure::exhausted_with_error(
                    self.method,
                    self.url,
                    Box::new(err),
                    timed_out,
                    attempts,
                )
            }
        }
    }

    fn fail<R>(&self, failure: RequestFailure<R>) -> Step<R> {
        warn!(
            method = self.method,
            url = self.url,
            status = failure.status_code(),
            attempts = failure.attempts(),
            kind = ?failure.kind(),
            elapsed_ms = self.started.elapsed().as_millis(),
            "{}",
            failure.message()
        );
        Step::Fail(failure)
    }

    fn log_retryable<R, E>(&self, attempt: &Attempt, reason: &FailureReason<R, E>)
    where
        R: ResponseStatus,
        E: TransportFailure,
    {
        match reason {
            FailureReason::Status(response) => debug!(
                method = self.method,
                url = self.url,
                status = response.status_code(),
                attempt = attempt.number(),
                max_attempts = self.max_attempts(),
                "Request failed with retryable status"
            ),
            FailureReason::Transport(err) => debug!(
                method = self.method,
                url = self.url,
                error = %err,
                timed_out = err.is_timeout(),
                attempt = attempt.number(),
                max_attempts = self.max_attempts(),
                "Request failed before receiving a response"
            ),
        }
    }
}
