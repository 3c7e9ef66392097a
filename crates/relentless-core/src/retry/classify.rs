//! Outcome classifier: success, retryable failure, or terminal failure.

use super::retry_after::RetryAfter;
use std::collections::BTreeSet;

/// What the classifier needs to know about a transport response.
pub trait ResponseStatus {
    /// HTTP status code.
    fn status_code(&self) -> u16;

    /// Header value by name, case-insensitive.
    fn header(&self, name: &str) -> Option<&str>;

    /// Parsed `Retry-After` hint, if the response carried a valid one.
    fn retry_after(&self) -> Option<RetryAfter> {
        self.header("retry-after").and_then(RetryAfter::parse)
    }
}

/// Cause of a failed attempt.
#[derive(Debug)]
pub enum FailureReason<R, E> {
    /// The transport raised before producing a response.
    Transport(E),

    /// The transport produced a response with a failing status.
    Status(R),
}

/// Classification of a single attempt.
#[derive(Debug)]
pub enum AttemptOutcome<R, E> {
    /// The response is returned to the caller as is.
    Success(R),

    /// Worth another attempt, optionally after a server-specified delay.
    RetryableFailure {
        /// What went wrong.
        reason: FailureReason<R, E>,
        /// `Retry-After` hint from the response, if any.
        suggested_delay: Option<RetryAfter>,
    },

    /// Ends the call immediately regardless of the remaining budget.
    ///
    /// Only responses classify as terminal: transport errors are always retryable.
    TerminalFailure(R),
}

impl<R, E> AttemptOutcome<R, E> {
    /// Whether this outcome ends the call successfully.
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    /// Whether this outcome allows another attempt.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::RetryableFailure { .. })
    }
}

/// Classify the result of one transport invocation.
///
/// - Any transport error is retryable, with no suggested delay.
/// - A status below 400 is a success, whether or not it is listed.
/// - A status in `retryable_statuses` is retryable; its `Retry-After` header,
///   if valid, becomes the suggested delay.
/// - Any other status is terminal.
pub fn classify<R, E>(
    result: Result<R, E>,
    retryable_statuses: &BTreeSet<u16>,
) -> AttemptOutcome<R, E>
where
    R: ResponseStatus,
{
    let response = match result {
        Ok(response) => response,
        Err(err) => {
            return AttemptOutcome::RetryableFailure {
                reason: FailureReason::Transport(err),
                suggested_delay: None,
            };
        }
    };

    let status = response.status_code();
    if status < 400 {
        AttemptOutcome::Success(response)
    } else if retryable_statuses.contains(&status) {
        let suggested_delay = response.retry_after();
        AttemptOutcome::RetryableFailure {
            reason: FailureReason::Status(response),
            suggested_delay,
        }
    } else {
        AttemptOutcome::TerminalFailure(response)
    }
}
