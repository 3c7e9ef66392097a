//! Retry controller that waits by blocking the calling thread.

use super::classify::ResponseStatus;
use super::state::{Attempt, RetryState, Step, TransportFailure};
use crate::error::RetryError;
use crate::policy::RetryPolicy;
use std::time::Duration;

/// How the blocking controller waits between attempts.
pub trait Sleep {
    /// Block for `duration`.
    fn sleep(&self, duration: Duration);
}

/// Sleeps the calling thread with [`std::thread::sleep`].
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadSleep;

impl Sleep for ThreadSleep {
    fn sleep(&self, duration: Duration) {
        if !duration.is_zero() {
            std::thread::sleep(duration);
        }
    }
}

/// Drives the attempt loop on the calling thread.
///
/// # Examples
///
/// ```rust
/// use relentless_core::RetryPolicy;
/// use relentless_core::retry::{BlockingController, ResponseStatus};
///
/// struct Status(u16);
///
/// impl ResponseStatus for Status {
///     fn status_code(&self) -> u16 {
///         self.0
///     }
///
///     fn header(&self, _name: &str) -> Option<&str> {
///         None
///     }
/// }
///
/// let policy = RetryPolicy::builder().backoff_factor(0.0).build();
/// let mut calls = 0;
/// let response = BlockingController::new()
///     .execute(&policy, "GET", "https://example.com", |_attempt| {
///         calls += 1;
///         Ok::<_, std::io::Error>(Status(if calls < 3 { 503 } else { 200 }))
///     })
///     .unwrap();
///
/// assert_eq!(response.status_code(), 200);
/// assert_eq!(calls, 3);
/// ```
#[derive(Debug, Default, Clone)]
pub struct BlockingController<S = ThreadSleep> {
    sleeper: S,
}

impl BlockingController {
    /// Controller that sleeps the calling thread between attempts.
    pub fn new() -> Self {
        Self::default()
    }
}

impl<S: Sleep> BlockingController<S> {
    /// Controller with a custom wait strategy.
    pub fn with_sleeper(sleeper: S) -> Self {
        Self { sleeper }
    }

    /// The wait strategy in use.
    pub fn sleeper(&self) -> &S {
        &self.sleeper
    }

    /// Run `send` until it succeeds, fails terminally, or exhausts `policy`.
    ///
    /// # Errors
    ///
    /// - [`RetryError::Validation`] if `policy` is invalid; `send` is never called.
    /// - [`RetryError::Failed`] on a terminal status or when no attempts remain.
    pub fn execute<R, E, F>(
        &self,
        policy: &RetryPolicy,
        method: &str,
        url: &str,
        mut send: F,
    ) -> Result<R, RetryError<R>>
    where
        R: ResponseStatus,
        E: TransportFailure,
        F: FnMut(Attempt) -> Result<R, E>,
    {
        let mut state = RetryState::new(policy, method, url)?;

        loop {
            let attempt = state.begin();
            let result = send(attempt);

            match state.record(attempt, result) {
                Step::Return(response) => return Ok(response),
                Step::Fail(failure) => return Err(failure.into()),
                Step::Wait(delay) => self.sleeper.sleep(delay),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FailureKind;
    use crate::retry::classify::tests::StubResponse;
    use std::cell::RefCell;

    /// Records requested waits instead of sleeping.
    #[derive(Debug, Default)]
    struct RecordingSleep {
        waits: RefCell<Vec<Duration>>,
    }

    impl Sleep for RecordingSleep {
        fn sleep(&self, duration: Duration) {
            self.waits.borrow_mut().push(duration);
        }
    }

    fn controller() -> BlockingController<RecordingSleep> {
        BlockingController::with_sleeper(RecordingSleep::default())
    }

    fn scripted(
        statuses: &[u16],
    ) -> impl FnMut(Attempt) -> Result<StubResponse, std::io::Error> + '_ {
        let mut calls = 0usize;
        move |_attempt| {
            let status = statuses[calls.min(statuses.len() - 1)];
            calls += 1;
            Ok(StubResponse::status(status))
        }
    }

    #[test]
    fn test_succeeds_after_two_retries() {
        let policy = RetryPolicy::builder()
            .max_retries(2)
            .backoff_factor(0.3)
            .retryable_statuses([503])
            .build();
        let controller = controller();
        let mut calls = 0;
        let mut script = scripted(&[503, 503, 200]);

        let response = controller
            .execute(&policy, "GET", "https://example.com", |attempt| {
                calls += 1;
                script(attempt)
            })
            .unwrap();

        assert_eq!(response.status, 200);
        assert_eq!(calls, 3);
        assert_eq!(
            *controller.sleeper().waits.borrow(),
            vec![Duration::from_secs_f64(0.3), Duration::from_secs_f64(0.6)]
        );
    }

    #[test]
    fn test_exhaustion_makes_max_retries_plus_one_calls() {
        for max_retries in 0..5 {
            let policy = RetryPolicy::builder()
                .max_retries(max_retries)
                .backoff_factor(0.0)
                .build();
            let controller = controller();
            let mut calls = 0;

            let err = controller
                .execute(&policy, "GET", "https://example.com", |_| {
                    calls += 1;
                    Ok::<_, std::io::Error>(StubResponse::status(503))
                })
                .unwrap_err();

            let failure = err.as_failure().expect("request failure");
            assert_eq!(failure.kind(), FailureKind::Exhausted);
            assert_eq!(i64::from(failure.attempts()), max_retries + 1);
            assert_eq!(calls, max_retries + 1);
            assert_eq!(
                controller.sleeper().waits.borrow().len() as i64,
                max_retries
            );
        }
    }

    #[test]
    fn test_terminal_status_makes_one_call() {
        let policy = RetryPolicy::builder()
            .max_retries(1)
            .retryable_statuses([500])
            .build();
        let controller = controller();
        let mut calls = 0;

        let err = controller
            .execute(&policy, "GET", "https://example.com", |_| {
                calls += 1;
                Ok::<_, std::io::Error>(StubResponse::status(503))
            })
            .unwrap_err();

        assert_eq!(calls, 1);
        let failure = err.as_failure().expect("request failure");
        assert!(failure.is_terminal());
        assert_eq!(failure.status_code(), Some(503));
        assert!(controller.sleeper().waits.borrow().is_empty());
    }

    #[test]
    fn test_validation_happens_before_any_call() {
        let controller = controller();
        let mut calls = 0;

        for policy in [
            RetryPolicy::builder().max_retries(-1).build(),
            RetryPolicy::builder().backoff_factor(-1.0).build(),
        ] {
            let err = controller
                .execute(&policy, "GET", "https://example.com", |_| {
                    calls += 1;
                    Ok::<_, std::io::Error>(StubResponse::status(200))
                })
                .unwrap_err();
            assert!(matches!(err, RetryError::Validation(_)));
        }

        assert_eq!(calls, 0);
    }

    #[test]
    fn test_network_errors_are_retried_until_exhaustion() {
        let policy = RetryPolicy::builder()
            .max_retries(2)
            .backoff_factor(0.1)
            .build();
        let controller = controller();
        let mut calls = 0;

        let err = controller
            .execute::<StubResponse, _, _>(&policy, "POST", "https://example.com", |_| {
                calls += 1;
                Err(std::io::Error::new(
                    std::io::ErrorKind::ConnectionRefused,
                    "connection refused",
                ))
            })
            .unwrap_err();

        assert_eq!(calls, 3);
        let failure = err.as_failure().expect("request failure");
        assert_eq!(failure.status_code(), None);
        assert_eq!(
            failure.to_string(),
            "POST request to https://example.com failed after 3 attempts: connection refused"
        );
    }

    #[test]
    fn test_attempt_indices_are_sequential() {
        let policy = RetryPolicy::builder()
            .max_retries(3)
            .backoff_factor(0.0)
            .build();
        let mut seen = Vec::new();

        let _ = controller().execute(&policy, "GET", "https://example.com", |attempt| {
            seen.push(attempt.index());
            Ok::<_, std::io::Error>(StubResponse::status(502))
        });

        assert_eq!(seen, vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_thread_sleep_skips_zero() {
        let started = std::time::Instant::now();
        ThreadSleep.sleep(Duration::ZERO);
        assert!(started.elapsed() < Duration::from_millis(50));
    }
}
