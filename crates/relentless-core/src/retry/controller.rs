//! Retry controller that yields to the async runtime while waiting.

use super::classify::ResponseStatus;
use super::state::{Attempt, RetryState, Step, TransportFailure};
use crate::error::RetryError;
use crate::policy::RetryPolicy;
use std::future::Future;
use tokio_util::sync::CancellationToken;

/// Drives the attempt loop as a future.
///
/// Suspends only inside the transport call and during backoff waits, both of
/// which observe the optional [`CancellationToken`]. Cancellation aborts the
/// loop with [`RetryError::Cancelled`]; it is never reported as a
/// request failure. Dropping the returned future cancels the call as well.
///
/// # Examples
///
/// ```rust
/// use relentless_core::RetryPolicy;
/// use relentless_core::retry::{AsyncController, ResponseStatus};
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
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let policy = RetryPolicy::default();
/// let response = AsyncController::new()
///     .execute(&policy, "GET", "https://example.com", |_attempt| async {
///         Ok::<_, std::io::Error>(Status(200))
///     })
///     .await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Default, Clone)]
pub struct AsyncController {
    cancel: Option<CancellationToken>,
}

impl AsyncController {
    /// Controller without external cancellation.
    pub fn new() -> Self {
        Self::default()
    }

    /// Abort the call as soon as `token` is cancelled.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// Run `send` until it succeeds, fails terminally, or exhausts `policy`.
    ///
    /// # Errors
    ///
    /// - [`RetryError::Validation`] if `policy` is invalid; `send` is never called.
    /// - [`RetryError::Failed`] on a terminal status or when no attempts remain.
    /// - [`RetryError::Cancelled`] if the token fires during a request or a wait.
    pub async fn execute<R, E, F, Fut>(
        &self,
        policy: &RetryPolicy,
        method: &str,
        url: &str,
        mut send: F,
    ) -> Result<R, RetryError<R>>
    where
        R: ResponseStatus,
        E: TransportFailure,
        F: FnMut(Attempt) -> Fut,
        Fut: Future<Output = Result<R, E>>,
    {
        let mut state = RetryState::new(policy, method, url)?;

        loop {
            let attempt = state.begin();
            let Some(result) = self.until_cancelled(send(attempt)).await else {
                return Err(RetryError::Cancelled);
            };

            match state.record(attempt, result) {
                Step::Return(response) => return Ok(response),
                Step::Fail(failure) => return Err(failure.into()),
                Step::Wait(delay) => {
                    if self.until_cancelled(tokio::time::sleep(delay)).await.is_none() {
                        return Err(RetryError::Cancelled);
                    }
                }
            }
        }
    }

    /// `None` if the token fired before `fut` completed.
    async fn until_cancelled<T>(&self, fut: impl Future<Output = T>) -> Option<T> {
        match &self.cancel {
            Some(token) => tokio::select! {
                biased;
                () = token.cancelled() => {
                    tracing::debug!("Request cancelled");
                    None
                }
                output = fut => Some(output),
            },
            None => Some(fut.await),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FailureKind;
    use crate::retry::classify::tests::StubResponse;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::time::Duration;
    use tokio::time::Instant;

    fn counting(
        calls: &Arc<AtomicU32>,
        script: &'static [u16],
    ) -> impl FnMut(Attempt) -> std::future::Ready<Result<StubResponse, std::io::Error>> {
        let calls = Arc::clone(calls);
        move |_attempt| {
            let n = calls.fetch_add(1, Ordering::SeqCst) as usize;
            let status = script[n.min(script.len() - 1)];
            std::future::ready(Ok(StubResponse::status(status)))
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_succeeds_after_two_waits() {
        let policy = RetryPolicy::builder()
            .max_retries(2)
            .backoff_factor(0.3)
            .retryable_statuses([503])
            .build();
        let calls = Arc::new(AtomicU32::new(0));
        let started = Instant::now();

        let response = AsyncController::new()
            .execute(
                &policy,
                "GET",
                "https://example.com",
                counting(&calls, &[503, 503, 200]),
            )
            .await
            .unwrap();

        assert_eq!(response.status, 200);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        // 0.3s + 0.6s of virtual time, give or take timer granularity
        let elapsed = started.elapsed();
        assert!(elapsed >= Duration::from_millis(899), "waited {elapsed:?}");
        assert!(elapsed < Duration::from_millis(920), "waited {elapsed:?}");
    }

    #[tokio::test(start_paused = true)]
    async fn test_exhaustion_counts_attempts() {
        let policy = RetryPolicy::builder()
            .max_retries(3)
            .backoff_factor(0.01)
            .build();
        let calls = Arc::new(AtomicU32::new(0));

        let err = AsyncController::new()
            .execute(&policy, "GET", "https://example.com", counting(&calls, &[429]))
            .await
            .unwrap_err();

        let failure = err.as_failure().expect("request failure");
        assert_eq!(failure.kind(), FailureKind::Exhausted);
        assert_eq!(failure.attempts(), 4);
        assert_eq!(failure.status_code(), Some(429));
        assert_eq!(calls.load(Ordering::SeqCst), 4);
    }

    #[tokio::test]
    async fn test_terminal_status_makes_one_call() {
        let policy = RetryPolicy::builder()
            .max_retries(1)
            .retryable_statuses([500])
            .build();
        let calls = Arc::new(AtomicU32::new(0));

        let err = AsyncController::new()
            .execute(&policy, "GET", "https://example.com", counting(&calls, &[503]))
            .await
            .unwrap_err();

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        let failure = err.as_failure().expect("request failure");
        assert!(failure.is_terminal());
        assert_eq!(failure.status_code(), Some(503));
    }

    #[tokio::test]
    async fn test_validation_happens_before_any_call() {
        let policy = RetryPolicy::builder().jitter_factor(-0.2).build();
        let calls = Arc::new(AtomicU32::new(0));

        let err = AsyncController::new()
            .execute(&policy, "GET", "https://example.com", counting(&calls, &[200]))
            .await
            .unwrap_err();

        assert!(matches!(err, RetryError::Validation(_)));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancellation_during_backoff() {
        let policy = RetryPolicy::builder()
            .max_retries(5)
            .backoff_factor(10.0)
            .build();
        let calls = Arc::new(AtomicU32::new(0));
        let token = CancellationToken::new();

        let canceller = {
            let token = token.clone();
            tokio::spawn(async move {
                tokio::time::sleep(Duration::from_secs(1)).await;
                token.cancel();
            })
        };

        let err = AsyncController::new()
            .with_cancellation(token)
            .execute(&policy, "GET", "https://example.com", counting(&calls, &[503]))
            .await
            .unwrap_err();

        canceller.await.unwrap();
        assert!(matches!(err, RetryError::Cancelled));
        assert!(err.as_failure().is_none());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancellation_during_request() {
        let policy = RetryPolicy::default();
        let token = CancellationToken::new();
        let trigger = token.clone();

        let err = AsyncController::new()
            .with_cancellation(token)
            .execute(&policy, "GET", "https://example.com", move |_attempt| {
                let trigger = trigger.clone();
                async move {
                    trigger.cancel();
                    tokio::time::sleep(Duration::from_secs(60)).await;
                    Ok::<_, std::io::Error>(StubResponse::status(200))
                }
            })
            .await
            .unwrap_err();

        assert!(matches!(err, RetryError::Cancelled));
    }

    #[tokio::test(start_paused = true)]
    async fn test_concurrent_calls_are_independent() {
        let policy = RetryPolicy::builder()
            .max_retries(2)
            .backoff_factor(1.0)
            .build();
        let slow_calls = Arc::new(AtomicU32::new(0));
        let fast_calls = Arc::new(AtomicU32::new(0));
        let controller = AsyncController::new();

        let (slow, fast) = tokio::join!(
            controller.execute(&policy, "GET", "https://a.example", counting(&slow_calls, &[503])),
            controller.execute(&policy, "GET", "https://b.example", counting(&fast_calls, &[200])),
        );

        assert_eq!(slow.unwrap_err().as_failure().map(|f| f.attempts()), Some(3));
        assert_eq!(fast.unwrap().status, 200);
        assert_eq!(slow_calls.load(Ordering::SeqCst), 3);
        assert_eq!(fast_calls.load(Ordering::SeqCst), 1);
    }
}
