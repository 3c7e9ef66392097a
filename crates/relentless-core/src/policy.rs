//! Retry policy and its call-boundary validation.

use crate::error::ValidationError;
use std::collections::BTreeSet;
use std::time::Duration;

/// Default per-attempt timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Default number of retries after the first attempt.
pub const DEFAULT_MAX_RETRIES: i64 = 3;

/// Default exponential backoff factor, in seconds.
pub const DEFAULT_BACKOFF_FACTOR: f64 = 0.3;

/// Jitter is disabled unless asked for.
pub const DEFAULT_JITTER_FACTOR: f64 = 0.0;

/// Status codes retried by default: rate limiting and transient server errors.
pub const RETRY_STATUS_CODES: [u16; 5] = [429, 500, 502, 503, 504];

/// Resilience parameters for a single call.
///
/// A policy is owned by the caller and read-only for the whole call. It is
/// validated once, before the first attempt; an invalid policy never reaches
/// the network.
///
/// `max_retries` is signed so that values coming from configuration or user
/// input can be represented and rejected with a proper
/// [`ValidationError`] instead of silently wrapping.
///
/// # Examples
///
/// ```rust
/// use relentless_core::RetryPolicy;
/// use std::time::Duration;
///
/// let policy = RetryPolicy::builder()
///     .max_retries(5)
///     .backoff_factor(0.5)
///     .jitter_factor(0.1)
///     .retryable_statuses([429, 503])
///     .timeout(Duration::from_secs(30))
///     .build();
///
/// assert_eq!(policy.validate().unwrap(), 5);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Number of retries after the first attempt (total attempts = `max_retries + 1`).
    pub max_retries: i64,

    /// Base of the exponential backoff: the wait before retry `n` (0-indexed)
    /// is `backoff_factor * 2^n` seconds.
    pub backoff_factor: f64,

    /// Fraction of the base delay added as uniform random jitter.
    pub jitter_factor: f64,

    /// Status codes that are retried instead of failing immediately.
    pub retryable_statuses: BTreeSet<u16>,

    /// Timeout applied by the transport to each attempt.
    pub timeout: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
            backoff_factor: DEFAULT_BACKOFF_FACTOR,
            jitter_factor: DEFAULT_JITTER_FACTOR,
            retryable_statuses: RETRY_STATUS_CODES.into_iter().collect(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl RetryPolicy {
    /// Create a new builder starting from the default policy.
    pub fn builder() -> RetryPolicyBuilder {
        RetryPolicyBuilder::default()
    }

    /// Validate the policy and return the retry budget it allows.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] when `max_retries` is negative (or does
    /// not fit in a `u32`), when `backoff_factor` or `jitter_factor` is
    /// negative or not finite, or when `timeout` is zero.
    pub fn validate(&self) -> Result<u32, ValidationError> {
        let max_retries = u32::try_from(self.max_retries).map_err(|_| {
            if self.max_retries < 0 {
                ValidationError::NegativeMaxRetries(self.max_retries)
            } else {
                ValidationError::MaxRetriesTooLarge(self.max_retries)
            }
        })?;

        if !is_non_negative(self.backoff_factor) {
            return Err(ValidationError::InvalidBackoffFactor(self.backoff_factor));
        }
        if !is_non_negative(self.jitter_factor) {
            return Err(ValidationError::InvalidJitterFactor(self.jitter_factor));
        }
        if self.timeout.is_zero() {
            return Err(ValidationError::NonPositiveTimeout(self.timeout));
        }

        Ok(max_retries)
    }

    /// Whether `status` is in the retryable set.
    pub fn is_retryable_status(&self, status: u16) -> bool {
        self.retryable_statuses.contains(&status)
    }
}

fn is_non_negative(value: f64) -> bool {
    value.is_finite() && value >= 0.0
}

/// Fluent builder for [`RetryPolicy`].
///
/// Values are stored as given; range checks happen in
/// [`RetryPolicy::validate`] so that a bad value surfaces as an error at call
/// time rather than being clamped away.
#[derive(Debug, Clone, Default)]
pub struct RetryPolicyBuilder {
    policy: RetryPolicy,
}

impl RetryPolicyBuilder {
    /// Set the number of retries after the first attempt.
    ///
    /// Default: 3
    pub fn max_retries(mut self, max_retries: i64) -> Self {
        self.policy.max_retries = max_retries;
        self
    }

    /// Set the exponential backoff factor, in seconds.
    ///
    /// Default: 0.3
    pub fn backoff_factor(mut self, backoff_factor: f64) -> Self {
        self.policy.backoff_factor = backoff_factor;
        self
    }

    /// Set the jitter factor. A factor of 0.1 adds up to 10% of the base delay.
    ///
    /// Default: 0.0
    pub fn jitter_factor(mut self, jitter_factor: f64) -> Self {
        self.policy.jitter_factor = jitter_factor;
        self
    }

    /// Replace the set of retryable status codes.
    ///
    /// Default: 429, 500, 502, 503, 504
    pub fn retryable_statuses(mut self, statuses: impl IntoIterator<Item = u16>) -> Self {
        self.policy.retryable_statuses = statuses.into_iter().collect();
        self
    }

    /// Set the per-attempt timeout.
    ///
    /// Default: 10s
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.policy.timeout = timeout;
        self
    }

    /// Build the policy.
    pub fn build(self) -> RetryPolicy {
        self.policy
    }
}
