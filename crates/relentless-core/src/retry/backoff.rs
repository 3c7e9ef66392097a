//! Backoff calculator: exponential delay with additive jitter.
//!
//! # Formula
//!
//! For retry `n` (0-indexed: `n = 0` is the wait before the first retry):
//! ```text
//! base_delay  = retry_after_hint            if the server sent one
//!             = backoff_factor * 2^n        otherwise
//! final_delay = base_delay + uniform[0, jitter_factor) * base_delay
//! ```
//!
//! Jitter only ever adds to the base, and it is applied to server hints too so
//! that many clients handed the same hint still spread out.

use super::retry_after::RetryAfter;
use crate::policy::RetryPolicy;
use chrono::Utc;
use rand::Rng;
use std::time::Duration;

/// Delay before the retry that follows attempt `attempt` (0-indexed).
pub fn next_delay(attempt: u32, policy: &RetryPolicy, suggested: Option<&RetryAfter>) -> Duration {
    let hint = suggested.map(|hint| hint.delay_from(Utc::now()));
    next_delay_with_rng(
        attempt,
        policy.backoff_factor,
        policy.jitter_factor,
        hint,
        &mut rand::thread_rng(),
    )
}

/// [`next_delay`] with an explicit random source and an already-normalized hint.
pub fn next_delay_with_rng<G: Rng + ?Sized>(
    attempt: u32,
    backoff_factor: f64,
    jitter_factor: f64,
    hint: Option<Duration>,
    rng: &mut G,
) -> Duration {
    let base = match hint {
        Some(hint) => hint.as_secs_f64(),
        None => exponential_secs(attempt, backoff_factor),
    };

    let total = if jitter_factor > 0.0 && jitter_factor.is_finite() && base > 0.0 {
        base + rng.gen_range(0.0..jitter_factor) * base
    } else {
        base
    };

    duration_from_secs(total)
}

/// `backoff_factor * 2^attempt`, in seconds.
pub fn exponential_secs(attempt: u32, backoff_factor: f64) -> f64 {
    let exponent = i32::try_from(attempt).unwrap_or(i32::MAX);
    backoff_factor * 2f64.powi(exponent)
}

/// Seconds to `Duration`, clamping negatives and NaN to zero and saturating on overflow.
pub(crate) fn duration_from_secs(seconds: f64) -> Duration {
    if seconds.is_nan() || seconds <= 0.0 {
        return Duration::ZERO;
    }
    Duration::try_from_secs_f64(seconds).unwrap_or(Duration::MAX)
}
