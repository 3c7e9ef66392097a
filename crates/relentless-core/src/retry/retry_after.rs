//! Server-specified retry delays (`Retry-After`).

use super::backoff::duration_from_secs;
use chrono::{DateTime, Utc};
use std::time::Duration;

/// A parsed `Retry-After` hint.
///
/// The header carries either a number of seconds or an HTTP date. Dates are
/// kept as absolute instants and only turned into a wait when the delay is
/// computed, so that time spent between receiving the response and deciding
/// on the wait is not counted twice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryAfter {
    /// Relative delay.
    Delay(Duration),

    /// Absolute instant after which the request may be retried.
    At(DateTime<Utc>),
}

impl RetryAfter {
    /// Parse a `Retry-After` header value.
    ///
    /// Accepts a decimal number of seconds (negative values clamp to zero) or
    /// an RFC 2822 / IMF-fixdate timestamp. Returns `None` for anything else.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use relentless_core::retry::RetryAfter;
    /// use std::time::Duration;
    ///
    /// assert_eq!(RetryAfter::parse("120"), Some(RetryAfter::Delay(Duration::from_secs(120))));
    /// assert!(matches!(RetryAfter::parse("Wed, 21 Oct 2015 07:28:00 GMT"), Some(RetryAfter::At(_))));
    /// assert_eq!(RetryAfter::parse("soon"), None);
    /// ```
    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim();
        if value.is_empty() {
            return None;
        }

        if let Ok(seconds) = value.parse::<f64>()
            && seconds.is_finite()
        {
            return Some(Self::Delay(duration_from_secs(seconds)));
        }

        match DateTime::parse_from_rfc2822(value) {
            Ok(at) => Some(Self::At(at.with_timezone(&Utc))),
            Err(err) => {
                tracing::debug!(value, error = %err, "Ignoring unparseable Retry-After header");
                None
            }
        }
    }

    /// Wait implied by this hint, measured from `now`. Never negative.
    pub fn delay_from(&self, now: DateTime<Utc>) -> Duration {
        match self {
            Self::Delay(delay) => *delay,
            Self::At(at) => (*at - now).to_std().unwrap_or(Duration::ZERO),
        }
    }
}
