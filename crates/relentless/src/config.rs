//! Configuration for the relentless client

use relentless_core::RetryPolicy;
use relentless_transport::{DEFAULT_USER_AGENT, HttpTransportConfig};
use std::collections::HashMap;
use std::time::Duration;

/// Default connection timeout for the built-in transport.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

/// Default number of idle pooled connections kept per host.
pub const DEFAULT_POOL_MAX_IDLE_PER_HOST: usize = 10;

/// Configuration for a [`Client`](crate::Client) or
/// [`BlockingClient`](crate::BlockingClient).
///
/// `policy` is the default for every call made through the client; a call can
/// override any of its fields through [`RequestOptions`](crate::RequestOptions).
/// The remaining fields only affect the transport the client builds for
/// itself and are ignored when a transport is supplied.
#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    /// Default retry policy
    pub policy: RetryPolicy,

    /// Connection timeout
    pub connect_timeout: Duration,

    /// Maximum idle connections per host
    pub pool_max_idle_per_host: usize,

    /// `User-Agent` header value
    pub user_agent: String,

    /// Custom headers to include with every request
    pub default_headers: HashMap<String, String>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            policy: RetryPolicy::default(),
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            pool_max_idle_per_host: DEFAULT_POOL_MAX_IDLE_PER_HOST,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            default_headers: HashMap::new(),
        }
    }
}

impl ClientConfig {
    /// Create a configuration with the given retry policy.
    pub fn with_policy(policy: RetryPolicy) -> Self {
        Self {
            policy,
            ..Default::default()
        }
    }

    /// Load configuration from environment variables.
    ///
    /// A `.env` file in the working directory is honoured. This will look for:
    /// - `RELENTLESS_TIMEOUT` for the per-attempt timeout (in seconds, fractions allowed)
    /// - `RELENTLESS_MAX_RETRIES` for the number of retries
    /// - `RELENTLESS_BACKOFF_FACTOR` for the exponential backoff factor
    /// - `RELENTLESS_JITTER_FACTOR` for the jitter fraction
    /// - `RELENTLESS_RETRY_STATUSES` for the retryable status codes, comma-separated
    ///
    /// Unset variables keep their defaults. Values are only parsed here; range
    /// checks happen when a call validates the policy.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`](crate::Error::Config) if a variable is set
    /// but cannot be parsed.
    #[cfg(feature = "env")]
    pub fn from_env() -> Result<Self, crate::error::Error> {
        let mut config = Self::default();

        if let Some(timeout) = env_var("RELENTLESS_TIMEOUT") {
            let secs = parse::<f64>("RELENTLESS_TIMEOUT", &timeout)?;
            // Negative and NaN become zero and fail validation at call time.
            config.policy.timeout = Duration::try_from_secs_f64(secs.max(0.0)).map_err(|e| {
                crate::error::Error::Config(format!("RELENTLESS_TIMEOUT={timeout:?}: {e}"))
            })?;
        }

        if let Some(max_retries) = env_var("RELENTLESS_MAX_RETRIES") {
            config.policy.max_retries = parse("RELENTLESS_MAX_RETRIES", &max_retries)?;
        }

        if let Some(backoff) = env_var("RELENTLESS_BACKOFF_FACTOR") {
            config.policy.backoff_factor = parse("RELENTLESS_BACKOFF_FACTOR", &backoff)?;
        }

        if let Some(jitter) = env_var("RELENTLESS_JITTER_FACTOR") {
            config.policy.jitter_factor = parse("RELENTLESS_JITTER_FACTOR", &jitter)?;
        }

        if let Some(statuses) = env_var("RELENTLESS_RETRY_STATUSES") {
            config.policy.retryable_statuses = statuses
                .split(',')
                .map(str::trim)
                .filter(|code| !code.is_empty())
                .map(|code| parse::<u16>("RELENTLESS_RETRY_STATUSES", code))
                .collect::<Result<_, _>>()?;
        }

        Ok(config)
    }

    /// Merge this configuration with another, with the other taking precedence.
    ///
    /// A field of `other` wins whenever it differs from the default.
    pub fn merge(mut self, other: ClientConfig) -> Self {
        let defaults = Self::default();

        self.policy = merge_policy(self.policy, other.policy, &defaults.policy);
        if other.connect_timeout != defaults.connect_timeout {
            self.connect_timeout = other.connect_timeout;
        }
        if other.pool_max_idle_per_host != defaults.pool_max_idle_per_host {
            self.pool_max_idle_per_host = other.pool_max_idle_per_host;
        }
        if other.user_agent != defaults.user_agent {
            self.user_agent = other.user_agent;
        }
        self.default_headers.extend(other.default_headers);

        self
    }

    /// Connection settings for the built-in transport.
    pub fn transport_config(&self) -> HttpTransportConfig {
        HttpTransportConfig {
            connect_timeout: self.connect_timeout,
            pool_max_idle_per_host: self.pool_max_idle_per_host,
            user_agent: self.user_agent.clone(),
            default_headers: self.default_headers.clone(),
        }
    }
}

fn merge_policy(mut base: RetryPolicy, other: RetryPolicy, defaults: &RetryPolicy) -> RetryPolicy {
    if other.max_retries != defaults.max_retries {
        base.max_retries = other.max_retries;
    }
    if other.backoff_factor != defaults.backoff_factor {
        base.backoff_factor = other.backoff_factor;
    }
    if other.jitter_factor != defaults.jitter_factor {
        base.jitter_factor = other.jitter_factor;
    }
    if other.retryable_statuses != defaults.retryable_statuses {
        base.retryable_statuses = other.retryable_statuses;
    }
    if other.timeout != defaults.timeout {
        base.timeout = other.timeout;
    }
    base
}

#[cfg(feature = "env")]
fn env_var(name: &str) -> Option<String> {
    dotenvy::var(name).ok().filter(|value| !value.trim().is_empty())
}

#[cfg(feature = "env")]
fn parse<T>(name: &str, value: &str) -> Result<T, crate::error::Error>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    value
        .trim()
        .parse()
        .map_err(|e| crate::error::Error::Config(format!("{name}={value:?}: {e}")))
}
