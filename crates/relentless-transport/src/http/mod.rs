//! HTTP transports backed by reqwest
//!
//! [`HttpTransport`] suspends on the async runtime; [`BlockingHttpTransport`]
//! (feature `blocking`) waits on the calling thread. Neither retries.

#[cfg(feature = "blocking")]
pub mod blocking;
pub mod client;

#[cfg(feature = "blocking")]
pub use blocking::BlockingHttpTransport;
pub use client::{HttpTransport, HttpTransportConfig};

use crate::error::{Result, TransportError};
use http::header::{HeaderMap, HeaderName, HeaderValue};
use std::collections::HashMap;

/// `User-Agent` sent when none is configured
pub const DEFAULT_USER_AGENT: &str = concat!("relentless/", env!("CARGO_PKG_VERSION"));

/// Build a header map, rejecting names or values that are not valid HTTP.
pub(crate) fn header_map(headers: &HashMap<String, String>) -> Result<HeaderMap> {
    let mut map = HeaderMap::with_capacity(headers.len());
    for (key, value) in headers {
        let name = HeaderName::from_bytes(key.as_bytes())
            .map_err(|e| TransportError::InvalidRequest(format!("header name {key:?}: {e}")))?;
        let value = HeaderValue::from_str(value)
            .map_err(|e| TransportError::InvalidRequest(format!("header {key:?}: {e}")))?;
        map.insert(name, value);
    }
    Ok(map)
}

/// Flatten response headers; repeated headers are joined with `", "`.
pub(crate) fn collect_headers(headers: &HeaderMap) -> HashMap<String, String> {
    let mut collected: HashMap<String, String> = HashMap::with_capacity(headers.len());
    for (key, value) in headers {
        let Ok(value) = value.to_str() else {
            continue;
        };
        collected
            .entry(key.to_string())
            .and_modify(|existing| {
                existing.push_str(", ");
                existing.push_str(value);
            })
            .or_insert_with(|| value.to_string());
    }
    collected
}
