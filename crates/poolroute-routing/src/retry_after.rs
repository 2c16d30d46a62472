//! Retry-After header parsing
//!
//! Throttled responses carry their retry hint in the `retry-after` header as
//! a whole number of seconds. Any other form, HTTP-dates included, is treated
//! as unparseable so the caller falls back to its default cooldown.

use http::HeaderMap;
use http::header::RETRY_AFTER;
use std::time::Duration;
use tracing::debug;

/// Parse a `retry-after` header value into seconds from now.
///
/// # Examples
/// ```
/// use poolroute_routing::parse_retry_after;
///
/// assert_eq!(parse_retry_after("60"), Some(60));
/// assert_eq!(parse_retry_after("invalid"), None);
/// assert_eq!(parse_retry_after(""), None);
/// ```
pub fn parse_retry_after(header_value: &str) -> Option<u64> {
    match header_value.trim().parse::<u64>() {
        Ok(seconds) => Some(seconds),
        Err(_) => {
            debug!(header_value, "Failed to parse retry-after header");
            None
        }
    }
}

/// Retry hint carried by a throttled response, if any
///
/// `None` means the header is missing, not valid UTF-8, or unparseable; the
/// caller applies its default cooldown.
pub fn retry_after_from_headers(headers: &HeaderMap) -> Option<Duration> {
    headers
        .get(RETRY_AFTER)
        .and_then(|value| value.to_str().ok())
        .and_then(parse_retry_after)
        .map(Duration::from_secs)
}
