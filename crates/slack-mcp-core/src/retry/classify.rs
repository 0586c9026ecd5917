//! Classify HTTP responses and curl errors into [`Failure`] kinds.

use super::error::{Failure, FailureContext, RATE_LIMIT_STATUS};
use serde_json::json;

/// Parse a `Retry-After` header value into whole seconds.
///
/// Accepts a leading run of digits (optionally signed, surrounding text ignored).
/// Missing, non-numeric and negative values all mean "no hint".
pub fn parse_retry_after(raw: Option<&str>) -> Option<u64> {
    let s = raw?.trim_start();
    let (negative, digits) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    if end == 0 {
        return None;
    }
    let n: u64 = digits[..end].parse().ok()?;
    if negative && n != 0 {
        return None;
    }
    Some(n)
}

/// Classify a completed HTTP exchange. Returns `None` for any 2xx status.
///
/// `reason` is the status line's reason phrase (may be empty).
pub fn classify_response(
    status: u16,
    reason: &str,
    retry_after: Option<&str>,
    url: &str,
    what: &str,
) -> Option<Failure> {
    if (200..300).contains(&status) {
        return None;
    }
    let context = FailureContext::for_url(url).with_details(json!({ "url": url, "status": status }));
    if status == RATE_LIMIT_STATUS {
        return Some(Failure::rate_limited(
            format!("{what} rate limited"),
            parse_retry_after(retry_after),
            context,
        ));
    }
    let message = if reason.is_empty() {
        format!("{what} HTTP error: {status}")
    } else {
        format!("{what} HTTP error: {status} {reason}")
    };
    Some(Failure::transport(message, Some(status), context))
}

/// Classify a curl error. No HTTP response was obtained, so this is a network failure.
pub fn classify_curl_error(e: &curl::Error, url: &str) -> Failure {
    let cause = if e.is_operation_timedout() {
        "timeout"
    } else if e.is_couldnt_resolve_host() || e.is_couldnt_resolve_proxy() {
        "dns"
    } else if e.is_couldnt_connect() {
        "connect"
    } else if e.is_read_error() || e.is_recv_error() || e.is_send_error() || e.is_got_nothing() {
        "io"
    } else {
        "other"
    };
    Failure::network(
        format!("request to {url} failed: {e}"),
        FailureContext::for_url(url).with_details(json!({ "url": url, "cause": cause })),
    )
}
