//! Retry and backoff policy for outbound Slack API calls.
//!
//! Failures are classified into a small taxonomy (rate limited, transport,
//! network); a stateless policy decides per attempt whether to retry and how
//! long to wait, taking the caller's idempotency into account; `execute`
//! drives the loop and honors server-supplied `Retry-After` hints.

mod backoff;
mod classify;
mod error;
mod policy;
mod run;

pub use backoff::{ceiling as backoff_ceiling, delay as backoff_delay, delay_with as backoff_delay_with};
pub use classify::{classify_curl_error, classify_response, parse_retry_after};
pub use error::{Failure, FailureContext, RATE_LIMIT_STATUS};
pub use policy::{
    is_retryable, DelayFn, Idempotency, RetryConfig, RetryDecision, RetryOverrides, ShouldRetryFn,
};
pub use run::execute;
