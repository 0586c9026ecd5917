//! Retry decisions: whether a failure is worth another attempt, and after how long.

use super::backoff;
use super::error::Failure;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// Whether a call is safe to repeat. Every call site must pick one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Idempotency {
    /// Reads and listings: repeating has no extra effect.
    Idempotent,
    /// Posting, reacting, editing, creating: must not be duplicated on ambiguous failure.
    SideEffecting,
}

/// Replaces the built-in eligibility rules (the attempt budget still applies).
pub type ShouldRetryFn = Arc<dyn Fn(&Failure, u32) -> bool + Send + Sync>;

/// Post-processes the computed delay: `(failure, attempt, computed) -> delay`.
pub type DelayFn = Arc<dyn Fn(&Failure, u32, Duration) -> Duration + Send + Sync>;

/// Decision returned by the retry policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryDecision {
    pub retry: bool,
    /// Wait before the next attempt. Zero when `retry` is false.
    pub delay: Duration,
}

impl RetryDecision {
    pub const STOP: RetryDecision = RetryDecision {
        retry: false,
        delay: Duration::ZERO,
    };

    pub fn after(delay: Duration) -> Self {
        Self { retry: true, delay }
    }
}

/// Per-call overrides merged over a client's defaults. Set fields win.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RetryOverrides {
    pub max_retries: Option<u32>,
    pub base_delay: Option<Duration>,
    pub max_delay: Option<Duration>,
}

/// Immutable retry configuration.
#[derive(Clone)]
pub struct RetryConfig {
    /// Retries after the first attempt; the operation runs at most `max_retries + 1` times.
    pub max_retries: u32,
    pub base_delay: Duration,
    /// Never below `base_delay`.
    pub max_delay: Duration,
    should_retry: Option<ShouldRetryFn>,
    delay_fn: Option<DelayFn>,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self::new(3, Duration::from_millis(250), Duration::from_secs(5))
    }
}

impl fmt::Debug for RetryConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RetryConfig")
            .field("max_retries", &self.max_retries)
            .field("base_delay", &self.base_delay)
            .field("max_delay", &self.max_delay)
            .field("should_retry", &self.should_retry.is_some())
            .field("delay_fn", &self.delay_fn.is_some())
            .finish()
    }
}

impl RetryConfig {
    pub fn new(max_retries: u32, base_delay: Duration, max_delay: Duration) -> Self {
        Self {
            max_retries,
            base_delay,
            max_delay: max_delay.max(base_delay),
            should_retry: None,
            delay_fn: None,
        }
    }

    pub fn with_should_retry<F>(mut self, f: F) -> Self
    where
        F: Fn(&Failure, u32) -> bool + Send + Sync + 'static,
    {
        self.should_retry = Some(Arc::new(f));
        self
    }

    pub fn with_delay<F>(mut self, f: F) -> Self
    where
        F: Fn(&Failure, u32, Duration) -> Duration + Send + Sync + 'static,
    {
        self.delay_fn = Some(Arc::new(f));
        self
    }

    /// New config with `overrides` applied on top of `self`. Hooks are kept.
    pub fn merged(&self, overrides: &RetryOverrides) -> Self {
        let base_delay = overrides.base_delay.unwrap_or(self.base_delay);
        let max_delay = overrides.max_delay.unwrap_or(self.max_delay);
        Self {
            max_retries: overrides.max_retries.unwrap_or(self.max_retries),
            base_delay,
            max_delay: max_delay.max(base_delay),
            should_retry: self.should_retry.clone(),
            delay_fn: self.delay_fn.clone(),
        }
    }

    /// Decide whether attempt `attempt` (0-based) should be followed by another, and after how long.
    ///
    /// Rules, first match wins:
    /// 1. budget exhausted (`attempt >= max_retries`): stop;
    /// 2. rate limited: retry;
    /// 3. side-effecting call: stop;
    /// 4. idempotent call: retry 5xx, unknown-status and network failures only.
    ///
    /// A rate limit carrying a `Retry-After` hint uses the hint as the delay;
    /// everything else gets jittered exponential backoff.
    pub fn decide(&self, failure: &Failure, attempt: u32, idempotency: Idempotency) -> RetryDecision {
        if attempt >= self.max_retries {
            return RetryDecision::STOP;
        }
        let eligible = match &self.should_retry {
            Some(f) => f(failure, attempt),
            None => is_retryable(failure, idempotency),
        };
        if !eligible {
            return RetryDecision::STOP;
        }

        let computed = failure
            .retry_after()
            .unwrap_or_else(|| backoff::delay(attempt, self.base_delay, self.max_delay));
        let delay = match &self.delay_fn {
            Some(f) => f(failure, attempt, computed),
            None => computed,
        };
        RetryDecision::after(delay)
    }
}

/// Built-in eligibility, ignoring the attempt budget.
pub fn is_retryable(failure: &Failure, idempotency: Idempotency) -> bool {
    match (failure, idempotency) {
        (Failure::RateLimited { .. }, _) => true,
        (_, Idempotency::SideEffecting) => false,
        (Failure::Transport { status, .. }, Idempotency::Idempotent) => {
            status.map_or(true, |s| s >= 500)
        }
        (Failure::Network { .. }, Idempotency::Idempotent) => true,
    }
}
