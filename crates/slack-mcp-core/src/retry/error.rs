//! Failure taxonomy for outbound Slack API calls.

use serde_json::Value;
use std::time::Duration;
use thiserror::Error;

/// HTTP status Slack uses to signal rate limiting.
pub const RATE_LIMIT_STATUS: u16 = 429;

/// Where a failure came from, kept for logging and for callers that re-wrap it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FailureContext {
    /// Request URL, if the failure is tied to one.
    pub url: Option<String>,
    /// Structured extras (resource identifiers, raw status, ...).
    pub details: Option<Value>,
}

impl FailureContext {
    pub fn for_url(url: impl Into<String>) -> Self {
        Self {
            url: Some(url.into()),
            details: None,
        }
    }

    pub fn with_details(mut self, details: Value) -> Self {
        self.details = Some(details);
        self
    }
}

/// One failed attempt of an outbound call. Exactly one variant applies.
///
/// The retry loop hands the same value back to the caller once it decides
/// the failure is terminal, so everything needed for diagnostics lives here.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum Failure {
    /// HTTP 429. `retry_after_secs` is the parsed `Retry-After` hint, if usable.
    #[error("{message}")]
    RateLimited {
        message: String,
        retry_after_secs: Option<u64>,
        context: FailureContext,
    },
    /// A response arrived but was not successful (or its status is unknown).
    #[error("{message}")]
    Transport {
        message: String,
        status: Option<u16>,
        context: FailureContext,
    },
    /// No response at all (DNS, connect, reset, ...).
    #[error("{message}")]
    Network {
        message: String,
        context: FailureContext,
    },
}

impl Failure {
    pub fn rate_limited(
        message: impl Into<String>,
        retry_after_secs: Option<u64>,
        context: FailureContext,
    ) -> Self {
        Failure::RateLimited {
            message: message.into(),
            retry_after_secs,
            context,
        }
    }

    pub fn transport(message: impl Into<String>, status: Option<u16>, context: FailureContext) -> Self {
        Failure::Transport {
            message: message.into(),
            status,
            context,
        }
    }

    pub fn network(message: impl Into<String>, context: FailureContext) -> Self {
        Failure::Network {
            message: message.into(),
            context,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            Failure::RateLimited { message, .. }
            | Failure::Transport { message, .. }
            | Failure::Network { message, .. } => message,
        }
    }

    /// HTTP status, when one was received. Rate limits are always 429.
    pub fn status(&self) -> Option<u16> {
        match self {
            Failure::RateLimited { .. } => Some(RATE_LIMIT_STATUS),
            Failure::Transport { status, .. } => *status,
            Failure::Network { .. } => None,
        }
    }

    pub fn context(&self) -> &FailureContext {
        match self {
            Failure::RateLimited { context, .. }
            | Failure::Transport { context, .. }
            | Failure::Network { context, .. } => context,
        }
    }

    pub fn url(&self) -> Option<&str> {
        self.context().url.as_deref()
    }

    pub fn is_rate_limited(&self) -> bool {
        matches!(self, Failure::RateLimited { .. })
    }

    /// Server-supplied cooldown, only for rate limits that carried a usable hint.
    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            Failure::RateLimited {
                retry_after_secs: Some(secs),
                ..
            } => Some(Duration::from_secs(*secs)),
            _ => None,
        }
    }

    /// Short kind label for logs and tool error payloads.
    pub fn kind(&self) -> &'static str {
        match self {
            Failure::RateLimited { .. } => "rate_limited",
            Failure::Transport { .. } => "transport",
            Failure::Network { .. } => "network",
        }
    }
}
