//! Retry loop: run an async operation until success or the policy says stop.

use super::error::Failure;
use super::policy::{Idempotency, RetryConfig};
use std::future::Future;

/// Runs `op` until it succeeds or `config` declares the failure terminal.
///
/// `op` receives the 0-based attempt index. A rate limit with a `Retry-After`
/// hint is slept off before the policy is consulted, and that sleep replaces
/// the policy's delay. Terminal failures are returned unchanged.
pub async fn execute<T, F, Fut>(
    mut op: F,
    idempotency: Idempotency,
    config: &RetryConfig,
) -> Result<T, Failure>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, Failure>>,
{
    let mut attempt = 0u32;
    loop {
        let failure = match op(attempt).await {
            Ok(value) => return Ok(value),
            Err(failure) => failure,
        };

        let honored_hint = match failure.retry_after() {
            Some(wait) => {
                tracing::warn!(
                    url = failure.url().unwrap_or_default(),
                    retry_after_secs = wait.as_secs(),
                    attempt,
                    "rate limited by Slack API; sleeping before retry"
                );
                tokio::time::sleep(wait).await;
                true
            }
            None => false,
        };

        let decision = config.decide(&failure, attempt, idempotency);
        if !decision.retry {
            tracing::debug!(
                kind = failure.kind(),
                status = ?failure.status(),
                attempt,
                "giving up: {}",
                failure
            );
            return Err(failure);
        }

        if !honored_hint {
            tracing::debug!(
                kind = failure.kind(),
                attempt,
                delay_ms = decision.delay.as_millis() as u64,
                "retrying after failure: {}",
                failure
            );
            tokio::time::sleep(decision.delay).await;
        }
        attempt += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::retry::FailureContext;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Mutex;
    use std::time::Duration;
    use tokio::time::Instant;

    fn quick(max_retries: u32) -> RetryConfig {
        RetryConfig::new(max_retries, Duration::from_millis(10), Duration::from_millis(50))
    }

    fn server_error(status: u16) -> Failure {
        Failure::transport(format!("HTTP {status}"), Some(status), FailureContext::for_url("https://x"))
    }

    fn rate_limited(secs: u64) -> Failure {
        Failure::rate_limited("rate limited", Some(secs), FailureContext::for_url("https://x"))
    }

    #[tokio::test(start_paused = true)]
    async fn idempotent_exhausts_budget_and_returns_last_failure() {
        let calls = AtomicU32::new(0);
        let res: Result<(), _> = execute(
            |_| {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Err(server_error(503)) }
            },
            Idempotency::Idempotent,
            &quick(3),
        )
        .await;
        assert_eq!(calls.load(Ordering::SeqCst), 4);
        assert_eq!(res.unwrap_err(), server_error(503));
    }

    #[tokio::test(start_paused = true)]
    async fn attempt_index_counts_from_zero() {
        let seen = Mutex::new(Vec::new());
        let _: Result<(), _> = execute(
            |attempt| {
                seen.lock().unwrap().push(attempt);
                async { Err(server_error(502)) }
            },
            Idempotency::Idempotent,
            &quick(2),
        )
        .await;
        assert_eq!(*seen.lock().unwrap(), vec![0, 1, 2]);
    }

    #[tokio::test(start_paused = true)]
    async fn side_effecting_5xx_runs_once() {
        let calls = AtomicU32::new(0);
        let res: Result<(), _> = execute(
            |_| {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Err(server_error(500)) }
            },
            Idempotency::SideEffecting,
            &quick(5),
        )
        .await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(res.unwrap_err().status(), Some(500));
    }

    #[tokio::test(start_paused = true)]
    async fn rate_limit_retries_side_effecting_call_after_hint() {
        let calls = AtomicU32::new(0);
        let start = Instant::now();
        let second_at = Mutex::new(None);
        let res = execute(
            |attempt| {
                calls.fetch_add(1, Ordering::SeqCst);
                if attempt == 1 {
                    *second_at.lock().unwrap() = Some(Instant::now());
                }
                async move {
                    if attempt == 0 {
                        Err(rate_limited(2))
                    } else {
                        Ok("posted")
                    }
                }
            },
            Idempotency::SideEffecting,
            &quick(3),
        )
        .await;
        assert_eq!(res.unwrap(), "posted");
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        let waited = second_at.lock().unwrap().unwrap() - start;
        assert!(waited >= Duration::from_secs(2), "waited {waited:?}");
    }

    #[tokio::test(start_paused = true)]
    async fn retry_after_overrides_zero_backoff_without_double_sleep() {
        let stamps = Mutex::new(Vec::new());
        let cfg = RetryConfig::new(3, Duration::ZERO, Duration::ZERO);
        let res = execute(
            |attempt| {
                stamps.lock().unwrap().push(Instant::now());
                async move {
                    if attempt == 0 {
                        Err(rate_limited(5))
                    } else {
                        Ok(())
                    }
                }
            },
            Idempotency::Idempotent,
            &cfg,
        )
        .await;
        assert!(res.is_ok());
        let stamps = stamps.lock().unwrap();
        let gap = stamps[1] - stamps[0];
        assert!(gap >= Duration::from_secs(5), "gap {gap:?}");
        assert!(gap < Duration::from_secs(6), "slept twice: {gap:?}");
    }

    #[tokio::test(start_paused = true)]
    async fn hint_is_honored_even_on_final_attempt() {
        let start = Instant::now();
        let res: Result<(), _> = execute(
            |_| async { Err(rate_limited(3)) },
            Idempotency::Idempotent,
            &quick(0),
        )
        .await;
        assert!(res.unwrap_err().is_rate_limited());
        assert!(Instant::now() - start >= Duration::from_secs(3));
    }

    #[tokio::test(start_paused = true)]
    async fn client_error_is_terminal_for_idempotent_call() {
        let calls = AtomicU32::new(0);
        let res: Result<(), _> = execute(
            |_| {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Err(server_error(404)) }
            },
            Idempotency::Idempotent,
            &quick(3),
        )
        .await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(res.unwrap_err().status(), Some(404));
    }

    #[tokio::test(start_paused = true)]
    async fn network_failure_depends_on_idempotency() {
        let refused = || Failure::network("connection refused", FailureContext::default());

        let calls = AtomicU32::new(0);
        let _: Result<(), _> = execute(
            |_| {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Err(refused()) }
            },
            Idempotency::Idempotent,
            &quick(2),
        )
        .await;
        assert_eq!(calls.load(Ordering::SeqCst), 3);

        let calls = AtomicU32::new(0);
        let _: Result<(), _> = execute(
            |_| {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Err(refused()) }
            },
            Idempotency::SideEffecting,
            &quick(2),
        )
        .await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn success_after_transient_failures() {
        let res = execute(
            |attempt| async move {
                if attempt < 2 {
                    Err(server_error(503))
                } else {
                    Ok(attempt)
                }
            },
            Idempotency::Idempotent,
            &quick(3),
        )
        .await;
        assert_eq!(res.unwrap(), 2);
    }

    #[derive(Clone, Default)]
    struct CapturedLog(std::sync::Arc<Mutex<Vec<u8>>>);

    impl std::io::Write for CapturedLog {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    impl CapturedLog {
        fn contents(&self) -> String {
            String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
        }
    }

    #[tokio::test(start_paused = true)]
    async fn each_honored_hint_is_logged_once() {
        let log = CapturedLog::default();
        let writer = log.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::WARN)
            .with_ansi(false)
            .with_writer(move || writer.clone())
            .finish();
        let _guard = tracing::subscriber::set_default(subscriber);

        let res = execute(
            |attempt| async move {
                match attempt {
                    0 => Err(rate_limited(2)),
                    1 => Err(Failure::rate_limited("rate limited", None, FailureContext::for_url("https://x"))),
                    2 => Err(rate_limited(1)),
                    _ => Ok(()),
                }
            },
            Idempotency::SideEffecting,
            &quick(5),
        )
        .await;
        assert!(res.is_ok());

        let output = log.contents();
        let events: Vec<&str> = output
            .lines()
            .filter(|line| line.contains("rate limited by Slack API"))
            .collect();
        assert_eq!(events.len(), 2, "{output}");
        assert!(events[0].contains("retry_after_secs=2") && events[0].contains("attempt=0"));
        assert!(events[1].contains("retry_after_secs=1") && events[1].contains("attempt=2"));
        assert!(events.iter().all(|line| line.contains("https://x")));
    }
}
