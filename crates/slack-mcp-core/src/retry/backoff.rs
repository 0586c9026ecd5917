//! Exponential backoff with full jitter.

use rand::Rng;
use std::time::Duration;

/// Past this exponent `base * 2^n` exceeds any sane `max_delay`, so the clamp wins anyway.
const MAX_EXPONENT: u32 = 31;

/// Upper bound for the wait before retry `attempt` (0-based): `base * 2^attempt`
/// clamped to `[base, max]`.
pub fn ceiling(attempt: u32, base: Duration, max: Duration) -> Duration {
    let raw = base.saturating_mul(1u32 << attempt.min(MAX_EXPONENT));
    raw.max(base).min(max.max(base))
}

/// Full-jitter delay: uniform in `[0, ceiling(attempt, base, max)]`.
pub fn delay(attempt: u32, base: Duration, max: Duration) -> Duration {
    delay_with(&mut rand::thread_rng(), attempt, base, max)
}

pub fn delay_with<R: Rng + ?Sized>(
    rng: &mut R,
    attempt: u32,
    base: Duration,
    max: Duration,
) -> Duration {
    let upper = ceiling(attempt, base, max);
    if upper.is_zero() {
        return Duration::ZERO;
    }
    rng.gen_range(Duration::ZERO..=upper)
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE: Duration = Duration::from_millis(250);
    const MAX: Duration = Duration::from_millis(5000);

    #[test]
    fn ceiling_starts_at_base() {
        assert_eq!(ceiling(0, BASE, MAX), BASE);
    }

    #[test]
    fn ceiling_doubles_then_caps() {
        assert_eq!(ceiling(1, BASE, MAX), Duration::from_millis(500));
        assert_eq!(ceiling(3, BASE, MAX), Duration::from_millis(2000));
        assert_eq!(ceiling(5, BASE, MAX), MAX);
    }

    #[test]
    fn ceiling_does_not_overflow_for_huge_attempts() {
        assert_eq!(ceiling(u32::MAX, BASE, MAX), MAX);
        let hour = Duration::from_secs(3600);
        assert_eq!(ceiling(64, hour, Duration::MAX), hour * (1u32 << 31));
    }

    #[test]
    fn zero_base_and_max_yield_zero() {
        assert_eq!(delay(4, Duration::ZERO, Duration::ZERO), Duration::ZERO);
    }

    #[test]
    fn jitter_stays_within_bounds_and_varies() {
        let upper = Duration::from_millis(2000);
        let samples: Vec<f64> = (0..1000)
            .map(|_| delay(3, BASE, MAX))
            .inspect(|d| assert!(*d <= upper, "{d:?} above {upper:?}"))
            .map(|d| d.as_secs_f64())
            .collect();
        let mean = samples.iter().sum::<f64>() / samples.len() as f64;
        let variance =
            samples.iter().map(|s| (s - mean).powi(2)).sum::<f64>() / samples.len() as f64;
        assert!(variance > 0.0);
    }
}
