//! Exponential backoff.

use std::time::Duration;

/// Delay to wait after the given failed attempt (1-based) before the next one.
///
/// Retry `i` (the wait after attempt `i`) is `base × 2^(i - 1)`, so the
/// second attempt waits `base`, the third `2 × base`, and so on. Attempt 0
/// never waited for anything and yields zero.
pub fn calculate_backoff(attempt: u32, base: Duration) -> Duration {
    if attempt == 0 {
        return Duration::ZERO;
    }

    let factor = 2u32.saturating_pow(attempt - 1);
    base.saturating_mul(factor)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backoff_calculation() {
        let base = Duration::from_millis(100);
        assert_eq!(calculate_backoff(1, base), Duration::from_millis(100));
        assert_eq!(calculate_backoff(2, base), Duration::from_millis(200));
        assert_eq!(calculate_backoff(3, base), Duration::from_millis(400));
        assert_eq!(calculate_backoff(0, base), Duration::ZERO);
    }

    #[test]
    fn test_backoff_is_monotonic() {
        let base = Duration::from_millis(250);
        let mut previous = Duration::ZERO;
        for attempt in 1..40 {
            let delay = calculate_backoff(attempt, base);
            assert!(delay >= previous, "attempt {} went backwards", attempt);
            previous = delay;
        }
    }

    #[test]
    fn test_zero_base_never_waits() {
        assert_eq!(calculate_backoff(5, Duration::ZERO), Duration::ZERO);
    }
}
