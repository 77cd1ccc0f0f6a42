//! Retry logic.
//!
//! # Responsibilities
//! - Hold the per-call retry policy (attempt budget, base delay)
//! - Run a persistence operation until success, permanent failure, or budget
//! - Suspend cooperatively between attempts
//!
//! # Design Decisions
//! - A policy with zero attempts cannot be constructed
//! - The caller always receives the operation's own error, never a wrapper
//! - Retry traces are observability only

use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

use thiserror::Error;

use crate::config::RetryConfig;
use crate::observability::metrics;
use crate::resilience::backoff::calculate_backoff;
use crate::resilience::classify::{AttemptOutcome, Classify, ErrorClass};

/// Rejected policy parameters.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PolicyError {
    #[error("max_attempts must be at least 1")]
    ZeroAttempts,
}

/// Immutable retry parameters for one executor call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    max_attempts: u32,
    base_delay: Duration,
}

impl RetryPolicy {
    pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;
    pub const DEFAULT_BASE_DELAY: Duration = Duration::from_millis(1000);

    pub fn new(max_attempts: u32, base_delay: Duration) -> Result<Self, PolicyError> {
        if max_attempts == 0 {
            return Err(PolicyError::ZeroAttempts);
        }
        Ok(Self {
            max_attempts,
            base_delay,
        })
    }

    /// Policy that makes a single attempt.
    pub fn no_retry() -> Self {
        Self {
            max_attempts: 1,
            base_delay: Duration::ZERO,
        }
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    pub fn base_delay(&self) -> Duration {
        self.base_delay
    }

    /// Same attempt budget with a different base delay.
    pub fn with_base_delay(self, base_delay: Duration) -> Self {
        Self { base_delay, ..self }
    }

    /// Delay slept before the given 1-based attempt.
    pub fn delay_before(&self, attempt: u32) -> Duration {
        calculate_backoff(attempt.saturating_sub(1), self.base_delay)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: Self::DEFAULT_MAX_ATTEMPTS,
            base_delay: Self::DEFAULT_BASE_DELAY,
        }
    }
}

impl TryFrom<&RetryConfig> for RetryPolicy {
    type Error = PolicyError;

    fn try_from(config: &RetryConfig) -> Result<Self, Self::Error> {
        RetryPolicy::new(config.max_attempts, Duration::from_millis(config.base_delay_ms))
    }
}

/// Run `op` under `policy`, retrying transient failures with backoff.
///
/// Dropping the returned future cancels any pending backoff and no further
/// attempt is made.
pub async fn execute<T, E, F, Fut>(policy: &RetryPolicy, op: F) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Classify + Display,
{
    execute_until(policy, op, std::future::pending::<()>()).await
}

/// Like [`execute`], but stops waiting as soon as `cancel` resolves.
///
/// A cancellation that fires during a backoff returns the last observed error.
/// An attempt already in flight is allowed to finish.
pub async fn execute_until<T, E, F, Fut, C>(policy: &RetryPolicy, mut op: F, cancel: C) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Classify + Display,
    C: Future<Output = ()>,
{
    tokio::pin!(cancel);
    let mut attempt = 0u32;

    loop {
        attempt += 1;
        let attempts_left = attempt < policy.max_attempts;

        let err = match AttemptOutcome::from_attempt(op().await, attempts_left) {
            AttemptOutcome::Success(value) => return Ok(value),
            AttemptOutcome::PermanentFailure(err) => {
                metrics::record_permanent_failure(err.classify());
                return Err(err);
            }
            AttemptOutcome::TransientFailure(err) => err,
        };

        let delay = calculate_backoff(attempt, policy.base_delay);
        let code = match err.classify() {
            ErrorClass::Transient(code) => code.as_str(),
            ErrorClass::Permanent => "permanent",
        };
        tracing::warn!(
            attempt,
            max_attempts = policy.max_attempts,
            delay_ms = delay.as_millis() as u64,
            code,
            error = %err,
            "Persistence call failed, retrying"
        );
        metrics::record_retry(code);

        tokio::select! {
            biased;
            _ = &mut cancel => {
                tracing::info!(attempt, "Retry loop cancelled during backoff");
                return Err(err);
            }
            _ = tokio::time::sleep(delay) => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resilience::classify::ConnectivityCode;
    use std::fmt;
    use tokio::time::Instant;

    #[derive(Debug, Clone, PartialEq, Eq)]
    enum TestError {
        Net(ConnectivityCode),
        Validation(&'static str),
    }

    impl fmt::Display for TestError {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            match self {
                TestError::Net(code) => write!(f, "net: {}", code),
                TestError::Validation(msg) => write!(f, "invalid: {}", msg),
            }
        }
    }

    impl Classify for TestError {
        fn classify(&self) -> ErrorClass {
            match self {
                TestError::Net(code) => ErrorClass::Transient(*code),
                TestError::Validation(_) => ErrorClass::Permanent,
            }
        }
    }

    fn policy(attempts: u32, base_ms: u64) -> RetryPolicy {
        RetryPolicy::new(attempts, Duration::from_millis(base_ms)).unwrap()
    }

    // Paused-clock timers still round deadlines to the millisecond.
    fn assert_close(actual: Duration, expected: Duration) {
        assert!(
            actual >= expected && actual <= expected + Duration::from_millis(2),
            "expected ~{:?}, got {:?}",
            expected,
            actual
        );
    }

    #[test]
    fn test_zero_attempts_rejected() {
        assert_eq!(
            RetryPolicy::new(0, Duration::from_millis(10)),
            Err(PolicyError::ZeroAttempts)
        );
    }

    #[test]
    fn test_default_policy() {
        let p = RetryPolicy::default();
        assert_eq!(p.max_attempts(), 3);
        assert_eq!(p.base_delay(), Duration::from_millis(1000));
    }

    #[test]
    fn test_delay_before_attempt() {
        let p = policy(4, 100);
        assert_eq!(p.delay_before(1), Duration::ZERO);
        assert_eq!(p.delay_before(2), Duration::from_millis(100));
        assert_eq!(p.delay_before(3), Duration::from_millis(200));
        assert_eq!(p.delay_before(4), Duration::from_millis(400));
    }

    #[tokio::test(start_paused = true)]
    async fn test_recovers_after_transient_failures() {
        let mut calls = Vec::new();
        let start = Instant::now();

        let result = execute(&policy(3, 100), || {
            calls.push(start.elapsed());
            let n = calls.len();
            async move {
                if n < 3 {
                    Err(TestError::Net(ConnectivityCode::ConnectTimeout))
                } else {
                    Ok("saved")
                }
            }
        })
        .await;

        assert_eq!(result, Ok("saved"));
        assert_eq!(calls.len(), 3);
        assert_eq!(calls[0], Duration::ZERO);
        assert_close(calls[1] - calls[0], Duration::from_millis(100));
        assert_close(calls[2] - calls[1], Duration::from_millis(200));
    }

    #[tokio::test(start_paused = true)]
    async fn test_permanent_failure_is_not_retried() {
        let mut calls = 0;
        let start = Instant::now();

        let result: Result<(), _> = execute(&policy(3, 100), || {
            calls += 1;
            async { Err(TestError::Validation("title")) }
        })
        .await;

        assert_eq!(result, Err(TestError::Validation("title")));
        assert_eq!(calls, 1);
        assert_eq!(start.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_exhausted_budget_returns_original_error() {
        for attempts in 1..=5 {
            let mut calls = 0;
            let result: Result<(), _> = execute(&policy(attempts, 10), || {
                calls += 1;
                async { Err(TestError::Net(ConnectivityCode::Unreachable)) }
            })
            .await;

            assert_eq!(result, Err(TestError::Net(ConnectivityCode::Unreachable)));
            assert_eq!(calls, attempts);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_single_attempt_never_waits() {
        let mut calls = 0;
        let start = Instant::now();
        let result: Result<(), _> = execute(&RetryPolicy::no_retry(), || {
            calls += 1;
            async { Err(TestError::Net(ConnectivityCode::ConnectionClosed)) }
        })
        .await;

        assert!(result.is_err());
        assert_eq!(calls, 1);
        assert_eq!(start.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_success_first_time() {
        let mut calls = 0;
        let start = Instant::now();
        let result: Result<u32, TestError> = execute(&RetryPolicy::default(), || {
            calls += 1;
            async { Ok(42) }
        })
        .await;

        assert_eq!(result, Ok(42));
        assert_eq!(calls, 1);
        assert_eq!(start.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_during_backoff() {
        let mut calls = 0;
        let cancel = tokio::time::sleep(Duration::from_millis(50));

        let result: Result<(), _> = execute_until(
            &policy(5, 1000),
            || {
                calls += 1;
                async { Err(TestError::Net(ConnectivityCode::OperationTimeout)) }
            },
            cancel,
        )
        .await;

        assert_eq!(result, Err(TestError::Net(ConnectivityCode::OperationTimeout)));
        assert_eq!(calls, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_concurrent_calls_are_independent() {
        let p = policy(3, 100);
        let flaky = async {
            let mut n = 0;
            execute(&p, || {
                n += 1;
                let attempt = n;
                async move {
                    if attempt == 1 {
                        Err(TestError::Net(ConnectivityCode::Unreachable))
                    } else {
                        Ok(attempt)
                    }
                }
            })
            .await
        };
        let steady = async {
            let mut n = 0;
            execute(&p, || {
                n += 1;
                let attempt = n;
                async move { Ok::<_, TestError>(attempt) }
            })
            .await
        };

        let (a, b) = tokio::join!(flaky, steady);
        assert_eq!(a, Ok(2));
        assert_eq!(b, Ok(1));
    }
}
