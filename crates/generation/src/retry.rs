//! Retry with backoff, shared by every external call site.
//!
//! The caller supplies the operation and a predicate deciding which errors
//! are worth another attempt; the policy supplies attempt count and delay.

use std::future::Future;
use std::time::Duration;

/// How many times to retry and how long to wait between attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first attempt. `2` means up to three attempts.
    pub max_retries: u32,
    /// Delay before the first retry.
    pub delay: Duration,
    /// Each subsequent delay is multiplied by this factor. `1` keeps the
    /// delay fixed.
    pub backoff_factor: u32,
    /// Upper bound on any single delay.
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::fixed(2, Duration::from_secs(2))
    }
}

impl RetryPolicy {
    /// Fixed delay between attempts.
    pub fn fixed(max_retries: u32, delay: Duration) -> Self {
        Self {
            max_retries,
            delay,
            backoff_factor: 1,
            max_delay: delay,
        }
    }

    /// Delay multiplied by `factor` after every retry, capped at `max_delay`.
    pub fn exponential(max_retries: u32, delay: Duration, factor: u32, max_delay: Duration) -> Self {
        Self {
            max_retries,
            delay,
            backoff_factor: factor.max(1),
            max_delay,
        }
    }

    /// Delay to wait before retry number `retry` (1-based).
    pub fn delay_for(&self, retry: u32) -> Duration {
        let factor = self
            .backoff_factor
            .saturating_pow(retry.saturating_sub(1));
        self.delay.saturating_mul(factor).min(self.max_delay)
    }
}

/// The final error after a retried operation gave up.
#[derive(Debug)]
pub struct RetryError<E> {
    /// Attempts actually made (first call included).
    pub attempts: u32,
    /// Error returned by the last attempt.
    pub last_error: E,
}

/// Run `op` until it succeeds, returns a non-retryable error, or the policy
/// is exhausted.
///
/// `op` receives the 1-based attempt number. Successful results carry the
/// number of attempts taken.
pub async fn retry_with_backoff<T, E, F, Fut, P>(
    policy: &RetryPolicy,
    is_retryable: P,
    mut op: F,
) -> Result<(T, u32), RetryError<E>>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, E>>,
    P: Fn(&E) -> bool,
    E: std::fmt::Display,
{
    let mut attempt = 1;
    loop {
        match op(attempt).await {
            Ok(value) => return Ok((value, attempt)),
            Err(e) => {
                if !is_retryable(&e) || attempt > policy.max_retries {
                    return Err(RetryError {
                        attempts: attempt,
                        last_error: e,
                    });
                }
                let delay = policy.delay_for(attempt);
                tracing::warn!(
                    attempt,
                    max_attempts = policy.max_retries + 1,
                    delay_ms = delay.as_millis() as u64,
                    error = %e,
                    "Attempt failed, retrying",
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};

    use super::*;

    #[derive(Debug, PartialEq)]
    enum TestError {
        Transient,
        Fatal,
    }

    impl std::fmt::Display for TestError {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            write!(f, "{self:?}")
        }
    }

    fn transient(e: &TestError) -> bool {
        *e == TestError::Transient
    }

    #[tokio::test(start_paused = true)]
    async fn succeeds_after_transient_failures() {
        let calls = AtomicU32::new(0);
        let counter = &calls;
        let policy = RetryPolicy::fixed(2, Duration::from_secs(2));

        let result = retry_with_backoff(&policy, transient, move |_| async move {
            if counter.fetch_add(1, Ordering::SeqCst) < 2 {
                Err(TestError::Transient)
            } else {
                Ok("done")
            }
        })
        .await;

        assert_eq!(result.unwrap(), ("done", 3));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn gives_up_after_max_retries() {
        let calls = AtomicU32::new(0);
        let counter = &calls;
        let policy = RetryPolicy::fixed(2, Duration::from_millis(10));

        let result: Result<((), u32), _> = retry_with_backoff(&policy, transient, move |_| async move {
            counter.fetch_add(1, Ordering::SeqCst);
            Err(TestError::Transient)
        })
        .await;

        let err = result.unwrap_err();
        assert_eq!(err.attempts, 3);
        assert_eq!(err.last_error, TestError::Transient);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn fatal_error_is_not_retried() {
        let calls = AtomicU32::new(0);
        let counter = &calls;
        let policy = RetryPolicy::default();

        let result: Result<((), u32), _> = retry_with_backoff(&policy, transient, move |_| async move {
            counter.fetch_add(1, Ordering::SeqCst);
            Err(TestError::Fatal)
        })
        .await;

        assert_eq!(result.unwrap_err().attempts, 1);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn fixed_policy_waits_between_attempts() {
        let policy = RetryPolicy::fixed(2, Duration::from_secs(2));
        let start = tokio::time::Instant::now();

        let _: Result<((), u32), _> =
            retry_with_backoff(&policy, transient, |_| async { Err(TestError::Transient) }).await;

        let elapsed = start.elapsed();
        assert!(elapsed >= Duration::from_secs(4), "waited only {elapsed:?}");
        assert!(elapsed < Duration::from_secs(5), "waited too long: {elapsed:?}");
    }

    #[test]
    fn exponential_delays_are_capped() {
        let policy =
            RetryPolicy::exponential(5, Duration::from_millis(100), 2, Duration::from_millis(500));
        assert_eq!(policy.delay_for(1), Duration::from_millis(100));
        assert_eq!(policy.delay_for(2), Duration::from_millis(200));
        assert_eq!(policy.delay_for(3), Duration::from_millis(400));
        assert_eq!(policy.delay_for(4), Duration::from_millis(500));
    }

    #[test]
    fn fixed_delay_never_grows() {
        let policy = RetryPolicy::fixed(2, Duration::from_secs(2));
        assert_eq!(policy.delay_for(1), policy.delay_for(2));
    }
}
