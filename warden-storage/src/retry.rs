//! Bounded retry and timeout policy for store calls.

use std::future::Future;
use std::time::Duration;
use warden_core::StoreError;

/// Per-attempt timeout plus a bounded number of retries.
///
/// No call made through a policy can block longer than
/// `timeout * (max_retries + 1)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Budget for a single attempt.
    pub timeout: Duration,
    /// Attempts made after the first one fails.
    pub max_retries: u32,
}

impl RetryPolicy {
    pub fn new(timeout: Duration, max_retries: u32) -> Self {
        Self {
            timeout,
            max_retries,
        }
    }

    /// A single attempt bounded by `timeout`.
    pub fn no_retry(timeout: Duration) -> Self {
        Self::new(timeout, 0)
    }

    /// Total number of attempts the policy allows.
    pub fn attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }

    /// Run `attempt` until it succeeds or the policy is exhausted, returning
    /// the last failure.
    ///
    /// Retried operations may have been applied by the store even though the
    /// attempt failed (a timed-out increment can still land), so callers
    /// must tolerate at-least-once effects.
    pub async fn run<T, F, Fut>(
        &self,
        store: &'static str,
        operation: &'static str,
        mut attempt: F,
    ) -> Result<T, StoreError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, StoreError>>,
    {
        let attempts = self.attempts();
        let mut last_error = StoreError::Timeout {
            store,
            operation,
            after: self.timeout,
        };

        for attempt_number in 1..=attempts {
            match tokio::time::timeout(self.timeout, attempt()).await {
                Ok(Ok(value)) => return Ok(value),
                Ok(Err(err)) => last_error = err,
                Err(_) => {
                    last_error = StoreError::Timeout {
                        store,
                        operation,
                        after: self.timeout,
                    }
                }
            }

            if attempt_number < attempts {
                tracing::debug!(
                    store,
                    operation,
                    attempt = attempt_number,
                    error = %last_error,
                    "Store call failed, retrying"
                );
            }
        }

        Err(last_error)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(Duration::from_millis(500), 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[tokio::test]
    async fn test_returns_first_success() {
        let counter = AtomicU32::new(0);
        let calls = &counter;
        let policy = RetryPolicy::default();

        let result = policy
            .run("counter-store", "get", move || async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok::<_, StoreError>(7)
            })
            .await;

        assert_eq!(result, Ok(7));
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_retries_once_then_gives_up() {
        let counter = AtomicU32::new(0);
        let calls = &counter;
        let policy = RetryPolicy::new(Duration::from_millis(50), 1);

        let result: Result<(), StoreError> = policy
            .run("counter-store", "incr", move || async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(StoreError::unavailable("counter-store", "connection refused"))
            })
            .await;

        assert_eq!(counter.load(Ordering::SeqCst), 2);
        assert_eq!(
            result,
            Err(StoreError::unavailable("counter-store", "connection refused"))
        );
    }

    #[tokio::test]
    async fn test_recovers_on_retry() {
        let counter = AtomicU32::new(0);
        let calls = &counter;
        let policy = RetryPolicy::new(Duration::from_millis(50), 1);

        let result = policy
            .run("counter-store", "incr", move || async move {
                if calls.fetch_add(1, Ordering::SeqCst) == 0 {
                    Err(StoreError::unavailable("counter-store", "reset by peer"))
                } else {
                    Ok(1)
                }
            })
            .await;

        assert_eq!(result, Ok(1));
    }

    #[tokio::test(start_paused = true)]
    async fn test_hung_call_times_out() {
        let policy = RetryPolicy::no_retry(Duration::from_millis(100));

        let result: Result<(), StoreError> = policy
            .run("document-store", "get", || async {
                tokio::time::sleep(Duration::from_secs(60)).await;
                Ok(())
            })
            .await;

        assert!(matches!(
            result,
            Err(StoreError::Timeout { operation: "get", .. })
        ));
    }
}
