use crate::utils::error::{EtlError, Result};
use std::future::Future;
use std::time::Duration;

pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(5);

/// Fixed-delay bounded retry. Every error is treated as retryable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            delay,
        }
    }

    /// 執行 `operation`，失敗時等待 `delay` 後重試；嘗試次數用完回傳 `ExtractionFailed`
    pub async fn run<T, F, Fut>(&self, mut operation: F) -> Result<T>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let max_attempts = self.max_attempts.max(1);
        let mut last_error = String::new();

        for attempt in 1..=max_attempts {
            match operation(attempt).await {
                Ok(value) => return Ok(value),
                Err(e) => {
                    tracing::warn!("⚠️ Attempt {}/{} failed: {}", attempt, max_attempts, e);
                    last_error = e.to_string();
                    if attempt < max_attempts && !self.delay.is_zero() {
                        tokio::time::sleep(self.delay).await;
                    }
                }
            }
        }

        Err(EtlError::ExtractionFailed {
            attempts: max_attempts,
            last_error,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn failure() -> EtlError {
        EtlError::ServiceError {
            status: 503,
            body: "overloaded".to_string(),
        }
    }

    #[tokio::test]
    async fn test_always_failing_operation_is_attempted_three_times() {
        let calls = AtomicU32::new(0);
        let calls_ref = &calls;
        let policy = RetryPolicy::new(3, Duration::ZERO);

        let result: Result<String> = policy
            .run(|_| async move {
                calls_ref.fetch_add(1, Ordering::SeqCst);
                Err(failure())
            })
            .await;

        assert_eq!(calls.load(Ordering::SeqCst), 3);
        match result {
            Err(EtlError::ExtractionFailed {
                attempts,
                last_error,
            }) => {
                assert_eq!(attempts, 3);
                assert!(last_error.contains("503"));
            }
            other => panic!("expected ExtractionFailed, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_success_after_failure_stops_retrying() {
        let calls = AtomicU32::new(0);
        let calls_ref = &calls;
        let policy = RetryPolicy::new(3, Duration::ZERO);

        let result = policy
            .run(|attempt| async move {
                calls_ref.fetch_add(1, Ordering::SeqCst);
                if attempt < 2 {
                    Err(failure())
                } else {
                    Ok("done")
                }
            })
            .await;

        assert_eq!(result.unwrap(), "done");
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_delay_applies_only_between_attempts() {
        let delay = Duration::from_secs(5);
        let policy = RetryPolicy::new(3, delay);
        let started = tokio::time::Instant::now();

        let _: Result<()> = policy.run(|_| async { Err(failure()) }).await;

        // 三次嘗試之間只有兩次等待，最後一次失敗後不再等待
        let elapsed = started.elapsed();
        assert!(elapsed >= delay * 2, "elapsed {:?}", elapsed);
        assert!(elapsed < delay * 3, "elapsed {:?}", elapsed);
    }

    #[tokio::test(start_paused = true)]
    async fn test_no_delay_after_success() {
        let delay = Duration::from_secs(5);
        let policy = RetryPolicy::new(3, delay);
        let started = tokio::time::Instant::now();

        let result = policy
            .run(|attempt| async move {
                if attempt == 1 {
                    Err(failure())
                } else {
                    Ok(attempt)
                }
            })
            .await;

        assert_eq!(result.unwrap(), 2);
        let elapsed = started.elapsed();
        assert!(elapsed >= delay && elapsed < delay * 2, "elapsed {:?}", elapsed);
    }

    #[test]
    fn test_at_least_one_attempt() {
        assert_eq!(RetryPolicy::new(0, Duration::ZERO).max_attempts, 1);
        assert_eq!(
            RetryPolicy::new(DEFAULT_MAX_ATTEMPTS, DEFAULT_RETRY_DELAY).max_attempts,
            3
        );
    }
}
