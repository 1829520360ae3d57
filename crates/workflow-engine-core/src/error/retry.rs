//! Retry policy for I/O-only durable steps (spec.md §4.1: "R≥1 for I/O-only
//! steps like persistence"). Node execution itself defaults to `R = 0` — nodes
//! are assumed to retry internally or be idempotent.

use std::time::Duration;

use rand::Rng;

use super::WorkflowError;

/// Exponential backoff with jitter, bounded by `max_attempts`.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
}

impl RetryPolicy {
    /// No retries: the step runs exactly once.
    pub const NONE: RetryPolicy = RetryPolicy {
        max_attempts: 0,
        base_delay: Duration::from_millis(0),
    };

    pub fn new(max_attempts: u32, base_delay: Duration) -> Self {
        Self {
            max_attempts,
            base_delay,
        }
    }

    fn delay_for(&self, attempt: u32) -> Duration {
        let backoff = self.base_delay.as_millis() as u64 * (1u64 << attempt.min(16));
        let jitter = rand::thread_rng().gen_range(0..=50);
        Duration::from_millis(backoff + jitter)
    }
}

/// Runs `op` up to `policy.max_attempts + 1` times, retrying only when the
/// error is [`WorkflowError::is_retryable`].
pub async fn retry_with_backoff<F, Fut, T>(
    policy: RetryPolicy,
    mut op: F,
) -> Result<T, WorkflowError>
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = Result<T, WorkflowError>>,
{
    let mut attempt = 0;
    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(err) if attempt < policy.max_attempts && err.is_retryable() => {
                tokio::time::sleep(policy.delay_for(attempt)).await;
                attempt += 1;
            }
            Err(err) => return Err(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[tokio::test]
    async fn retries_transient_errors_until_success() {
        let calls = AtomicU32::new(0);
        let policy = RetryPolicy::new(3, Duration::from_millis(1));

        let result = retry_with_backoff(policy, || {
            let n = calls.fetch_add(1, Ordering::SeqCst);
            async move {
                if n < 2 {
                    Err(WorkflowError::StoreFailure {
                        operation: "put".into(),
                        cause: "connection reset".into(),
                    })
                } else {
                    Ok(42)
                }
            }
        })
        .await;

        assert_eq!(result.unwrap(), 42);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn does_not_retry_permanent_errors() {
        let calls = AtomicU32::new(0);
        let policy = RetryPolicy::new(5, Duration::from_millis(1));

        let result: Result<(), WorkflowError> = retry_with_backoff(policy, || {
            calls.fetch_add(1, Ordering::SeqCst);
            async move {
                Err(WorkflowError::NodeTypeMissing {
                    node_type: "x".into(),
                })
            }
        })
        .await;

        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
