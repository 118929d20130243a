use std::future::Future;
use std::time::Duration;

use crate::config::UpstreamConfig;
use crate::error::{AppError, AppResult};

// Backoff doubles per attempt from `retry_base_ms`, capped here so a
// misconfigured retry count cannot stall a request-handling task.
const MAX_BACKOFF: Duration = Duration::from_secs(2);

/// Executes `operation` with a small bounded retry and exponential backoff.
///
/// Returns the first success, or the last error once `max_retries` extra
/// attempts are exhausted. The caller decides what exhaustion means; the
/// gateway maps it to an indeterminate credential check.
pub async fn with_retry<F, Fut, T>(
    config: &UpstreamConfig,
    operation_name: &str,
    mut operation: F,
) -> AppResult<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = AppResult<T>>,
{
    let mut last_error: Option<AppError> = None;

    for attempt in 0..=config.max_retries {
        match operation().await {
            Ok(value) => {
                if attempt > 0 {
                    tracing::debug!(
                        operation = operation_name,
                        attempt = attempt + 1,
                        "operation succeeded after retry"
                    );
                }
                return Ok(value);
            }
            Err(err) if attempt < config.max_retries => {
                let delay = compute_backoff(config, attempt);
                tracing::debug!(
                    operation = operation_name,
                    attempt = attempt + 1,
                    max_attempts = config.max_retries + 1,
                    delay_ms = delay.as_millis() as u64,
                    error = %err,
                    "retrying after backoff"
                );
                tokio::time::sleep(delay).await;
                last_error = Some(err);
            }
            Err(err) => return Err(err),
        }
    }

    Err(last_error
        .unwrap_or_else(|| AppError::downstream("retry loop completed without result or error")))
}

fn compute_backoff(config: &UpstreamConfig, attempt: u32) -> Duration {
    let delay = Duration::from_millis(config.retry_base_ms.saturating_mul(1 << attempt.min(16)));
    delay.min(MAX_BACKOFF)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn config(max_retries: u32) -> UpstreamConfig {
        UpstreamConfig {
            timeout_ms: 1000,
            max_retries,
            retry_base_ms: 100,
        }
    }

    #[tokio::test(start_paused = true)]
    async fn retries_until_success() {
        let attempts = AtomicU32::new(0);
        let result = with_retry(&config(2), "test-op", || async {
            if attempts.fetch_add(1, Ordering::SeqCst) < 2 {
                Err(AppError::downstream("transient"))
            } else {
                Ok(42)
            }
        })
        .await;

        assert_eq!(result.unwrap(), 42);
        assert_eq!(attempts.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn exhaustion_returns_the_last_error() {
        let attempts = AtomicU32::new(0);
        let result: AppResult<()> = with_retry(&config(1), "test-op", || async {
            attempts.fetch_add(1, Ordering::SeqCst);
            Err(AppError::downstream("still down"))
        })
        .await;

        assert!(result.is_err());
        assert_eq!(attempts.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn zero_retries_means_one_attempt() {
        let attempts = AtomicU32::new(0);
        let result: AppResult<()> = with_retry(&config(0), "test-op", || async {
            attempts.fetch_add(1, Ordering::SeqCst);
            Err(AppError::downstream("down"))
        })
        .await;

        assert!(result.is_err());
        assert_eq!(attempts.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn backoff_doubles_and_caps() {
        let cfg = config(10);
        assert_eq!(compute_backoff(&cfg, 0), Duration::from_millis(100));
        assert_eq!(compute_backoff(&cfg, 1), Duration::from_millis(200));
        assert_eq!(compute_backoff(&cfg, 2), Duration::from_millis(400));
        assert_eq!(compute_backoff(&cfg, 10), MAX_BACKOFF);
    }
}
