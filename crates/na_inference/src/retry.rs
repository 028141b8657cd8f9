use std::future::Future;
use std::time::Duration;

use na_core::{Error, Result};
use tokio::time::sleep;

/// Retry configuration for model calls
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Retries after the first attempt
    pub max_retries: u32,
    /// Delay before the first retry, doubled after each one
    pub base_delay: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay: Duration::from_millis(500),
        }
    }
}

/// Runs `operation` until it succeeds, fails with a non-retryable error, or
/// the retry budget is spent. Giving up yields [`Error::ModelInvocation`].
pub async fn with_retry<F, Fut, T>(config: &RetryConfig, mut operation: F) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let mut attempts = 0;
    let mut delay = config.base_delay;

    loop {
        attempts += 1;
        match operation().await {
            Ok(result) => return Ok(result),
            Err(error) => {
                if attempts > config.max_retries || !error.is_retryable() {
                    return Err(Error::ModelInvocation {
                        attempts,
                        message: error.to_string(),
                    });
                }

                tracing::warn!(
                    "Model call failed ({}), retrying {}/{} in {:?}",
                    error,
                    attempts,
                    config.max_retries,
                    delay
                );
                sleep(delay).await;
                delay *= 2;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn quick(max_retries: u32) -> RetryConfig {
        RetryConfig {
            max_retries,
            base_delay: Duration::from_millis(1),
        }
    }

    #[tokio::test]
    async fn test_retries_transient_errors_until_success() {
        let calls = AtomicU32::new(0);
        let counter = &calls;
        let result = with_retry(&quick(3), move || async move {
            if counter.fetch_add(1, Ordering::SeqCst) < 2 {
                Err(Error::Api { status: 503, body: String::new() })
            } else {
                Ok("done")
            }
        })
        .await;

        assert_eq!(result.unwrap(), "done");
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_gives_up_after_budget() {
        let calls = AtomicU32::new(0);
        let counter = &calls;
        let result: Result<()> = with_retry(&quick(2), move || async move {
            counter.fetch_add(1, Ordering::SeqCst);
            Err(Error::Api { status: 429, body: "slow down".to_string() })
        })
        .await;

        assert!(matches!(result, Err(Error::ModelInvocation { attempts: 3, .. })));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_does_not_retry_permanent_errors() {
        let calls = AtomicU32::new(0);
        let counter = &calls;
        let result: Result<()> = with_retry(&quick(5), move || async move {
            counter.fetch_add(1, Ordering::SeqCst);
            Err(Error::Api { status: 401, body: "bad key".to_string() })
        })
        .await;

        assert!(matches!(result, Err(Error::ModelInvocation { attempts: 1, .. })));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
