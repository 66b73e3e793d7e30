use std::future::Future;
use std::time::Duration;

use tokio::time::sleep;

use crate::error::LLMError;

const DEFAULT_BASE_DELAY_MS: u64 = 200;
const DEFAULT_MAX_DELAY_MS: u64 = 2_000;

/// Exponential backoff applied to transient request failures.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first attempt
    pub max_retries: u32,
    /// Initial backoff delay in milliseconds
    pub base_delay_ms: u64,
    /// Maximum backoff delay in milliseconds
    pub max_delay_ms: u64,
    /// Whether to shave a deterministic jitter off each delay
    pub jitter: bool,
}

impl RetryPolicy {
    pub fn new(max_retries: u32) -> Self {
        Self {
            max_retries,
            base_delay_ms: DEFAULT_BASE_DELAY_MS,
            max_delay_ms: DEFAULT_MAX_DELAY_MS,
            jitter: true,
        }
    }

    pub fn max_attempts(&self) -> usize {
        self.max_retries as usize + 1
    }

    pub(super) async fn run<F, Fut, T>(&self, mut op: F) -> Result<T, LLMError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, LLMError>>,
    {
        let mut attempts_left = self.max_attempts();
        let mut idx = 0usize;
        let mut last_err: Option<LLMError> = None;

        while attempts_left > 0 {
            match op().await {
                Ok(value) => return Ok(value),
                Err(err) => {
                    if attempts_left == 1 || !Self::is_retryable(&err) {
                        return Err(err);
                    }
                    log::warn!(
                        "request attempt {} of {} failed, retrying: {err}",
                        idx + 1,
                        self.max_attempts()
                    );
                    last_err = Some(err);
                    self.backoff_sleep(idx).await;
                    attempts_left -= 1;
                    idx += 1;
                }
            }
        }

        Err(LLMError::RetryExceeded {
            attempts: self.max_attempts(),
            last_error: last_err.map(|e| e.to_string()).unwrap_or_default(),
        })
    }

    /// Only network failures and provider-side errors (429, 5xx) are retried.
    pub(super) fn is_retryable(err: &LLMError) -> bool {
        matches!(err, LLMError::HttpError(_) | LLMError::ProviderError(_))
    }

    pub(super) fn delay_for(&self, attempt_index: usize) -> u64 {
        let mut delay = self
            .base_delay_ms
            .saturating_mul(1u64 << attempt_index.min(16));
        delay = delay.min(self.max_delay_ms);
        if self.jitter {
            let span = (delay / 2).max(1);
            let jitter = ((attempt_index as u64)
                .wrapping_mul(6364136223846793005)
                .wrapping_add(1))
                % span;
            delay = delay.saturating_sub(jitter);
        }
        delay
    }

    async fn backoff_sleep(&self, attempt_index: usize) {
        sleep(Duration::from_millis(self.delay_for(attempt_index))).await;
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(crate::options::DEFAULT_MAX_RETRIES)
    }
}
