//! Retry with exponential backoff against a single target

use super::Fetcher;
use crate::client::{HttpResponse, RequestConfig};
use crate::error::{FetchError, TransportError};
use std::time::Duration;

/// Attempts per candidate and the delay before the second attempt
///
/// The delay doubles after every failed attempt: `d, 2d, 4d, ...` with no
/// jitter and no cap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub attempts: u32,
    pub initial_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            attempts: crate::defaults::DEFAULT_RETRY_ATTEMPTS,
            initial_backoff: crate::defaults::DEFAULT_INITIAL_BACKOFF,
        }
    }
}

impl RetryPolicy {
    pub fn new(attempts: u32, initial_backoff: Duration) -> Self {
        Self {
            attempts,
            initial_backoff,
        }
    }

    /// Delay slept before attempt `attempt` (1-based). Zero for the first.
    pub fn delay_before(&self, attempt: u32) -> Duration {
        if attempt < 2 {
            return Duration::ZERO;
        }
        let factor = 2u32.checked_pow(attempt - 2).unwrap_or(u32::MAX);
        self.initial_backoff.saturating_mul(factor)
    }

    /// Every delay a candidate that never succeeds will sleep
    pub fn backoff_schedule(&self) -> Vec<Duration> {
        (2..=self.attempts).map(|attempt| self.delay_before(attempt)).collect()
    }

    /// Total time spent sleeping by a candidate that exhausts its budget
    pub fn total_backoff(&self) -> Duration {
        self.backoff_schedule()
            .into_iter()
            .fold(Duration::ZERO, Duration::saturating_add)
    }
}

impl Fetcher {
    /// Request `url` until it answers with a 2xx status or `policy.attempts`
    /// attempts have failed.
    ///
    /// A non-2xx status and a transport error both count as a failed attempt.
    /// The successful response is returned unchanged; exhaustion yields
    /// [`FetchError::RequestFailed`] carrying the last cause.
    pub async fn fetch_with_retry(
        &self,
        url: &str,
        config: &RequestConfig,
        policy: &RetryPolicy,
    ) -> Result<HttpResponse, FetchError> {
        if policy.attempts == 0 {
            return Err(FetchError::invalid_configuration(
                "retry attempts must be at least 1",
            ));
        }

        let method = config.method.as_str();
        let mut backoff = policy.initial_backoff;
        let mut attempt: u32 = 1;

        loop {
            let started = self.clock.now();
            let result = self.transport.request(url, config).await;
            let elapsed = self.clock.now().saturating_duration_since(started);

            let status_code = result.as_ref().ok().map(|response| response.status_code);
            self.logger
                .log_attempt(url, method, attempt, status_code, elapsed)
                .await;

            let cause = match result {
                Ok(response) if response.is_success() => return Ok(response),
                Ok(response) => TransportError::Status(response.status_code),
                Err(error) => error,
            };

            if attempt >= policy.attempts {
                return Err(FetchError::RequestFailed {
                    url: url.to_string(),
                    attempts: attempt,
                    source: cause,
                });
            }

            attempt += 1;
            self.logger.log_backoff(url, attempt, backoff).await;
            self.clock.sleep(backoff).await;
            backoff = backoff.saturating_mul(2);
        }
    }
}
