//! Sequential fallback across an ordered list of candidates

use super::{Fetcher, RetryPolicy};
use crate::client::{HttpResponse, RequestConfig};
use crate::error::FetchError;

/// First successful response and the candidate that produced it
#[derive(Debug, Clone)]
pub struct FallbackSuccess {
    pub response: HttpResponse,
    pub url: String,
    pub candidate_index: usize,
}

impl Fetcher {
    /// Try each candidate in order, each with the full retry budget, and
    /// return the first success. Later candidates are never touched once one
    /// succeeds.
    pub async fn fetch_with_fallback(
        &self,
        candidates: &[String],
        config: &RequestConfig,
        policy: &RetryPolicy,
    ) -> Result<FallbackSuccess, FetchError> {
        if candidates.is_empty() {
            return Err(FetchError::invalid_configuration("candidate list is empty"));
        }

        let mut last_error = None;

        for (index, url) in candidates.iter().enumerate() {
            match self.fetch_with_retry(url, config, policy).await {
                Ok(response) => {
                    return Ok(FallbackSuccess {
                        response,
                        url: url.clone(),
                        candidate_index: index,
                    })
                }
                Err(error @ FetchError::InvalidConfiguration(_)) => return Err(error),
                Err(error) => {
                    let remaining = candidates.len() - index - 1;
                    self.logger
                        .log_candidate_failed(url, index, remaining, &error)
                        .await;
                    last_error = Some(error);
                }
            }
        }

        match last_error {
            Some(last) => Err(FetchError::AllSourcesFailed {
                candidates: candidates.len(),
                last: Box::new(last),
            }),
            None => Err(FetchError::invalid_configuration("no candidate was attempted")),
        }
    }
}
