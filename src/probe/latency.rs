//! Latency probe

use super::{throughput::whole_millis, Probe};
use crate::client::RequestConfig;
use crate::error::FetchError;
use crate::fetch::{Fetcher, RetryPolicy};
use crate::types::ProbeKind;
use async_trait::async_trait;

/// Time to the first successful GET across the candidate chain
///
/// The timer starts before the first candidate and stops on the first
/// success, so failed attempts and backoff sleeps on earlier candidates are
/// included. Read the result as an upper bound, not a ping.
#[derive(Debug, Clone)]
pub struct LatencyProbe {
    candidates: Vec<String>,
    policy: RetryPolicy,
}

impl LatencyProbe {
    pub fn new(candidates: Vec<String>, policy: RetryPolicy) -> Self {
        Self { candidates, policy }
    }
}

#[async_trait]
impl Probe for LatencyProbe {
    type Value = u64;

    fn kind(&self) -> ProbeKind {
        ProbeKind::Latency
    }

    async fn measure(&self, fetcher: &Fetcher) -> Result<u64, FetchError> {
        let start = fetcher.clock().now();
        fetcher
            .fetch_with_fallback(&self.candidates, &RequestConfig::get(), &self.policy)
            .await?;
        let elapsed = fetcher.clock().now().saturating_duration_since(start);
        Ok(whole_millis(elapsed))
    }
}
