//! Upload-speed probe

use super::throughput::{bytes_to_megabits, megabits_per_second};
use super::Probe;
use crate::client::RequestConfig;
use crate::error::FetchError;
use crate::fetch::{Fetcher, RetryPolicy};
use crate::types::ProbeKind;
use async_trait::async_trait;

/// Throughput of POSTing a zero-filled payload, in Mbps
///
/// A 2xx status is taken as delivery; echo endpoints that silently truncate
/// large bodies are not detected.
#[derive(Debug, Clone)]
pub struct UploadProbe {
    candidates: Vec<String>,
    policy: RetryPolicy,
    payload_bytes: usize,
}

impl UploadProbe {
    pub fn new(candidates: Vec<String>, policy: RetryPolicy, payload_bytes: usize) -> Self {
        Self {
            candidates,
            policy,
            payload_bytes,
        }
    }

    pub fn payload_megabits(&self) -> f64 {
        bytes_to_megabits(self.payload_bytes)
    }
}

#[async_trait]
impl Probe for UploadProbe {
    type Value = f64;

    fn kind(&self) -> ProbeKind {
        ProbeKind::Upload
    }

    async fn measure(&self, fetcher: &Fetcher) -> Result<f64, FetchError> {
        let config = RequestConfig::post(vec![0u8; self.payload_bytes])
            .with_header("Content-Type", "application/octet-stream");

        let start = fetcher.clock().now();
        fetcher
            .fetch_with_fallback(&self.candidates, &config, &self.policy)
            .await?;
        let elapsed = fetcher.clock().now().saturating_duration_since(start);

        Ok(megabits_per_second(self.payload_megabits(), elapsed))
    }
}
