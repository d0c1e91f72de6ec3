//! Download-speed probe

use super::throughput::{bytes_to_megabits, megabits_per_second, megabytes_to_megabits};
use super::Probe;
use crate::client::RequestConfig;
use crate::error::FetchError;
use crate::fetch::{Fetcher, RetryPolicy};
use crate::types::{DownloadSizing, ProbeKind};
use async_trait::async_trait;

/// Throughput of a GET against the download candidates, in Mbps
///
/// With [`DownloadSizing::Assumed`] the transferred size is a constant and
/// the body is not read; the candidates point at differently sized files,
/// so the figure is only accurate for a candidate of exactly that size.
/// [`DownloadSizing::Measured`] reads the body and counts its bytes.
#[derive(Debug, Clone)]
pub struct DownloadProbe {
    candidates: Vec<String>,
    policy: RetryPolicy,
    sizing: DownloadSizing,
}

impl DownloadProbe {
    pub fn new(candidates: Vec<String>, policy: RetryPolicy, sizing: DownloadSizing) -> Self {
        Self {
            candidates,
            policy,
            sizing,
        }
    }

    fn request_config(&self) -> RequestConfig {
        match self.sizing {
            DownloadSizing::Assumed { .. } => RequestConfig::get(),
            DownloadSizing::Measured => RequestConfig::get().consuming_body(),
        }
    }
}

#[async_trait]
impl Probe for DownloadProbe {
    type Value = f64;

    fn kind(&self) -> ProbeKind {
        ProbeKind::Download
    }

    async fn measure(&self, fetcher: &Fetcher) -> Result<f64, FetchError> {
        let config = self.request_config();
        let start = fetcher.clock().now();
        let success = fetcher
            .fetch_with_fallback(&self.candidates, &config, &self.policy)
            .await?;
        let elapsed = fetcher.clock().now().saturating_duration_since(start);

        let megabits = match self.sizing {
            DownloadSizing::Assumed { megabytes } => megabytes_to_megabits(megabytes),
            DownloadSizing::Measured => bytes_to_megabits(success.response.body_size()),
        };

        Ok(megabits_per_second(megabits, elapsed))
    }
}
