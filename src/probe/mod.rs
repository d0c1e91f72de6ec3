//! The three measurements of a test run
//!
//! Every probe times a fallback fetch over its own candidate list. A probe
//! whose candidates are all exhausted yields the failure marker instead of
//! a number; it never aborts the run.

pub mod download;
pub mod latency;
pub mod throughput;
pub mod upload;

pub use download::DownloadProbe;
pub use latency::LatencyProbe;
pub use upload::UploadProbe;

use crate::error::FetchError;
use crate::fetch::Fetcher;
use crate::logging::{ErrorEventLogger, FetchLogger};
use crate::types::{ProbeKind, ProbeOutcome};
use async_trait::async_trait;
use std::fmt::Display;

/// A single timed measurement
#[async_trait]
pub trait Probe: Send + Sync {
    type Value: Display + Send;

    fn kind(&self) -> ProbeKind;

    /// Run the measurement, surfacing fetch failures
    async fn measure(&self, fetcher: &Fetcher) -> Result<Self::Value, FetchError>;
}

/// Loggers used while turning probe results into outcomes
#[derive(Clone)]
pub struct ProbeReporter {
    fetch_logger: FetchLogger,
    error_logger: ErrorEventLogger,
}

impl ProbeReporter {
    pub fn new(fetch_logger: FetchLogger, error_logger: ErrorEventLogger) -> Self {
        Self {
            fetch_logger,
            error_logger,
        }
    }

    /// Run `probe` and convert its result into an outcome
    pub async fn run<P: Probe>(
        &self,
        probe: &P,
        fetcher: &Fetcher,
        correlation_id: &str,
    ) -> ProbeOutcome<P::Value> {
        match probe.measure(fetcher).await {
            Ok(value) => {
                self.fetch_logger
                    .log_probe_result(probe.kind(), Some(value.to_string()), correlation_id)
                    .await;
                ProbeOutcome::Measured(value)
            }
            Err(error) => {
                self.error_logger
                    .log_probe_failure(probe.kind(), &error, correlation_id)
                    .await;
                self.fetch_logger
                    .log_probe_result(probe.kind(), None, correlation_id)
                    .await;
                ProbeOutcome::failed()
            }
        }
    }
}
