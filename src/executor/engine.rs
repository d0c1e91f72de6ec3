//! Concurrent execution of the three probes

use crate::client::HttpTransport;
use crate::clock::Clock;
use crate::fetch::{Fetcher, RetryPolicy};
use crate::log_debug;
use crate::logging::{ErrorEventLogger, FetchLogger, Logger, LoggerFactory};
use crate::models::{Config, RunReport};
use crate::probe::{DownloadProbe, LatencyProbe, ProbeReporter, UploadProbe};
use crate::types::DownloadSizing;
use std::sync::Arc;
use uuid::Uuid;

/// Candidate lists and retry settings for one engine
#[derive(Debug, Clone, PartialEq)]
pub struct EngineSettings {
    pub latency_urls: Vec<String>,
    pub download_urls: Vec<String>,
    pub upload_urls: Vec<String>,
    pub policy: RetryPolicy,
    pub download_sizing: DownloadSizing,
    pub upload_payload_bytes: usize,
}

impl EngineSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            latency_urls: config.latency_urls.clone(),
            download_urls: config.download_urls.clone(),
            upload_urls: config.upload_urls.clone(),
            policy: config.retry_policy(),
            download_sizing: config.download_sizing,
            upload_payload_bytes: config.upload_payload_bytes,
        }
    }
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

/// Loggers used by an engine
#[derive(Clone)]
pub struct EngineLoggers {
    pub engine: Logger,
    pub fetch: FetchLogger,
    pub error: ErrorEventLogger,
}

impl EngineLoggers {
    pub async fn from_factory(factory: &LoggerFactory) -> Self {
        Self {
            engine: factory.create_logger("ENGINE").await,
            fetch: factory.create_fetch_logger().await,
            error: factory.create_error_logger().await,
        }
    }

    /// Loggers that only emit errors
    pub fn quiet() -> Self {
        Self {
            engine: Logger::quiet("ENGINE"),
            fetch: FetchLogger::from_logger(Logger::quiet("FETCH")),
            error: ErrorEventLogger::from_logger(Logger::quiet("ERR")),
        }
    }
}

/// Runs latency, download and upload probes and gathers their outcomes
pub struct MeasurementEngine {
    settings: EngineSettings,
    fetcher: Fetcher,
    reporter: ProbeReporter,
    logger: Logger,
    latency: LatencyProbe,
    download: DownloadProbe,
    upload: UploadProbe,
}

impl MeasurementEngine {
    pub fn new(
        settings: EngineSettings,
        transport: Arc<dyn HttpTransport>,
        clock: Arc<dyn Clock>,
        loggers: EngineLoggers,
    ) -> Self {
        let latency = LatencyProbe::new(settings.latency_urls.clone(), settings.policy);
        let download = DownloadProbe::new(
            settings.download_urls.clone(),
            settings.policy,
            settings.download_sizing,
        );
        let upload = UploadProbe::new(
            settings.upload_urls.clone(),
            settings.policy,
            settings.upload_payload_bytes,
        );

        Self {
            fetcher: Fetcher::new(transport, clock, loggers.fetch.clone()),
            reporter: ProbeReporter::new(loggers.fetch, loggers.error),
            logger: loggers.engine,
            settings,
            latency,
            download,
            upload,
        }
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    pub fn clock(&self) -> &Arc<dyn Clock> {
        self.fetcher.clock()
    }

    /// Launch all three probes together and wait until every one has settled.
    ///
    /// The report is built from the values the probes return through the
    /// join; a failed probe contributes the failure marker and never stops
    /// the others.
    pub async fn measure(&self) -> RunReport {
        let correlation_id = Uuid::new_v4().to_string();
        log_debug!(self.logger, "Starting measurement run {}", correlation_id);

        let (latency, download_speed, upload_speed) = tokio::join!(
            self.reporter.run(&self.latency, &self.fetcher, &correlation_id),
            self.reporter.run(&self.download, &self.fetcher, &correlation_id),
            self.reporter.run(&self.upload, &self.fetcher, &correlation_id),
        );

        let report = RunReport::new(latency, download_speed, upload_speed);
        log_debug!(
            self.logger,
            "Measurement run {} finished with {} failed probe(s)",
            correlation_id,
            report.failed_probes().len()
        );
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::testing::ManualClock;
    use crate::fetch::testing::{Reply, ScriptedTransport};
    use crate::types::{ProbeKind, ProbeOutcome};
    use std::time::Duration;

    fn settings() -> EngineSettings {
        EngineSettings {
            latency_urls: vec!["https://l1.test/".into(), "https://l2.test/".into(), "https://l3.test/".into()],
            download_urls: vec!["https://d1.test/".into(), "https://d2.test/".into()],
            upload_urls: vec!["https://u1.test/".into()],
            policy: RetryPolicy::new(3, Duration::from_millis(500)),
            download_sizing: DownloadSizing::default(),
            upload_payload_bytes: 1024 * 1024,
        }
    }

    fn engine(transport: Arc<ScriptedTransport>, clock: Arc<ManualClock>) -> MeasurementEngine {
        MeasurementEngine::new(settings(), transport, clock, EngineLoggers::quiet())
    }

    #[tokio::test]
    async fn test_all_first_candidates_instant() {
        let clock = Arc::new(ManualClock::new());
        let transport = Arc::new(
            ScriptedTransport::new(clock.clone())
                .on("https://l1.test/", vec![Reply::ok()])
                .on("https://d1.test/", vec![Reply::ok()])
                .on("https://u1.test/", vec![Reply::ok()]),
        );

        let report = engine(transport.clone(), clock).measure().await;

        assert_eq!(report.latency, ProbeOutcome::Measured(0));
        assert!(report.download_speed.value().is_some_and(|v| v.is_finite()));
        assert!(report.upload_speed.value().is_some_and(|v| v.is_finite()));
        assert_eq!(transport.total_calls(), 3);
    }

    #[tokio::test]
    async fn test_failed_download_does_not_abort_run() {
        let clock = Arc::new(ManualClock::new());
        let transport = Arc::new(
            ScriptedTransport::new(clock.clone())
                .on("https://l1.test/", vec![Reply::ok().after(Duration::from_millis(25))])
                .on("https://d1.test/", vec![Reply::status(500)])
                .on("https://d2.test/", vec![Reply::refused()])
                .on("https://u1.test/", vec![Reply::ok().after(Duration::from_secs(1))]),
        );

        let report = engine(transport.clone(), clock).measure().await;

        assert_eq!(report.latency, ProbeOutcome::Measured(25));
        assert!(report.download_speed.is_failed());
        assert_eq!(report.upload_speed, ProbeOutcome::Measured(8.0));
        assert_eq!(report.failed_probes(), vec![ProbeKind::Download]);
        assert_eq!(transport.calls_to("https://d1.test/"), 3);
        assert_eq!(transport.calls_to("https://d2.test/"), 3);
    }

    #[tokio::test]
    async fn test_latency_after_two_failed_candidates() {
        let clock = Arc::new(ManualClock::new());
        let transport = Arc::new(
            ScriptedTransport::new(clock.clone())
                .on("https://l1.test/", vec![Reply::refused()])
                .on("https://l2.test/", vec![Reply::error(crate::error::TransportError::Timeout("slow".into()))])
                .on("https://l3.test/", vec![Reply::ok().after(Duration::from_millis(40))])
                .on("https://d1.test/", vec![Reply::ok()])
                .on("https://u1.test/", vec![Reply::ok()]),
        );

        let report = engine(transport.clone(), clock).measure().await;

        // Two candidates each sleep 500ms + 1000ms before giving up.
        assert_eq!(report.latency, ProbeOutcome::Measured(3000 + 40));
        assert_eq!(transport.calls_to("https://l1.test/"), 3);
        assert_eq!(transport.calls_to("https://l2.test/"), 3);
        assert_eq!(transport.calls_to("https://l3.test/"), 1);
    }

    #[tokio::test]
    async fn test_everything_failing_yields_three_markers() {
        let clock = Arc::new(ManualClock::new());
        let transport = Arc::new(ScriptedTransport::new(clock.clone()));

        let report = engine(transport, clock).measure().await;
        assert_eq!(report.failed_probes(), ProbeKind::ALL.to_vec());
    }

    #[test]
    fn test_settings_from_config() {
        let config = Config {
            retry_attempts: 5,
            download_sizing: DownloadSizing::Measured,
            ..Config::default()
        };
        let settings = EngineSettings::from_config(&config);
        assert_eq!(settings.policy.attempts, 5);
        assert_eq!(settings.download_sizing, DownloadSizing::Measured);
        assert_eq!(settings.latency_urls, config.latency_urls);
    }
}
