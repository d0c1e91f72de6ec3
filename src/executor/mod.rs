//! Measurement engine and test-run orchestration
//!
//! [`MeasurementEngine`] runs the three probes concurrently and returns their
//! outcomes. [`SpeedTestSession`] wraps an engine with a history store: each
//! `run_test` produces exactly one history entry.

pub mod engine;
pub mod session;

pub use engine::{EngineLoggers, EngineSettings, MeasurementEngine};
pub use session::{RunSummary, SpeedTestSession};

use crate::client::NetworkClient;
use crate::clock::TokioClock;
use crate::history::{HistoryStore, JsonFileHistoryStore};
use crate::logging::LoggerFactory;
use crate::models::Config;
use crate::Result;
use std::sync::Arc;

/// Factory wiring engines and sessions to the real network, clock and disk
pub struct EngineFactory;

impl EngineFactory {
    /// Engine over `reqwest` and the tokio clock
    pub async fn create_engine(config: &Config, loggers: &LoggerFactory) -> Result<MeasurementEngine> {
        let transport = Arc::new(NetworkClient::new(config.timeout())?);
        Ok(MeasurementEngine::new(
            EngineSettings::from_config(config),
            transport,
            Arc::new(TokioClock),
            EngineLoggers::from_factory(loggers).await,
        ))
    }

    /// Session persisting to the configured history file
    pub async fn create_session(config: &Config, loggers: &LoggerFactory) -> Result<SpeedTestSession> {
        let engine = Self::create_engine(config, loggers).await?;
        let store: Arc<dyn HistoryStore> = Arc::new(JsonFileHistoryStore::new(config.history_path()));
        Ok(SpeedTestSession::new(
            engine,
            store,
            loggers.create_error_logger().await,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_factory_builds_session_from_config() {
        let dir = TempDir::new().unwrap();
        let config = Config {
            history_file: Some(dir.path().join("history.json")),
            ..Config::default()
        };
        let loggers = LoggerFactory::new(config.clone());

        let session = EngineFactory::create_session(&config, &loggers).await.unwrap();
        assert!(session.get_history().unwrap().is_empty());
        assert_eq!(session.engine().settings().policy, config.retry_policy());
    }
}
