//! One test run end to end: measure, stamp, persist

use super::MeasurementEngine;
use crate::history::HistoryStore;
use crate::logging::ErrorEventLogger;
use crate::models::HistoryEntry;
use crate::Result;
use serde::Serialize;
use std::sync::Arc;

/// Result of [`SpeedTestSession::run_test`]
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunSummary {
    /// The entry built from this run's probe outcomes
    pub entry: HistoryEntry,
    /// False when appending to the history store failed
    pub history_saved: bool,
}

/// Measurement engine bound to a history store
pub struct SpeedTestSession {
    engine: MeasurementEngine,
    store: Arc<dyn HistoryStore>,
    error_logger: ErrorEventLogger,
}

impl SpeedTestSession {
    pub fn new(engine: MeasurementEngine, store: Arc<dyn HistoryStore>, error_logger: ErrorEventLogger) -> Self {
        Self {
            engine,
            store,
            error_logger,
        }
    }

    pub fn engine(&self) -> &MeasurementEngine {
        &self.engine
    }

    /// Run all three probes and append exactly one history entry.
    ///
    /// Probe failures become failure markers in the entry. A failed save is
    /// logged and reported through [`RunSummary::history_saved`]; the run
    /// itself still completes.
    pub async fn run_test(&self) -> RunSummary {
        let report = self.engine.measure().await;
        let entry = HistoryEntry::from_report(report, self.engine.clock().wall_time());

        let history_saved = match self.store.append_entry(entry.clone()) {
            Ok(_) => true,
            Err(error) => {
                self.error_logger
                    .log_error(&error, Some("Failed to save test history"), None)
                    .await;
                false
            }
        };

        RunSummary { entry, history_saved }
    }

    /// Every stored entry, oldest first
    pub fn get_history(&self) -> Result<Vec<HistoryEntry>> {
        self.store.load_history()
    }
}
