//! JSON output for scripts

use super::formatter::OutputFormatter;
use crate::{
    error::{AppError, Result},
    executor::RunSummary,
    models::HistoryEntry,
};
use serde::Serialize;
use serde_json::json;

/// Emits machine-readable JSON; history uses the stored entry format
pub struct JsonFormatter;

impl JsonFormatter {
    fn to_json<T: Serialize + ?Sized>(value: &T) -> Result<String> {
        serde_json::to_string_pretty(value)
            .map_err(|e| AppError::internal(format!("Failed to serialize output: {}", e)))
    }

    fn message(level: &str, text: &str) -> Result<String> {
        Self::to_json(&json!({ "level": level, "message": text }))
    }
}

impl OutputFormatter for JsonFormatter {
    fn format_header(&self, _title: &str) -> Result<String> {
        Ok(String::new())
    }

    fn format_run(&self, summary: &RunSummary) -> Result<String> {
        Self::to_json(summary)
    }

    fn format_history(&self, entries: &[HistoryEntry]) -> Result<String> {
        Self::to_json(entries)
    }

    fn format_error(&self, error: &str) -> Result<String> {
        Self::message("error", error)
    }

    fn format_warning(&self, warning: &str) -> Result<String> {
        Self::message("warning", warning)
    }

    fn format_success(&self, message: &str) -> Result<String> {
        Self::message("success", message)
    }
}
