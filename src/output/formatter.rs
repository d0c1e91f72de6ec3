//! Core formatting traits and the plain text implementation

use super::ResultView;
use crate::{
    error::{AppError, Result},
    executor::RunSummary,
    models::HistoryEntry,
};
use std::fmt::Write as _;

/// Main trait for output formatting
pub trait OutputFormatter {
    /// Format a header section
    fn format_header(&self, title: &str) -> Result<String>;

    /// Format the outcome of one test run
    fn format_run(&self, summary: &RunSummary) -> Result<String>;

    /// Format the stored history, oldest first
    fn format_history(&self, entries: &[HistoryEntry]) -> Result<String>;

    /// Format error messages
    fn format_error(&self, error: &str) -> Result<String>;

    /// Format warning messages
    fn format_warning(&self, warning: &str) -> Result<String>;

    /// Format success messages
    fn format_success(&self, message: &str) -> Result<String>;
}

/// Configuration options for formatting
#[derive(Debug, Clone)]
pub struct FormattingOptions {
    /// Enable colored output
    pub enable_color: bool,
    /// Include the date and persistence status of a run
    pub verbose_mode: bool,
}

impl Default for FormattingOptions {
    fn default() -> Self {
        Self {
            enable_color: true,
            verbose_mode: false,
        }
    }
}

fn fmt_err(e: std::fmt::Error) -> AppError {
    AppError::io(format!("Failed to format output: {}", e))
}

/// Plain text formatter implementation
pub struct PlainFormatter {
    options: FormattingOptions,
}

impl PlainFormatter {
    /// Create a new plain formatter with options
    pub fn new(options: FormattingOptions) -> Self {
        Self { options }
    }

    /// Notes that follow a run's results
    pub(crate) fn run_notes(summary: &RunSummary) -> Vec<String> {
        let mut notes = Vec::new();

        let failed = summary.entry.report().failed_probes();
        if !failed.is_empty() {
            let names: Vec<&str> = failed.iter().map(|kind| kind.name()).collect();
            notes.push(format!("Unable to measure: {}", names.join(", ")));
        }

        if !summary.history_saved {
            notes.push("This run could not be saved to history".to_string());
        }

        notes
    }
}

impl OutputFormatter for PlainFormatter {
    fn format_header(&self, title: &str) -> Result<String> {
        let mut output = String::new();
        let border = "=".repeat(title.len() + 4);

        writeln!(output, "{}", border).map_err(fmt_err)?;
        writeln!(output, "  {}", title).map_err(fmt_err)?;
        write!(output, "{}", border).map_err(fmt_err)?;

        Ok(output)
    }

    fn format_run(&self, summary: &RunSummary) -> Result<String> {
        let view = ResultView::from_entry(&summary.entry);
        let mut output = view.copy_text();

        if self.options.verbose_mode {
            write!(output, "\nDate: {}", view.date).map_err(fmt_err)?;
        }

        for note in Self::run_notes(summary) {
            write!(output, "\n{}", self.format_warning(&note)?).map_err(fmt_err)?;
        }

        Ok(output)
    }

    fn format_history(&self, entries: &[HistoryEntry]) -> Result<String> {
        if entries.is_empty() {
            return Ok("No test history yet.".to_string());
        }

        let lines: Vec<String> = entries
            .iter()
            .map(|entry| {
                let view = ResultView::from_entry(entry);
                format!("{}  {}", view.date, view.history_line())
            })
            .collect();

        Ok(lines.join("\n"))
    }

    fn format_error(&self, error: &str) -> Result<String> {
        Ok(format!("ERROR: {}", error))
    }

    fn format_warning(&self, warning: &str) -> Result<String> {
        Ok(format!("WARNING: {}", warning))
    }

    fn format_success(&self, message: &str) -> Result<String> {
        Ok(format!("SUCCESS: {}", message))
    }
}
