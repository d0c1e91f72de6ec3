//! Output formatting and display system
//!
//! Results are rendered through an [`OutputFormatter`]: colored for
//! terminals, plain for pipes and logs, JSON for scripts. Rendering works on
//! [`ResultView`], a display projection of a completed run that is separate
//! from the values the engine computes.

mod colored;
mod formatter;
mod json;

pub use self::colored::{ColorScheme, ColoredFormatter, QualityLevel};
pub use formatter::{FormattingOptions, OutputFormatter, PlainFormatter};
pub use json::JsonFormatter;

use crate::models::{Config, HistoryEntry};
use crate::types::{OutputFormat, ProbeKind};
use chrono::SecondsFormat;

/// Display projection of one completed run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultView {
    pub latency: String,
    pub download_speed: String,
    pub upload_speed: String,
    pub date: String,
}

impl ResultView {
    pub fn from_entry(entry: &HistoryEntry) -> Self {
        let report = entry.report();
        Self {
            latency: report.display_value(ProbeKind::Latency),
            download_speed: report.display_value(ProbeKind::Download),
            upload_speed: report.display_value(ProbeKind::Upload),
            date: entry.date.to_rfc3339_opts(SecondsFormat::Secs, true),
        }
    }

    /// Multi-line summary suitable for pasting elsewhere
    pub fn copy_text(&self) -> String {
        format!(
            "Results:\nLatency: {} ms\nDownload: {} Mbps\nUpload: {} Mbps",
            self.latency, self.download_speed, self.upload_speed
        )
    }

    /// One-line form used in history listings
    pub fn history_line(&self) -> String {
        format!(
            "Latency: {} ms, Download: {} Mbps, Upload: {} Mbps",
            self.latency, self.download_speed, self.upload_speed
        )
    }
}

/// Output formatting factory for creating appropriate formatters
pub struct OutputFormatterFactory;

impl OutputFormatterFactory {
    /// Create a formatter based on color support and preferences
    pub fn create_formatter(enable_color: bool, verbose: bool) -> Box<dyn OutputFormatter> {
        let options = FormattingOptions {
            enable_color,
            verbose_mode: verbose,
        };

        if enable_color {
            Box::new(ColoredFormatter::new(options))
        } else {
            Box::new(PlainFormatter::new(options))
        }
    }

    /// Create the formatter selected by the configuration
    pub fn from_config(config: &Config) -> Box<dyn OutputFormatter> {
        match config.output_format {
            OutputFormat::Json => Box::new(JsonFormatter),
            OutputFormat::Text => Self::create_formatter(config.enable_color, config.verbose),
        }
    }

    /// Create a plain text formatter for scripts/logs
    pub fn create_plain_formatter() -> Box<dyn OutputFormatter> {
        Self::create_formatter(false, false)
    }
}
