//! Colored formatter implementation with terminal color support

use super::formatter::{FormattingOptions, OutputFormatter, PlainFormatter};
use super::ResultView;
use crate::{
    error::{AppError, Result},
    executor::RunSummary,
    models::HistoryEntry,
    types::{FailureMarker, ProbeKind, ProbeOutcome},
};
use colored::*;
use std::fmt::Write as _;

/// Quality classification for color coding
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum QualityLevel {
    Excellent,
    Good,
    Fair,
    Poor,
}

impl QualityLevel {
    /// Latency in milliseconds: lower is better
    pub fn from_latency(ms: u64) -> Self {
        match ms {
            0..=49 => Self::Excellent,
            50..=149 => Self::Good,
            150..=499 => Self::Fair,
            _ => Self::Poor,
        }
    }

    /// Throughput in Mbps: higher is better
    pub fn from_throughput(mbps: f64) -> Self {
        if mbps >= 50.0 {
            Self::Excellent
        } else if mbps >= 10.0 {
            Self::Good
        } else if mbps >= 2.0 {
            Self::Fair
        } else {
            Self::Poor
        }
    }

    pub fn color(&self) -> Color {
        match self {
            Self::Excellent => Color::Green,
            Self::Good => Color::Cyan,
            Self::Fair => Color::Yellow,
            Self::Poor => Color::Magenta,
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            Self::Excellent => "🚀",
            Self::Good => "⚡",
            Self::Fair => "🔶",
            Self::Poor => "🐢",
        }
    }
}

/// Color scheme configuration
#[derive(Debug, Clone)]
pub struct ColorScheme {
    pub header: Color,
    pub success: Color,
    pub warning: Color,
    pub error: Color,
    pub muted: Color,
}

impl Default for ColorScheme {
    fn default() -> Self {
        Self {
            header: Color::Blue,
            success: Color::Green,
            warning: Color::Yellow,
            error: Color::Red,
            muted: Color::BrightBlack,
        }
    }
}

fn fmt_err(e: std::fmt::Error) -> AppError {
    AppError::io(format!("Failed to format output: {}", e))
}

/// Colored formatter implementation
pub struct ColoredFormatter {
    options: FormattingOptions,
    color_scheme: ColorScheme,
}

impl ColoredFormatter {
    /// Create a new colored formatter with options
    pub fn new(options: FormattingOptions) -> Self {
        Self {
            options,
            color_scheme: ColorScheme::default(),
        }
    }

    /// Create a colored formatter with custom color scheme
    pub fn with_color_scheme(options: FormattingOptions, color_scheme: ColorScheme) -> Self {
        Self { options, color_scheme }
    }

    /// Apply color to text if colors are enabled
    fn colorize(&self, text: &str, color: Color) -> ColoredString {
        if self.options.enable_color {
            text.color(color)
        } else {
            text.normal()
        }
    }

    fn bold(&self, text: &str) -> ColoredString {
        if self.options.enable_color {
            text.bold()
        } else {
            text.normal()
        }
    }

    /// Bold and colored if colors are enabled
    fn emphasize(&self, text: &str, color: Color) -> ColoredString {
        if self.options.enable_color {
            text.color(color).bold()
        } else {
            text.normal()
        }
    }

    fn failure(&self) -> ColoredString {
        self.colorize(FailureMarker::TEXT, self.color_scheme.error)
    }

    fn latency_cell(&self, outcome: &ProbeOutcome<u64>) -> String {
        match outcome {
            ProbeOutcome::Measured(ms) => {
                let level = QualityLevel::from_latency(*ms);
                format!("{} {}", self.colorize(&format!("{} ms", ms), level.color()), level.symbol())
            }
            ProbeOutcome::Failed(_) => format!("{} ✗", self.failure()),
        }
    }

    fn speed_cell(&self, outcome: &ProbeOutcome<f64>) -> String {
        match outcome {
            ProbeOutcome::Measured(mbps) => {
                let level = QualityLevel::from_throughput(*mbps);
                format!(
                    "{} {}",
                    self.colorize(&format!("{:.2} Mbps", mbps), level.color()),
                    level.symbol()
                )
            }
            ProbeOutcome::Failed(_) => format!("{} ✗", self.failure()),
        }
    }

    fn label(&self, kind: ProbeKind) -> ColoredString {
        self.bold(&format!("{:<9}", format!("{}:", kind.name())))
    }
}

impl OutputFormatter for ColoredFormatter {
    fn format_header(&self, title: &str) -> Result<String> {
        let border = "═".repeat(title.chars().count() + 4);
        Ok(format!(
            "{}\n  {}\n{}",
            self.colorize(&border, self.color_scheme.header),
            self.emphasize(title, self.color_scheme.header),
            self.colorize(&border, self.color_scheme.header)
        ))
    }

    fn format_run(&self, summary: &RunSummary) -> Result<String> {
        let entry = &summary.entry;
        let mut output = String::new();

        writeln!(output, "{} {}", self.label(ProbeKind::Latency), self.latency_cell(&entry.latency))
            .map_err(fmt_err)?;
        writeln!(output, "{} {}", self.label(ProbeKind::Download), self.speed_cell(&entry.download_speed))
            .map_err(fmt_err)?;
        write!(output, "{} {}", self.label(ProbeKind::Upload), self.speed_cell(&entry.upload_speed))
            .map_err(fmt_err)?;

        if self.options.verbose_mode {
            let view = ResultView::from_entry(entry);
            write!(output, "\n{}", self.colorize(&format!("Date: {}", view.date), self.color_scheme.muted))
                .map_err(fmt_err)?;
        }

        for note in PlainFormatter::run_notes(summary) {
            write!(output, "\n{}", self.format_warning(&note)?).map_err(fmt_err)?;
        }

        Ok(output)
    }

    fn format_history(&self, entries: &[HistoryEntry]) -> Result<String> {
        if entries.is_empty() {
            return Ok(self
                .colorize("No test history yet.", self.color_scheme.muted)
                .to_string());
        }

        let mut output = String::new();
        for (index, entry) in entries.iter().enumerate() {
            if index > 0 {
                writeln!(output).map_err(fmt_err)?;
            }
            let view = ResultView::from_entry(entry);
            write!(
                output,
                "{}  Latency: {}, Download: {}, Upload: {}",
                self.colorize(&view.date, self.color_scheme.muted),
                self.latency_cell(&entry.latency),
                self.speed_cell(&entry.download_speed),
                self.speed_cell(&entry.upload_speed)
            )
            .map_err(fmt_err)?;
        }

        Ok(output)
    }

    fn format_error(&self, error: &str) -> Result<String> {
        Ok(format!("{} {}", self.emphasize("✗ ERROR:", self.color_scheme.error), error))
    }

    fn format_warning(&self, warning: &str) -> Result<String> {
        Ok(format!("{} {}", self.emphasize("⚠ WARNING:", self.color_scheme.warning), warning))
    }

    fn format_success(&self, message: &str) -> Result<String> {
        Ok(format!("{} {}", self.emphasize("✓", self.color_scheme.success), message))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RunReport;
    use chrono::{TimeZone, Utc};

    fn uncolored() -> ColoredFormatter {
        ColoredFormatter::new(FormattingOptions {
            enable_color: false,
            verbose_mode: false,
        })
    }

    fn summary(download: ProbeOutcome<f64>) -> RunSummary {
        RunSummary {
            entry: HistoryEntry::from_report(
                RunReport::new(ProbeOutcome::Measured(30), download, ProbeOutcome::Measured(12.0)),
                Utc.with_ymd_and_hms(2024, 6, 1, 8, 0, 0).unwrap(),
            ),
            history_saved: true,
        }
    }

    #[test]
    fn test_quality_levels() {
        assert_eq!(QualityLevel::from_latency(20), QualityLevel::Excellent);
        assert_eq!(QualityLevel::from_latency(120), QualityLevel::Good);
        assert_eq!(QualityLevel::from_latency(2000), QualityLevel::Poor);
        assert_eq!(QualityLevel::from_throughput(100.0), QualityLevel::Excellent);
        assert_eq!(QualityLevel::from_throughput(5.0), QualityLevel::Fair);
        assert_eq!(QualityLevel::from_throughput(0.5), QualityLevel::Poor);
    }

    #[test]
    fn test_format_run_without_color() {
        let output = uncolored().format_run(&summary(ProbeOutcome::Measured(3.25))).unwrap();
        let lines: Vec<&str> = output.lines().collect();

        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("Latency:  30 ms"));
        assert!(lines[1].starts_with("Download: 3.25 Mbps"));
        assert!(lines[2].starts_with("Upload:   12.00 Mbps"));
    }

    #[test]
    fn test_failed_probe_shows_marker_and_warning() {
        let output = uncolored().format_run(&summary(ProbeOutcome::failed())).unwrap();
        assert!(output.contains("Download: Error"));
        assert!(output.contains("WARNING: Unable to measure: Download"));
    }

    #[test]
    fn test_colored_output_contains_ansi_codes() {
        colored::control::set_override(true);
        let formatter = ColoredFormatter::new(FormattingOptions::default());
        let output = formatter.format_error("boom").unwrap();
        colored::control::unset_override();

        assert!(output.contains("\u{1b}["));
        assert!(output.contains("boom"));
    }

    #[test]
    fn test_format_history_one_line_per_entry() {
        let entries = vec![summary(ProbeOutcome::Measured(1.0)).entry, summary(ProbeOutcome::failed()).entry];
        let output = uncolored().format_history(&entries).unwrap();
        assert_eq!(output.lines().count(), 2);
        assert!(output.contains("2024-06-01T08:00:00Z"));
    }
}
