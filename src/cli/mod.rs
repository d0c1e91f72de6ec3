//! Command-line interface

use clap::{ArgAction, Parser};
use std::path::PathBuf;

/// Network Speed Probe - measure latency, download and upload speed
#[derive(Parser, Debug, Clone)]
#[command(name = "nsp")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Latency endpoint (repeatable; replaces the configured list)
    #[arg(long = "latency-url", value_name = "URL", action = ArgAction::Append)]
    pub latency_urls: Vec<String>,

    /// Download endpoint (repeatable; replaces the configured list)
    #[arg(long = "download-url", value_name = "URL", action = ArgAction::Append)]
    pub download_urls: Vec<String>,

    /// Upload endpoint (repeatable; replaces the configured list)
    #[arg(long = "upload-url", value_name = "URL", action = ArgAction::Append)]
    pub upload_urls: Vec<String>,

    /// Attempts per endpoint before falling back to the next one
    #[arg(short, long, value_parser = parse_retries)]
    pub retries: Option<u32>,

    /// Delay before the first retry in milliseconds; doubles on every retry
    #[arg(long, value_name = "MS")]
    pub backoff_ms: Option<u64>,

    /// Request timeout in seconds
    #[arg(short, long, value_parser = parse_duration)]
    pub timeout: Option<u64>,

    /// Count received bytes instead of assuming the download size
    #[arg(long)]
    pub measure_download: bool,

    /// History file location
    #[arg(long, value_name = "PATH")]
    pub history_file: Option<PathBuf>,

    /// Print the stored history instead of running a test
    #[arg(long, conflicts_with = "measure_download")]
    pub history: bool,

    /// Print results as JSON
    #[arg(long)]
    pub json: bool,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,

    /// Enable verbose output
    #[arg(long)]
    pub verbose: bool,

    /// Enable debug output
    #[arg(long)]
    pub debug: bool,

    /// Print an example .env file and exit
    #[arg(long)]
    pub show_env_example: bool,
}

impl Cli {
    /// Validate CLI arguments that clap cannot check on its own
    pub fn validate(&self) -> Result<(), String> {
        for (flag, urls) in [
            ("--latency-url", &self.latency_urls),
            ("--download-url", &self.download_urls),
            ("--upload-url", &self.upload_urls),
        ] {
            if urls.iter().any(|url| url.trim().is_empty()) {
                return Err(format!("{} cannot be empty", flag));
            }
        }

        Ok(())
    }

    /// Check if colors should be enabled
    pub fn use_colors(&self) -> bool {
        if self.no_color || self.json {
            false
        } else {
            supports_color()
        }
    }

    /// Whether the run is replaced by a history listing
    pub fn is_history_mode(&self) -> bool {
        self.history
    }
}

/// Parse duration from seconds string
fn parse_duration(s: &str) -> Result<u64, String> {
    if s.starts_with('+') || s.starts_with("0x") || s.starts_with("0X") {
        return Err(format!("Invalid duration: {}", s));
    }

    s.parse::<u64>()
        .map_err(|_| format!("Invalid duration: {}", s))
        .and_then(|secs| {
            if secs == 0 {
                Err("Duration must be greater than 0".to_string())
            } else if secs > crate::models::config::MAX_TIMEOUT_SECONDS {
                Err(format!(
                    "Duration cannot exceed {} seconds",
                    crate::models::config::MAX_TIMEOUT_SECONDS
                ))
            } else {
                Ok(secs)
            }
        })
}

fn parse_retries(s: &str) -> Result<u32, String> {
    let max = crate::models::config::MAX_RETRY_ATTEMPTS;
    s.parse::<u32>()
        .map_err(|_| format!("Invalid retry count: {}", s))
        .and_then(|n| {
            if (1..=max).contains(&n) {
                Ok(n)
            } else {
                Err(format!("Retry count must be between 1 and {}", max))
            }
        })
}

/// Check if the terminal supports color output
fn supports_color() -> bool {
    if let Ok(term) = std::env::var("TERM") {
        if term == "dumb" {
            return false;
        }
    }

    if std::env::var("NO_COLOR").is_ok() {
        return false;
    }

    if std::env::var("FORCE_COLOR").is_ok() {
        return true;
    }

    cfg!(unix)
}
