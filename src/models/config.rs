//! Configuration data model and validation

use crate::client::HttpUtils;
use crate::fetch::RetryPolicy;
use crate::types::{AppError, DownloadSizing, OutputFormat, ProbeKind, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

pub const MAX_RETRY_ATTEMPTS: u32 = 10;
pub const MAX_INITIAL_BACKOFF_MS: u64 = 60_000;
pub const MAX_TIMEOUT_SECONDS: u64 = 300;
/// The payload is allocated in full before the upload starts
pub const MAX_UPLOAD_PAYLOAD_BYTES: usize = 256 * 1024 * 1024;

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Candidate endpoints for the latency probe, in fallback order
    #[serde(default = "default_latency_urls")]
    pub latency_urls: Vec<String>,

    /// Candidate endpoints for the download probe, in fallback order
    #[serde(default = "default_download_urls")]
    pub download_urls: Vec<String>,

    /// Candidate endpoints for the upload probe, in fallback order
    #[serde(default = "default_upload_urls")]
    pub upload_urls: Vec<String>,

    /// Attempts per candidate before moving to the next one
    #[serde(default = "default_retry_attempts")]
    pub retry_attempts: u32,

    /// Delay before the second attempt; doubles after every further failure
    #[serde(default = "default_initial_backoff_ms")]
    pub initial_backoff_ms: u64,

    /// Per-request timeout
    #[serde(default = "default_timeout_secs")]
    pub timeout_seconds: u64,

    #[serde(default)]
    pub download_sizing: DownloadSizing,

    #[serde(default = "default_upload_payload_bytes")]
    pub upload_payload_bytes: usize,

    /// Override for the history file location
    #[serde(default)]
    pub history_file: Option<PathBuf>,

    #[serde(default = "default_enable_color")]
    pub enable_color: bool,

    #[serde(default)]
    pub output_format: OutputFormat,

    #[serde(default)]
    pub verbose: bool,

    #[serde(default)]
    pub debug: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            latency_urls: default_latency_urls(),
            download_urls: default_download_urls(),
            upload_urls: default_upload_urls(),
            retry_attempts: default_retry_attempts(),
            initial_backoff_ms: default_initial_backoff_ms(),
            timeout_seconds: default_timeout_secs(),
            download_sizing: DownloadSizing::default(),
            upload_payload_bytes: default_upload_payload_bytes(),
            history_file: None,
            enable_color: default_enable_color(),
            output_format: OutputFormat::default(),
            verbose: false,
            debug: false,
        }
    }
}

impl Config {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }

    pub fn initial_backoff(&self) -> Duration {
        Duration::from_millis(self.initial_backoff_ms)
    }

    /// Retry policy applied to every candidate of every probe
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.retry_attempts, self.initial_backoff())
    }

    /// Candidate list for a probe kind
    pub fn endpoints(&self, kind: ProbeKind) -> &[String] {
        match kind {
            ProbeKind::Latency => &self.latency_urls,
            ProbeKind::Download => &self.download_urls,
            ProbeKind::Upload => &self.upload_urls,
        }
    }

    /// Resolve the history file path, following the XDG data directory
    pub fn history_path(&self) -> PathBuf {
        if let Some(path) = &self.history_file {
            return path.clone();
        }

        let data_dir = if let Ok(xdg_data) = std::env::var("XDG_DATA_HOME") {
            PathBuf::from(xdg_data)
        } else if let Ok(home) = std::env::var("HOME") {
            PathBuf::from(home).join(".local").join("share")
        } else {
            return PathBuf::from(crate::defaults::HISTORY_FILE_NAME);
        };

        data_dir
            .join(crate::PKG_NAME)
            .join(crate::defaults::HISTORY_FILE_NAME)
    }

    /// Validate the configuration and return the first problem found
    pub fn validate(&self) -> Result<()> {
        for kind in ProbeKind::ALL {
            let urls = self.endpoints(kind);
            if urls.is_empty() {
                return Err(AppError::config(format!(
                    "{} endpoint list cannot be empty",
                    kind
                )));
            }
            for url in urls {
                HttpUtils::validate_url(url).map_err(|e| {
                    AppError::config(format!("Invalid {} endpoint '{}': {}", kind.name().to_lowercase(), url, e))
                })?;
            }
        }

        if self.retry_attempts == 0 {
            return Err(AppError::config("Retry attempts must be at least 1"));
        }

        if self.retry_attempts > MAX_RETRY_ATTEMPTS {
            return Err(AppError::config(format!(
                "Retry attempts cannot exceed {}",
                MAX_RETRY_ATTEMPTS
            )));
        }

        if self.initial_backoff_ms > MAX_INITIAL_BACKOFF_MS {
            return Err(AppError::config(format!(
                "Initial backoff cannot exceed {}ms",
                MAX_INITIAL_BACKOFF_MS
            )));
        }

        if self.timeout_seconds == 0 {
            return Err(AppError::config("Timeout must be greater than 0"));
        }

        if self.timeout_seconds > MAX_TIMEOUT_SECONDS {
            return Err(AppError::config(format!(
                "Timeout cannot exceed {} seconds",
                MAX_TIMEOUT_SECONDS
            )));
        }

        if let DownloadSizing::Assumed { megabytes } = self.download_sizing {
            if !(megabytes.is_finite() && megabytes > 0.0) {
                return Err(AppError::config("Assumed download size must be a positive number of megabytes"));
            }
        }

        if self.upload_payload_bytes == 0 {
            return Err(AppError::config("Upload payload size must be greater than 0"));
        }

        if self.upload_payload_bytes > MAX_UPLOAD_PAYLOAD_BYTES {
            return Err(AppError::config(format!(
                "Upload payload cannot exceed {} bytes",
                MAX_UPLOAD_PAYLOAD_BYTES
            )));
        }

        Ok(())
    }

    /// Merge environment variables into this configuration
    pub fn merge_from_env(&mut self) -> Result<()> {
        if let Ok(urls) = std::env::var("LATENCY_URLS") {
            self.latency_urls = split_list(&urls);
        }

        if let Ok(urls) = std::env::var("DOWNLOAD_URLS") {
            self.download_urls = split_list(&urls);
        }

        if let Ok(urls) = std::env::var("UPLOAD_URLS") {
            self.upload_urls = split_list(&urls);
        }

        if let Ok(attempts) = std::env::var("RETRY_ATTEMPTS") {
            self.retry_attempts = attempts
                .parse()
                .map_err(|e| AppError::config(format!("Invalid RETRY_ATTEMPTS value '{}': {}", attempts, e)))?;
        }

        if let Ok(backoff) = std::env::var("INITIAL_BACKOFF_MS") {
            self.initial_backoff_ms = backoff
                .parse()
                .map_err(|e| AppError::config(format!("Invalid INITIAL_BACKOFF_MS value '{}': {}", backoff, e)))?;
        }

        if let Ok(timeout) = std::env::var("TIMEOUT_SECONDS") {
            self.timeout_seconds = timeout
                .parse()
                .map_err(|e| AppError::config(format!("Invalid TIMEOUT_SECONDS value '{}': {}", timeout, e)))?;
        }

        if let Ok(sizing) = std::env::var("DOWNLOAD_SIZING") {
            self.download_sizing = parse_download_sizing(&sizing, self.download_sizing)?;
        }

        if let Ok(megabytes) = std::env::var("ASSUMED_DOWNLOAD_MB") {
            let megabytes: f64 = megabytes
                .parse()
                .map_err(|e| AppError::config(format!("Invalid ASSUMED_DOWNLOAD_MB value '{}': {}", megabytes, e)))?;
            if let DownloadSizing::Assumed { .. } = self.download_sizing {
                self.download_sizing = DownloadSizing::Assumed { megabytes };
            }
        }

        if let Ok(bytes) = std::env::var("UPLOAD_PAYLOAD_BYTES") {
            self.upload_payload_bytes = bytes
                .parse()
                .map_err(|e| AppError::config(format!("Invalid UPLOAD_PAYLOAD_BYTES value '{}': {}", bytes, e)))?;
        }

        if let Ok(path) = std::env::var("HISTORY_FILE") {
            if !path.trim().is_empty() {
                self.history_file = Some(PathBuf::from(path.trim()));
            }
        }

        if let Ok(enable_color) = std::env::var("ENABLE_COLOR") {
            self.enable_color = enable_color
                .parse()
                .map_err(|e| AppError::config(format!("Invalid ENABLE_COLOR value '{}': {}", enable_color, e)))?;
        }

        Ok(())
    }
}

/// Split a comma-separated list, dropping empty items
pub(crate) fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

/// Parse `assumed` / `measured`, keeping the current assumed size if any
pub(crate) fn parse_download_sizing(value: &str, current: DownloadSizing) -> Result<DownloadSizing> {
    match value.trim().to_lowercase().as_str() {
        "assumed" => Ok(match current {
            DownloadSizing::Assumed { megabytes } => DownloadSizing::Assumed { megabytes },
            DownloadSizing::Measured => DownloadSizing::default(),
        }),
        "measured" => Ok(DownloadSizing::Measured),
        other => Err(AppError::config(format!(
            "Invalid DOWNLOAD_SIZING value '{}': expected 'assumed' or 'measured'",
            other
        ))),
    }
}

fn to_strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|&s| s.to_string()).collect()
}

// Default value functions for serde
fn default_latency_urls() -> Vec<String> {
    to_strings(crate::defaults::DEFAULT_LATENCY_URLS)
}

fn default_download_urls() -> Vec<String> {
    to_strings(crate::defaults::DEFAULT_DOWNLOAD_URLS)
}

fn default_upload_urls() -> Vec<String> {
    to_strings(crate::defaults::DEFAULT_UPLOAD_URLS)
}

fn default_retry_attempts() -> u32 {
    crate::defaults::DEFAULT_RETRY_ATTEMPTS
}

fn default_initial_backoff_ms() -> u64 {
    crate::defaults::DEFAULT_INITIAL_BACKOFF.as_millis() as u64
}

fn default_timeout_secs() -> u64 {
    crate::defaults::DEFAULT_TIMEOUT.as_secs()
}

fn default_upload_payload_bytes() -> usize {
    crate::defaults::DEFAULT_UPLOAD_PAYLOAD_BYTES
}

fn default_enable_color() -> bool {
    crate::defaults::DEFAULT_ENABLE_COLOR
}
