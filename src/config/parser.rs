//! Configuration parsing from CLI arguments and environment variables

use crate::{
    cli::Cli,
    config::env::EnvManager,
    error::Result,
    models::Config,
    types::{DownloadSizing, OutputFormat},
};

/// Configuration parser that combines CLI arguments with environment variables
pub struct ConfigParser {
    cli: Cli,
}

impl ConfigParser {
    /// Create a new configuration parser with CLI arguments
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Parse and build the complete configuration
    pub fn parse(&self) -> Result<Config> {
        let mut config = Config::default();

        EnvManager::load_env_file(self.cli.debug)?;
        config.merge_from_env()?;

        self.apply_cli_overrides(&mut config);
        config.validate()?;

        Ok(config)
    }

    /// Apply CLI argument overrides to configuration
    pub fn apply_cli_overrides(&self, config: &mut Config) {
        let cli = &self.cli;

        if !cli.latency_urls.is_empty() {
            config.latency_urls = cli.latency_urls.clone();
        }
        if !cli.download_urls.is_empty() {
            config.download_urls = cli.download_urls.clone();
        }
        if !cli.upload_urls.is_empty() {
            config.upload_urls = cli.upload_urls.clone();
        }

        if let Some(retries) = cli.retries {
            config.retry_attempts = retries;
        }
        if let Some(backoff) = cli.backoff_ms {
            config.initial_backoff_ms = backoff;
        }
        if let Some(timeout) = cli.timeout {
            config.timeout_seconds = timeout;
        }

        if cli.measure_download {
            config.download_sizing = DownloadSizing::Measured;
        }

        if let Some(path) = &cli.history_file {
            config.history_file = Some(path.clone());
        }

        if cli.json {
            config.output_format = OutputFormat::Json;
        }

        if !cli.use_colors() {
            config.enable_color = false;
        }

        // Verbose and debug are CLI-only
        config.verbose = cli.verbose;
        config.debug = cli.debug;
    }
}

/// Convenience function to load complete configuration from CLI arguments
pub fn load_config(cli: Cli) -> Result<Config> {
    ConfigParser::new(cli).parse()
}

/// Display configuration summary for debug purposes
pub fn display_config_summary(config: &Config) -> String {
    let mut summary = Vec::new();

    summary.push(format!("Latency URLs: {}", config.latency_urls.join(", ")));
    summary.push(format!("Download URLs: {}", config.download_urls.join(", ")));
    summary.push(format!("Upload URLs: {}", config.upload_urls.join(", ")));
    summary.push(format!(
        "Retry: {} attempt(s), {}ms initial backoff",
        config.retry_attempts, config.initial_backoff_ms
    ));
    summary.push(format!("Timeout: {}s", config.timeout_seconds));
    summary.push(match config.download_sizing {
        DownloadSizing::Assumed { megabytes } => format!("Download sizing: assumed {} MB", megabytes),
        DownloadSizing::Measured => "Download sizing: measured".to_string(),
    });
    summary.push(format!("Upload payload: {} bytes", config.upload_payload_bytes));
    summary.push(format!("History file: {}", config.history_path().display()));
    summary.push(format!("Color Output: {}", config.enable_color));
    summary.push(format!("Verbose: {}", config.verbose));
    summary.push(format!("Debug: {}", config.debug));

    summary.join("\n")
}
