//! Environment variable handling and .env file management

use crate::client::HttpUtils;
use crate::error::{AppError, Result};
use std::path::Path;

/// Environment variable configuration manager
pub struct EnvManager;

impl EnvManager {
    /// Load .env file if it exists
    pub fn load_env_file(debug: bool) -> Result<()> {
        Self::load_env_file_from(Path::new(".env"), debug).map(|_| ())
    }

    /// Load a specific env file; returns whether it existed
    pub fn load_env_file_from(path: &Path, debug: bool) -> Result<bool> {
        if !path.exists() {
            if debug {
                eprintln!("No {} file found, using defaults and CLI arguments", path.display());
            }
            return Ok(false);
        }

        dotenv::from_path(path)
            .map_err(|e| AppError::config(format!("Failed to load {}: {}", path.display(), e)))?;

        if debug {
            eprintln!("Loaded configuration from {}", path.display());
        }

        Ok(true)
    }

    /// Create example .env file content
    pub fn create_example_env_content() -> String {
        let mut content = String::from(
            "# Network Speed Probe Configuration\n\
             #\n\
             # Values here are defaults; command-line arguments override them.\n\n",
        );

        for (var, description, example) in Self::get_supported_env_vars() {
            content.push_str(&format!("# {}\n# {}={}\n\n", description, var, example));
        }

        content
    }

    /// Save example .env file to disk
    pub fn save_example_env_file(path: &Path) -> Result<()> {
        std::fs::write(path, Self::create_example_env_content())
            .map_err(|e| AppError::config(format!("Failed to write example .env file: {}", e)))
    }

    /// Validate environment variable format before parsing
    pub fn validate_env_var(key: &str, value: &str) -> Result<()> {
        match key {
            "LATENCY_URLS" | "DOWNLOAD_URLS" | "UPLOAD_URLS" => {
                let urls: Vec<&str> = value.split(',').map(str::trim).filter(|u| !u.is_empty()).collect();
                if urls.is_empty() {
                    return Err(AppError::config(format!("{} must list at least one URL", key)));
                }
                for url in urls {
                    HttpUtils::validate_url(url)
                        .map_err(|e| AppError::config(format!("Invalid {} entry '{}': {}", key, url, e)))?;
                }
            }
            "RETRY_ATTEMPTS" => {
                let attempts: u32 = value
                    .parse()
                    .map_err(|e| AppError::config(format!("Invalid RETRY_ATTEMPTS value '{}': {}", value, e)))?;
                if attempts == 0 || attempts > crate::models::config::MAX_RETRY_ATTEMPTS {
                    return Err(AppError::config(format!(
                        "RETRY_ATTEMPTS must be between 1 and {}, got: {}",
                        crate::models::config::MAX_RETRY_ATTEMPTS,
                        attempts
                    )));
                }
            }
            "INITIAL_BACKOFF_MS" => {
                let backoff: u64 = value
                    .parse()
                    .map_err(|e| AppError::config(format!("Invalid INITIAL_BACKOFF_MS value '{}': {}", value, e)))?;
                if backoff > crate::models::config::MAX_INITIAL_BACKOFF_MS {
                    return Err(AppError::config(format!(
                        "INITIAL_BACKOFF_MS cannot exceed {}, got: {}",
                        crate::models::config::MAX_INITIAL_BACKOFF_MS,
                        backoff
                    )));
                }
            }
            "TIMEOUT_SECONDS" => {
                let timeout: u64 = value
                    .parse()
                    .map_err(|e| AppError::config(format!("Invalid TIMEOUT_SECONDS value '{}': {}", value, e)))?;
                if timeout == 0 || timeout > crate::models::config::MAX_TIMEOUT_SECONDS {
                    return Err(AppError::config(format!(
                        "TIMEOUT_SECONDS must be between 1 and {}, got: {}",
                        crate::models::config::MAX_TIMEOUT_SECONDS,
                        timeout
                    )));
                }
            }
            "DOWNLOAD_SIZING" => {
                crate::models::config::parse_download_sizing(value, Default::default())?;
            }
            "ASSUMED_DOWNLOAD_MB" => {
                let megabytes: f64 = value
                    .parse()
                    .map_err(|e| AppError::config(format!("Invalid ASSUMED_DOWNLOAD_MB value '{}': {}", value, e)))?;
                if !(megabytes.is_finite() && megabytes > 0.0) {
                    return Err(AppError::config("ASSUMED_DOWNLOAD_MB must be a positive number"));
                }
            }
            "UPLOAD_PAYLOAD_BYTES" => {
                let bytes: usize = value
                    .parse()
                    .map_err(|e| AppError::config(format!("Invalid UPLOAD_PAYLOAD_BYTES value '{}': {}", value, e)))?;
                if bytes == 0 || bytes > crate::models::config::MAX_UPLOAD_PAYLOAD_BYTES {
                    return Err(AppError::config(format!(
                        "UPLOAD_PAYLOAD_BYTES must be between 1 and {}, got: {}",
                        crate::models::config::MAX_UPLOAD_PAYLOAD_BYTES,
                        bytes
                    )));
                }
            }
            "ENABLE_COLOR" => {
                value
                    .parse::<bool>()
                    .map_err(|e| AppError::config(format!("Invalid ENABLE_COLOR value '{}': {}", value, e)))?;
            }
            _ => {
                // HISTORY_FILE and unknown variables are accepted as-is
            }
        }

        Ok(())
    }

    /// Get list of all supported environment variables with descriptions
    pub fn get_supported_env_vars() -> Vec<(&'static str, &'static str, &'static str)> {
        vec![
            ("LATENCY_URLS", "Comma-separated latency endpoints, in fallback order", "https://www.google.com,https://www.cloudflare.com"),
            ("DOWNLOAD_URLS", "Comma-separated download endpoints, in fallback order", "https://download.samplelib.com/mp4/sample-1s.mp4"),
            ("UPLOAD_URLS", "Comma-separated upload endpoints, in fallback order", "https://httpbin.org/post,https://postman-echo.com/post"),
            ("RETRY_ATTEMPTS", "Attempts per endpoint (1-10)", "3"),
            ("INITIAL_BACKOFF_MS", "Delay before the first retry, doubled on each retry", "500"),
            ("TIMEOUT_SECONDS", "Request timeout in seconds (1-300)", "30"),
            ("DOWNLOAD_SIZING", "How the download size is determined (assumed/measured)", "assumed"),
            ("ASSUMED_DOWNLOAD_MB", "Download size in megabytes when sizing is assumed", "0.1"),
            ("UPLOAD_PAYLOAD_BYTES", "Size of the zero-filled upload payload", "1048576"),
            ("HISTORY_FILE", "History file location", "/var/lib/nsp/history.json"),
            ("ENABLE_COLOR", "Enable colored output", "true"),
        ]
    }

    /// Display environment variable help
    pub fn display_env_help() -> String {
        let mut help = String::new();
        help.push_str("Supported Environment Variables:\n\n");

        for (var, description, example) in Self::get_supported_env_vars() {
            help.push_str(&format!("  {:<22} {}\n", var, description));
            help.push_str(&format!("  {:<22} Example: {}\n\n", "", example));
        }

        help.push_str("Configuration Priority (highest to lowest):\n");
        help.push_str("  1. Command-line arguments\n");
        help.push_str("  2. Environment variables\n");
        help.push_str("  3. .env file values\n");
        help.push_str("  4. Default values\n");

        help
    }

    /// Validate all currently set environment variables
    pub fn validate_current_env() -> Vec<String> {
        Self::get_supported_env_vars()
            .into_iter()
            .filter_map(|(var_name, _, _)| {
                let value = std::env::var(var_name).ok()?;
                Self::validate_env_var(var_name, &value)
                    .err()
                    .map(|e| format!("Warning: {}", e))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::{NamedTempFile, TempDir};

    #[test]
    fn test_example_content_lists_every_variable() {
        let content = EnvManager::create_example_env_content();

        assert!(content.starts_with("# Network Speed Probe Configuration"));
        for (var, _, _) in EnvManager::get_supported_env_vars() {
            assert!(content.contains(&format!("# {}=", var)), "missing {}", var);
        }
    }

    #[test]
    fn test_example_values_are_valid() {
        for (var, _, example) in EnvManager::get_supported_env_vars() {
            assert!(EnvManager::validate_env_var(var, example).is_ok(), "{} example invalid", var);
        }
    }

    #[test]
    fn test_save_example_file() {
        let temp_file = NamedTempFile::new().unwrap();
        EnvManager::save_example_env_file(temp_file.path()).unwrap();

        let content = std::fs::read_to_string(temp_file.path()).unwrap();
        assert!(content.contains("RETRY_ATTEMPTS"));
    }

    #[test]
    fn test_validate_env_var() {
        assert!(EnvManager::validate_env_var("LATENCY_URLS", "https://a.example, https://b.example").is_ok());
        assert!(EnvManager::validate_env_var("DOWNLOAD_SIZING", "measured").is_ok());
        assert!(EnvManager::validate_env_var("INITIAL_BACKOFF_MS", "0").is_ok());

        assert!(EnvManager::validate_env_var("UPLOAD_URLS", " , ").is_err());
        assert!(EnvManager::validate_env_var("LATENCY_URLS", "ftp://a.example").is_err());
        assert!(EnvManager::validate_env_var("RETRY_ATTEMPTS", "0").is_err());
        assert!(EnvManager::validate_env_var("RETRY_ATTEMPTS", "11").is_err());
        assert!(EnvManager::validate_env_var("INITIAL_BACKOFF_MS", "60001").is_err());
        assert!(EnvManager::validate_env_var("TIMEOUT_SECONDS", "0").is_err());
        assert!(EnvManager::validate_env_var("DOWNLOAD_SIZING", "exact").is_err());
        assert!(EnvManager::validate_env_var("ASSUMED_DOWNLOAD_MB", "-1").is_err());
        assert!(EnvManager::validate_env_var("UPLOAD_PAYLOAD_BYTES", "0").is_err());
        assert!(EnvManager::validate_env_var("UPLOAD_PAYLOAD_BYTES", "20000000000000").is_err());
        assert!(EnvManager::validate_env_var("ENABLE_COLOR", "maybe").is_err());
        assert!(EnvManager::validate_env_var("SOMETHING_ELSE", "anything").is_ok());
    }

    #[test]
    fn test_display_env_help() {
        let help = EnvManager::display_env_help();
        assert!(help.contains("Supported Environment Variables:"));
        assert!(help.contains("DOWNLOAD_SIZING"));
        assert!(help.contains("Configuration Priority"));
    }

    #[test]
    fn test_load_missing_env_file() {
        let dir = TempDir::new().unwrap();
        let loaded = EnvManager::load_env_file_from(&dir.path().join(".env"), false).unwrap();
        assert!(!loaded);
    }

    #[test]
    fn test_load_env_file_sets_variables() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(".env");
        std::fs::write(&path, "NSP_TEST_ONLY_MARKER=loaded\n").unwrap();

        assert!(EnvManager::load_env_file_from(&path, false).unwrap());
        assert_eq!(std::env::var("NSP_TEST_ONLY_MARKER").unwrap(), "loaded");
    }
}
