//! Structured logging for the network speed probe
//!
//! Every line carries the emitting component, optional structured fields
//! and, while a measurement run is in progress, the run's correlation id.
//! Console output is meant for people; the JSON format (enabled with
//! `--debug`) emits one object per line. Log lines go to stderr so that
//! stdout only carries results.

use crate::client::HttpUtils;
use crate::error::{AppError, FetchError};
use crate::models::Config;
use crate::types::ProbeKind;
use chrono::{DateTime, Utc};
use colored::Colorize;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::io::{self, Write};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use uuid::Uuid;

/// Severity of a log line, ordered from chattiest to most severe
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn label(self) -> &'static str {
        match self {
            Self::Trace => "TRACE",
            Self::Debug => "DEBUG",
            Self::Info => "INFO",
            Self::Warn => "WARN",
            Self::Error => "ERROR",
        }
    }

    /// Right-aligned label, colored per severity when `color` is set
    fn padded(self, color: bool) -> String {
        let text = format!("{:>5}", self.label());
        if !color {
            return text;
        }
        match self {
            Self::Trace => text.dimmed().to_string(),
            Self::Debug => text.cyan().to_string(),
            Self::Info => text.green().to_string(),
            Self::Warn => text.yellow().to_string(),
            Self::Error => text.red().bold().to_string(),
        }
    }
}

impl std::str::FromStr for LogLevel {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let level = match s.trim().to_ascii_lowercase().as_str() {
            "trace" => Self::Trace,
            "debug" => Self::Debug,
            "info" => Self::Info,
            "warn" | "warning" => Self::Warn,
            "error" => Self::Error,
            other => return Err(AppError::parse(format!("Unknown log level '{}'", other))),
        };
        Ok(level)
    }
}

/// One structured log line
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntry {
    pub timestamp: DateTime<Utc>,
    pub level: LogLevel,
    pub component: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub correlation_id: Option<String>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub fields: BTreeMap<String, serde_json::Value>,
    /// `file:line` of the call site, filled by the logging macros
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Console,
    Json,
}

/// Named logger; clones share the session id
#[derive(Clone)]
pub struct Logger {
    name: String,
    min_level: LogLevel,
    format: LogFormat,
    use_color: bool,
    include_location: bool,
    session_id: Arc<RwLock<Option<String>>>,
}

impl Logger {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            min_level: LogLevel::Info,
            format: LogFormat::Console,
            use_color: false,
            include_location: false,
            session_id: Arc::new(RwLock::new(None)),
        }
    }

    /// Level and format follow `--debug` / `--verbose`: debug gets JSON
    /// lines with call sites, verbose gets info, otherwise warnings only.
    pub fn with_config(name: &str, config: &Config) -> Self {
        let (min_level, format) = match (config.debug, config.verbose) {
            (true, _) => (LogLevel::Debug, LogFormat::Json),
            (false, true) => (LogLevel::Info, LogFormat::Console),
            (false, false) => (LogLevel::Warn, LogFormat::Console),
        };

        Self {
            min_level,
            format,
            use_color: config.enable_color,
            include_location: config.debug,
            ..Self::new(name)
        }
    }

    /// A logger that only emits errors
    pub fn quiet(name: &str) -> Self {
        Self {
            min_level: LogLevel::Error,
            ..Self::new(name)
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn enabled(&self, level: LogLevel) -> bool {
        level >= self.min_level
    }

    pub async fn set_session_id(&self, session_id: String) {
        *self.session_id.write().await = Some(session_id);
    }

    pub fn log(&self, level: LogLevel, message: &str) -> LogEntryBuilder<'_> {
        LogEntryBuilder {
            logger: self,
            entry: LogEntry {
                timestamp: Utc::now(),
                level,
                component: self.name.clone(),
                message: message.to_string(),
                correlation_id: None,
                fields: BTreeMap::new(),
                location: None,
            },
        }
    }

    pub fn debug(&self, message: &str) -> LogEntryBuilder<'_> {
        self.log(LogLevel::Debug, message)
    }

    pub fn info(&self, message: &str) -> LogEntryBuilder<'_> {
        self.log(LogLevel::Info, message)
    }

    pub fn warn(&self, message: &str) -> LogEntryBuilder<'_> {
        self.log(LogLevel::Warn, message)
    }

    pub fn error(&self, message: &str) -> LogEntryBuilder<'_> {
        self.log(LogLevel::Error, message)
    }

    async fn emit(&self, mut entry: LogEntry) {
        if !self.enabled(entry.level) {
            return;
        }

        if let Some(session_id) = self.session_id.read().await.as_ref() {
            entry
                .fields
                .insert("session_id".to_string(), serde_json::Value::from(session_id.as_str()));
        }

        let line = self.render(&entry);
        let _ = writeln!(io::stderr().lock(), "{}", line);
    }

    fn render(&self, entry: &LogEntry) -> String {
        match self.format {
            LogFormat::Json => serde_json::to_string(entry).unwrap_or_else(|e| {
                format!("{{\"level\":\"ERROR\",\"message\":\"unserializable log entry: {}\"}}", e)
            }),
            LogFormat::Console => self.render_console(entry),
        }
    }

    fn render_console(&self, entry: &LogEntry) -> String {
        let mut line = format!(
            "{} {} [{}] {}",
            entry.timestamp.format("%H:%M:%S%.3f"),
            entry.level.padded(self.use_color),
            entry.component,
            entry.message
        );

        if let Some(id) = &entry.correlation_id {
            line.push_str(&format!(" run={}", id.get(..8).unwrap_or(id)));
        }

        if !entry.fields.is_empty() {
            let fields: Vec<String> = entry.fields.iter().map(|(k, v)| format!("{}={}", k, v)).collect();
            line.push_str(&format!(" {{{}}}", fields.join(" ")));
        }

        if self.include_location {
            if let Some(location) = &entry.location {
                line.push_str(&format!(" ({})", location));
            }
        }

        line
    }
}

/// Accumulates fields for one log line; nothing is written until `log()`
pub struct LogEntryBuilder<'a> {
    logger: &'a Logger,
    entry: LogEntry,
}

impl LogEntryBuilder<'_> {
    pub fn correlation_id(mut self, id: &str) -> Self {
        self.entry.correlation_id = Some(id.to_string());
        self
    }

    pub fn field<T: Serialize>(mut self, key: &str, value: T) -> Self {
        if let Ok(value) = serde_json::to_value(value) {
            self.entry.fields.insert(key.to_string(), value);
        }
        self
    }

    pub fn location(mut self, file: &str, line: u32) -> Self {
        self.entry.location = Some(format!("{}:{}", file, line));
        self
    }

    pub fn app_error(self, error: &AppError) -> Self {
        self.field("error_category", error.category())
            .field("exit_code", error.exit_code())
    }

    pub fn fetch_error(self, error: &FetchError) -> Self {
        self.field("error_kind", error.kind())
            .field("error", error.to_string())
    }

    pub async fn log(self) {
        self.logger.emit(self.entry).await;
    }
}

/// Logger for individual fetch attempts and candidate fallback
#[derive(Clone)]
pub struct FetchLogger {
    logger: Logger,
}

impl FetchLogger {
    pub fn new(config: &Config) -> Self {
        Self {
            logger: Logger::with_config("FETCH", config),
        }
    }

    pub fn from_logger(logger: Logger) -> Self {
        Self { logger }
    }

    /// Log the result of one request attempt
    pub async fn log_attempt(
        &self,
        url: &str,
        method: &str,
        attempt: u32,
        status_code: Option<u16>,
        duration: Duration,
    ) {
        let success = status_code.is_some_and(|code| (200..300).contains(&code));
        let level = if success { LogLevel::Debug } else { LogLevel::Info };
        let duration_ms = duration.as_secs_f64() * 1000.0;

        let message = format!(
            "{} {} (attempt {}) -> {} in {:.1}ms",
            method,
            url,
            attempt,
            status_code.map_or("FAILED".to_string(), |c| c.to_string()),
            duration_ms
        );

        self.logger
            .log(level, &message)
            .field("url", url)
            .field("method", method)
            .field("attempt", attempt)
            .field("status_code", status_code)
            .field("success", success)
            .field("duration_ms", duration_ms)
            .log()
            .await;
    }

    /// Log a backoff wait before the next attempt
    pub async fn log_backoff(&self, url: &str, next_attempt: u32, delay: Duration) {
        self.logger
            .debug(&format!("Retrying {} in {}ms (attempt {})", url, delay.as_millis(), next_attempt))
            .field("url", url)
            .field("next_attempt", next_attempt)
            .field("backoff_ms", delay.as_millis() as u64)
            .log()
            .await;
    }

    fn candidate_failed_message(url: &str, remaining: usize) -> String {
        format!(
            "Failed to fetch from {}, {} candidate(s) left",
            HttpUtils::display_host(url),
            remaining
        )
    }

    /// Log that a candidate exhausted its retries and the next one is tried
    pub async fn log_candidate_failed(&self, url: &str, index: usize, remaining: usize, error: &FetchError) {
        self.logger
            .warn(&Self::candidate_failed_message(url, remaining))
            .field("url", url)
            .field("candidate_index", index)
            .field("remaining", remaining)
            .fetch_error(error)
            .log()
            .await;
    }

    /// Log a completed probe
    pub async fn log_probe_result(&self, kind: ProbeKind, value: Option<String>, correlation_id: &str) {
        let message = match &value {
            Some(v) => format!("{} probe: {} {}", kind, v, kind.unit()),
            None => format!("{} probe failed", kind),
        };

        self.logger
            .info(&message)
            .correlation_id(correlation_id)
            .field("probe", kind)
            .field("value", value)
            .log()
            .await;
    }
}

/// Error event logger with enhanced context
#[derive(Clone)]
pub struct ErrorEventLogger {
    logger: Logger,
}

impl ErrorEventLogger {
    pub fn new(config: &Config) -> Self {
        Self {
            logger: Logger::with_config("ERR", config),
        }
    }

    pub fn from_logger(logger: Logger) -> Self {
        Self { logger }
    }

    /// Log an application error with context
    pub async fn log_error(&self, error: &AppError, context: Option<&str>, correlation_id: Option<&str>) {
        let message = match context {
            Some(ctx) => format!("{}: {}", ctx, error),
            None => error.to_string(),
        };

        let mut builder = self.logger.error(&message).app_error(error);
        if let Some(id) = correlation_id {
            builder = builder.correlation_id(id);
        }
        if let Some(ctx) = context {
            builder = builder.field("context", ctx);
        }
        builder.log().await;
    }

    /// Log a probe that ended with the failure marker
    pub async fn log_probe_failure(&self, kind: ProbeKind, error: &FetchError, correlation_id: &str) {
        self.logger
            .error(&format!("{} test failed: {}", kind, error))
            .correlation_id(correlation_id)
            .field("probe", kind)
            .fetch_error(error)
            .log()
            .await;
    }
}

/// Logger factory sharing one session ID across loggers
pub struct LoggerFactory {
    config: Config,
    session_id: String,
}

impl LoggerFactory {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            session_id: Uuid::new_v4().to_string(),
        }
    }

    /// Create a logger with a specific name
    pub async fn create_logger(&self, name: &str) -> Logger {
        let logger = Logger::with_config(name, &self.config);
        logger.set_session_id(self.session_id.clone()).await;
        logger
    }

    pub async fn create_fetch_logger(&self) -> FetchLogger {
        FetchLogger::from_logger(self.create_logger("FETCH").await)
    }

    pub async fn create_error_logger(&self) -> ErrorEventLogger {
        ErrorEventLogger::from_logger(self.create_logger("ERR").await)
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }
}

/// Convenience macros for logging with location information
#[macro_export]
macro_rules! log_debug {
    ($logger:expr, $($arg:tt)*) => {
        $logger.debug(&format!($($arg)*))
            .location(file!(), line!())
            .log()
            .await
    };
}

#[macro_export]
macro_rules! log_info {
    ($logger:expr, $($arg:tt)*) => {
        $logger.info(&format!($($arg)*))
            .location(file!(), line!())
            .log()
            .await
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn entry() -> LogEntry {
        let mut fields = BTreeMap::new();
        fields.insert("url".to_string(), serde_json::Value::from("https://a.example"));
        fields.insert("attempt".to_string(), serde_json::Value::from(2));
        LogEntry {
            timestamp: Utc::now(),
            level: LogLevel::Warn,
            component: "FETCH".to_string(),
            message: "candidate failed".to_string(),
            correlation_id: Some("0123456789abcdef".to_string()),
            fields,
            location: Some("src/fetch/retry.rs:42".to_string()),
        }
    }

    #[test]
    fn test_log_level_parsing() {
        assert_eq!(LogLevel::from_str("DEBUG").unwrap(), LogLevel::Debug);
        assert_eq!(LogLevel::from_str(" info ").unwrap(), LogLevel::Info);
        assert_eq!(LogLevel::from_str("warning").unwrap(), LogLevel::Warn);
        assert!(LogLevel::from_str("fatal").is_err());
        assert!(LogLevel::Debug < LogLevel::Warn);
    }

    #[test]
    fn test_level_follows_flags() {
        let debug = Logger::with_config(
            "T",
            &Config {
                debug: true,
                ..Default::default()
            },
        );
        assert_eq!(debug.format, LogFormat::Json);
        assert!(debug.enabled(LogLevel::Debug));
        assert!(debug.include_location);

        let verbose = Logger::with_config(
            "T",
            &Config {
                verbose: true,
                ..Default::default()
            },
        );
        assert!(verbose.enabled(LogLevel::Info));
        assert!(!verbose.enabled(LogLevel::Debug));

        let default = Logger::with_config("T", &Config::default());
        assert!(!default.enabled(LogLevel::Info));
        assert!(default.enabled(LogLevel::Warn));

        assert!(!Logger::quiet("T").enabled(LogLevel::Warn));
    }

    #[test]
    fn test_console_line() {
        let line = Logger::new("FETCH").render_console(&entry());

        assert!(line.contains(" WARN [FETCH] candidate failed run=01234567"));
        // BTreeMap keeps fields sorted
        assert!(line.ends_with("{attempt=2 url=\"https://a.example\"}"));
    }

    #[test]
    fn test_json_line_skips_empty_parts() {
        let mut logger = Logger::new("FETCH");
        logger.format = LogFormat::Json;

        let mut bare = entry();
        bare.correlation_id = None;
        bare.fields.clear();
        bare.location = None;

        let parsed: serde_json::Value = serde_json::from_str(&logger.render(&bare)).unwrap();
        assert_eq!(parsed["level"], "WARN");
        assert_eq!(parsed["component"], "FETCH");
        assert!(parsed.get("fields").is_none());
        assert!(parsed.get("correlation_id").is_none());
    }

    #[test]
    fn test_short_correlation_id() {
        let mut short = entry();
        short.correlation_id = Some("abc".to_string());
        assert!(Logger::new("T").render_console(&short).contains("run=abc"));
    }

    #[test]
    fn test_candidate_failure_names_host() {
        assert_eq!(
            FetchLogger::candidate_failed_message("https://httpbin.org/post", 2),
            "Failed to fetch from httpbin.org, 2 candidate(s) left"
        );
        assert_eq!(
            FetchLogger::candidate_failed_message("not a url", 0),
            "Failed to fetch from not a url, 0 candidate(s) left"
        );
    }

    #[tokio::test]
    async fn test_fetch_and_error_loggers() {
        let config = Config::default();
        let fetch_logger = FetchLogger::new(&config);
        fetch_logger
            .log_attempt("https://a.example", "GET", 1, Some(200), Duration::from_millis(12))
            .await;
        fetch_logger
            .log_attempt("https://a.example", "GET", 2, None, Duration::from_millis(12))
            .await;
        fetch_logger.log_backoff("https://a.example", 2, Duration::from_millis(500)).await;
        fetch_logger
            .log_probe_result(ProbeKind::Latency, Some("120".to_string()), "id")
            .await;

        let err_logger = ErrorEventLogger::new(&config);
        err_logger
            .log_error(&AppError::storage("disk full"), Some("Saving history"), None)
            .await;
        err_logger
            .log_probe_failure(
                ProbeKind::Download,
                &FetchError::invalid_configuration("no candidates"),
                "id",
            )
            .await;
    }

    #[tokio::test]
    async fn test_logger_factory_shares_session() {
        let factory = LoggerFactory::new(Config::default());
        let logger = factory.create_logger("APP").await;
        assert_eq!(logger.name(), "APP");

        let clone = logger.clone();
        assert_eq!(clone.session_id.read().await.as_deref(), Some(factory.session_id()));
    }
}
