//! Error handling for the network speed probe

use thiserror::Error;

/// Failure of a single request attempt
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TransportError {
    /// The server answered with a status outside the 2xx class
    #[error("HTTP status {0}")]
    Status(u16),

    /// The request did not complete within the configured timeout
    #[error("request timed out: {0}")]
    Timeout(String),

    /// DNS or TCP/TLS connection failure
    #[error("connection failed: {0}")]
    Connect(String),

    /// Any other transport-level failure (body read, protocol error, ...)
    #[error("transport error: {0}")]
    Other(String),
}

impl From<reqwest::Error> for TransportError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            Self::Timeout(error.to_string())
        } else if error.is_connect() {
            Self::Connect(error.to_string())
        } else if let Some(status) = error.status() {
            Self::Status(status.as_u16())
        } else {
            Self::Other(error.to_string())
        }
    }
}

/// Errors raised by the retry and fallback primitives
#[derive(Error, Debug, Clone)]
pub enum FetchError {
    /// One attempt failed; recovered locally by the retry loop
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// Every retry against one candidate failed
    #[error("request to {url} failed after {attempts} attempt(s): {source}")]
    RequestFailed {
        url: String,
        attempts: u32,
        #[source]
        source: TransportError,
    },

    /// Every candidate in the list exhausted its retries
    #[error("all {candidates} source(s) failed")]
    AllSourcesFailed {
        candidates: usize,
        #[source]
        last: Box<FetchError>,
    },

    /// The call could not be attempted at all (empty list, zero attempts)
    #[error("invalid fetch configuration: {0}")]
    InvalidConfiguration(String),
}

impl FetchError {
    /// Create an invalid-configuration error
    pub fn invalid_configuration<S: Into<String>>(message: S) -> Self {
        Self::InvalidConfiguration(message.into())
    }

    /// Short tag used in log fields
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Transport(_) => "transport",
            Self::RequestFailed { .. } => "request_failed",
            Self::AllSourcesFailed { .. } => "all_sources_failed",
            Self::InvalidConfiguration(_) => "invalid_configuration",
        }
    }
}

/// Errors that reach the command line
///
/// Probe failures never end up here: they become failure markers in the
/// report. These are the errors that stop the program, each mapped to an
/// exit code and a hint for the user.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("I/O error: {0}")]
    Io(String),

    #[error("Parsing error: {0}")]
    Parse(String),

    /// The history file could not be read, decoded or written
    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config(message.into())
    }

    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation(message.into())
    }

    pub fn network<S: Into<String>>(message: S) -> Self {
        Self::Network(message.into())
    }

    pub fn io<S: Into<String>>(message: S) -> Self {
        Self::Io(message.into())
    }

    pub fn parse<S: Into<String>>(message: S) -> Self {
        Self::Parse(message.into())
    }

    pub fn storage<S: Into<String>>(message: S) -> Self {
        Self::Storage(message.into())
    }

    pub fn internal<S: Into<String>>(message: S) -> Self {
        Self::Internal(message.into())
    }

    /// Tag used in log fields and console reports
    pub fn category(&self) -> &'static str {
        match self {
            Self::Config(_) => "CONFIG",
            Self::Validation(_) => "VALIDATION",
            Self::Network(_) => "NETWORK",
            Self::Io(_) => "IO",
            Self::Parse(_) => "PARSE",
            Self::Storage(_) => "STORAGE",
            Self::Internal(_) => "INTERNAL",
        }
    }

    /// Whether running the same command again may succeed
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::Network(_))
    }

    /// Process exit code; 0 is reserved for completed runs, failed probes included
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Config(_) | Self::Validation(_) | Self::Parse(_) => 1,
            Self::Network(_) => 2,
            Self::Io(_) | Self::Storage(_) => 5,
            Self::Internal(_) => 99,
        }
    }

    /// One-line suggestion shown by the verbose error report
    pub fn hint(&self) -> &'static str {
        match self {
            Self::Config(_) | Self::Validation(_) => {
                "Check your .env file and command-line flags (see --show-env-example)."
            }
            Self::Network(_) => "The HTTP client could not start; check the system TLS and proxy settings.",
            Self::Io(_) => "Check file permissions and free disk space.",
            Self::Parse(_) => "Check the format of the value named above.",
            Self::Storage(_) => "Move the history file aside or choose another one with --history-file.",
            Self::Internal(_) => "This is a bug; please report it with the message above.",
        }
    }

    fn color(&self) -> colored::Color {
        use colored::Color;
        match self {
            Self::Config(_) | Self::Validation(_) | Self::Parse(_) => Color::Red,
            Self::Network(_) => Color::Yellow,
            Self::Io(_) | Self::Storage(_) => Color::Cyan,
            Self::Internal(_) => Color::BrightRed,
        }
    }

    /// `[CATEGORY] message`, colored by category when `use_color` is set
    pub fn format_for_console(&self, use_color: bool) -> String {
        if !use_color {
            return format!("[{}] {}", self.category(), self);
        }

        use colored::Colorize;
        let color = self.color();
        format!(
            "[{}] {}",
            self.category().color(color).bold(),
            self.to_string().color(color)
        )
    }
}

/// Custom Result type for the application
pub type Result<T> = std::result::Result<T, AppError>;

/// Prints fatal errors to stderr
pub struct ErrorReporter {
    pub use_color: bool,
    pub verbose: bool,
}

impl ErrorReporter {
    pub fn new(use_color: bool, verbose: bool) -> Self {
        Self { use_color, verbose }
    }

    pub fn report_error(&self, error: &AppError) {
        eprintln!("{}", self.render(error));
    }

    /// The report as printed; verbose mode adds the hint and a retry note
    pub fn render(&self, error: &AppError) -> String {
        let mut out = error.format_for_console(self.use_color);
        if !self.verbose {
            return out;
        }

        out.push_str(&format!("\n\nHint: {}", error.hint()));
        if error.is_recoverable() {
            let note = "The failure may be temporary; running the command again can succeed.";
            out.push_str("\n");
            if self.use_color {
                use colored::Colorize;
                out.push_str(&note.green().to_string());
            } else {
                out.push_str(note);
            }
        }
        out
    }
}
