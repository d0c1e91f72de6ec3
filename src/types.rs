//! Type definitions and aliases

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

// Re-export commonly used types
pub use crate::error::{AppError, Result};

/// The three independent measurements of a test run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProbeKind {
    Latency,
    Download,
    Upload,
}

impl ProbeKind {
    pub const ALL: [ProbeKind; 3] = [ProbeKind::Latency, ProbeKind::Download, ProbeKind::Upload];

    /// Human-readable name used in output and logs
    pub fn name(&self) -> &'static str {
        match self {
            ProbeKind::Latency => "Latency",
            ProbeKind::Download => "Download",
            ProbeKind::Upload => "Upload",
        }
    }

    /// Unit the measured value is expressed in
    pub fn unit(&self) -> &'static str {
        match self {
            ProbeKind::Latency => "ms",
            ProbeKind::Download | ProbeKind::Upload => "Mbps",
        }
    }
}

impl fmt::Display for ProbeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Sentinel recorded in place of a metric whose probe could not complete.
///
/// Serialized as the string `"Error"`, the marker the history format has
/// always used.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FailureMarker;

impl FailureMarker {
    pub const TEXT: &'static str = "Error";
}

impl fmt::Display for FailureMarker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(Self::TEXT)
    }
}

impl Serialize for FailureMarker {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(Self::TEXT)
    }
}

impl<'de> Deserialize<'de> for FailureMarker {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        if text == Self::TEXT {
            Ok(FailureMarker)
        } else {
            Err(serde::de::Error::custom(format!(
                "expected failure marker \"{}\", got \"{}\"",
                Self::TEXT,
                text
            )))
        }
    }
}

/// Outcome of one probe: a measurement or the failure marker
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ProbeOutcome<T> {
    Measured(T),
    Failed(FailureMarker),
}

impl<T> ProbeOutcome<T> {
    /// The failure marker outcome
    pub fn failed() -> Self {
        Self::Failed(FailureMarker)
    }

    pub fn is_measured(&self) -> bool {
        matches!(self, Self::Measured(_))
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed(_))
    }

    /// The measured value, if any
    pub fn value(&self) -> Option<&T> {
        match self {
            Self::Measured(value) => Some(value),
            Self::Failed(_) => None,
        }
    }

    /// Render the value with `render`, or the marker text on failure
    pub fn render_with<F>(&self, render: F) -> String
    where
        F: FnOnce(&T) -> String,
    {
        match self {
            Self::Measured(value) => render(value),
            Self::Failed(marker) => marker.to_string(),
        }
    }
}

impl<T, E> From<std::result::Result<T, E>> for ProbeOutcome<T> {
    fn from(result: std::result::Result<T, E>) -> Self {
        match result {
            Ok(value) => Self::Measured(value),
            Err(_) => Self::failed(),
        }
    }
}

/// Latency outcome in whole milliseconds
pub type LatencyOutcome = ProbeOutcome<u64>;

/// Throughput outcome in megabits per second, two decimal places
pub type SpeedOutcome = ProbeOutcome<f64>;

/// How the download probe decides how many bytes were transferred
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "mode")]
pub enum DownloadSizing {
    /// Use a fixed size regardless of what the candidate actually returned.
    /// Only accurate when the resolved candidate really is that size.
    Assumed { megabytes: f64 },
    /// Count the bytes of the received response body
    Measured,
}

impl Default for DownloadSizing {
    fn default() -> Self {
        Self::Assumed {
            megabytes: crate::defaults::DEFAULT_ASSUMED_DOWNLOAD_MB,
        }
    }
}

impl DownloadSizing {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Assumed { .. } => "assumed",
            Self::Measured => "measured",
        }
    }
}

/// Output format for run results and history
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}
