//! Network Speed Probe
//!
//! Measures latency, download throughput and upload throughput against
//! ordered lists of public endpoints. Each probe walks its candidate list in
//! order, retrying every candidate with exponential backoff, and the results
//! of every completed run are appended to a persistent history.

pub mod app;
pub mod cli;
pub mod client;
pub mod clock;
pub mod config;
pub mod error;
pub mod executor;
pub mod fetch;
pub mod history;
pub mod logging;
pub mod models;
pub mod output;
pub mod probe;
pub mod types;

// Re-export commonly used types
pub use error::{AppError, FetchError, Result, TransportError};
pub use executor::{MeasurementEngine, RunSummary, SpeedTestSession};
pub use history::{HistoryStore, JsonFileHistoryStore, MemoryHistoryStore};
pub use models::{Config, HistoryEntry, RunReport};
pub use types::{FailureMarker, ProbeKind, ProbeOutcome};

/// Application version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const PKG_NAME: &str = env!("CARGO_PKG_NAME");
pub const PKG_DESCRIPTION: &str = env!("CARGO_PKG_DESCRIPTION");

/// Default configuration values
pub mod defaults {
    use std::time::Duration;

    pub const DEFAULT_LATENCY_URLS: &[&str] = &[
        "https://www.google.com",
        "https://www.cloudflare.com",
        "https://www.amazon.com",
    ];
    // The three resources have different real sizes; see `DownloadSizing`.
    pub const DEFAULT_DOWNLOAD_URLS: &[&str] = &[
        "https://file-examples-com.github.io/uploads/2017/10/file_example_JPG_100kB.jpg",
        "https://github.com/mozilla/pdf.js/blob/master/web/compressed.tracemonkey-pldi-09.pdf?raw=true",
        "https://download.samplelib.com/mp4/sample-1s.mp4",
    ];
    pub const DEFAULT_UPLOAD_URLS: &[&str] = &[
        "https://httpbin.org/post",
        "https://ptsv2.com/t/n3z2v-1639299935/post",
        "https://postman-echo.com/post",
    ];

    pub const DEFAULT_RETRY_ATTEMPTS: u32 = 3;
    pub const DEFAULT_INITIAL_BACKOFF: Duration = Duration::from_millis(500);
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

    /// Size assumed for whatever the download candidate returns (100 kB).
    pub const DEFAULT_ASSUMED_DOWNLOAD_MB: f64 = 0.1;
    /// Upload payload: one megabyte of zero bytes.
    pub const DEFAULT_UPLOAD_PAYLOAD_BYTES: usize = 1024 * 1024;
    /// Bytes per megabyte used by every throughput conversion.
    pub const BYTES_PER_MEGABYTE: f64 = 1024.0 * 1024.0;

    pub const DEFAULT_ENABLE_COLOR: bool = true;
    pub const HISTORY_FILE_NAME: &str = "history.json";
}
