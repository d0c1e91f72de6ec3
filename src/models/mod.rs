//! Data models and structures for the network speed probe

pub mod config;
pub mod history;

// Re-export main model types
pub use config::Config;
pub use history::{HistoryEntry, RunReport};
