//! Persistent, append-only log of completed runs
//!
//! The log is a JSON array of [`HistoryEntry`] records. Appending is a full
//! read-modify-write of the array; there is exactly one writer per run.

use crate::models::HistoryEntry;
use crate::{AppError, Result};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Storage backend for the history log
pub trait HistoryStore: Send + Sync {
    /// Load every entry, oldest first. Missing or empty state is an empty log.
    fn load_history(&self) -> Result<Vec<HistoryEntry>>;

    /// Replace the stored log with `entries`
    fn save_history(&self, entries: &[HistoryEntry]) -> Result<()>;

    /// Read the log, append `entry` and write it back
    fn append_entry(&self, entry: HistoryEntry) -> Result<Vec<HistoryEntry>> {
        let mut entries = self.load_history()?;
        entries.push(entry);
        self.save_history(&entries)?;
        Ok(entries)
    }
}

/// History stored as a pretty-printed JSON array in one file
#[derive(Debug, Clone)]
pub struct JsonFileHistoryStore {
    path: PathBuf,
}

impl JsonFileHistoryStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn ensure_parent_directory(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent).map_err(|e| {
                    AppError::storage(format!(
                        "Failed to create history directory '{}': {}",
                        parent.display(),
                        e
                    ))
                })?;
            }
        }
        Ok(())
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl HistoryStore for JsonFileHistoryStore {
    fn load_history(&self) -> Result<Vec<HistoryEntry>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let content = fs::read_to_string(&self.path).map_err(|e| {
            AppError::storage(format!(
                "Failed to read history file '{}': {}",
                self.path.display(),
                e
            ))
        })?;

        if content.trim().is_empty() {
            return Ok(Vec::new());
        }

        serde_json::from_str(&content).map_err(|e| {
            AppError::storage(format!(
                "History file '{}' is corrupt: {}",
                self.path.display(),
                e
            ))
        })
    }

    fn save_history(&self, entries: &[HistoryEntry]) -> Result<()> {
        self.ensure_parent_directory()?;

        let content = serde_json::to_string_pretty(entries)
            .map_err(|e| AppError::storage(format!("Failed to serialize history: {}", e)))?;

        // Replace the file in one rename so readers never see a partial array.
        let temp_path = self.temp_path();
        fs::write(&temp_path, content).map_err(|e| {
            AppError::storage(format!(
                "Failed to write history file '{}': {}",
                temp_path.display(),
                e
            ))
        })?;
        fs::rename(&temp_path, &self.path).map_err(|e| {
            AppError::storage(format!(
                "Failed to replace history file '{}': {}",
                self.path.display(),
                e
            ))
        })
    }
}

/// In-memory history, for tests and embedding
#[derive(Debug, Default)]
pub struct MemoryHistoryStore {
    entries: Mutex<Vec<HistoryEntry>>,
}

impl MemoryHistoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entries(entries: Vec<HistoryEntry>) -> Self {
        Self {
            entries: Mutex::new(entries),
        }
    }
}

impl HistoryStore for MemoryHistoryStore {
    fn load_history(&self) -> Result<Vec<HistoryEntry>> {
        self.entries
            .lock()
            .map(|entries| entries.clone())
            .map_err(|_| AppError::storage("History lock poisoned"))
    }

    fn save_history(&self, entries: &[HistoryEntry]) -> Result<()> {
        let mut stored = self
            .entries
            .lock()
            .map_err(|_| AppError::storage("History lock poisoned"))?;
        *stored = entries.to_vec();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RunReport;
    use crate::types::ProbeOutcome;
    use chrono::{TimeZone, Utc};
    use tempfile::TempDir;

    fn entry(latency: u64) -> HistoryEntry {
        HistoryEntry::from_report(
            RunReport::new(
                ProbeOutcome::Measured(latency),
                ProbeOutcome::Measured(1.5),
                ProbeOutcome::failed(),
            ),
            Utc.with_ymd_and_hms(2024, 5, 4, 10, 0, latency as u32 % 60).unwrap(),
        )
    }

    #[test]
    fn test_missing_file_is_empty_history() {
        let dir = TempDir::new().unwrap();
        let store = JsonFileHistoryStore::new(dir.path().join("history.json"));
        assert!(store.load_history().unwrap().is_empty());
    }

    #[test]
    fn test_empty_file_is_empty_history() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("history.json");
        fs::write(&path, "  \n").unwrap();
        assert!(JsonFileHistoryStore::new(path).load_history().unwrap().is_empty());
    }

    #[test]
    fn test_append_preserves_order() {
        let dir = TempDir::new().unwrap();
        let store = JsonFileHistoryStore::new(dir.path().join("nested").join("history.json"));

        store.append_entry(entry(10)).unwrap();
        store.append_entry(entry(20)).unwrap();
        let entries = store.append_entry(entry(30)).unwrap();

        assert_eq!(entries.len(), 3);
        assert_eq!(store.load_history().unwrap(), vec![entry(10), entry(20), entry(30)]);
        assert!(!store.temp_path().exists());
    }

    #[test]
    fn test_file_format_uses_stored_field_names() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("history.json");
        let store = JsonFileHistoryStore::new(&path);
        store.save_history(&[entry(25)]).unwrap();

        let raw: serde_json::Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        let first = &raw.as_array().unwrap()[0];
        assert_eq!(first["latency"], 25);
        assert_eq!(first["downloadSpeed"], 1.5);
        assert_eq!(first["uploadSpeed"], "Error");
        assert!(first["date"].is_string());
    }

    #[test]
    fn test_corrupt_file_is_storage_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("history.json");
        fs::write(&path, "{not json").unwrap();

        let err = JsonFileHistoryStore::new(path).load_history().unwrap_err();
        assert!(matches!(err, AppError::Storage(_)));
        assert_eq!(err.exit_code(), 5);
    }

    #[test]
    fn test_repeated_loads_are_identical() {
        let store = MemoryHistoryStore::with_entries(vec![entry(1), entry(2)]);
        assert_eq!(store.load_history().unwrap(), store.load_history().unwrap());
    }

    #[test]
    fn test_memory_store_append() {
        let store = MemoryHistoryStore::new();
        store.append_entry(entry(7)).unwrap();
        assert_eq!(store.load_history().unwrap(), vec![entry(7)]);
    }
}
