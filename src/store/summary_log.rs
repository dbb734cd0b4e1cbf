//! Append-only history of daily summaries.
//!
//! Stored as one JSON array that is rewritten in full on every append. There
//! is no rotation; the file grows by one entry per day.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use super::lock::{self, FileLock};
use crate::error::InventoryError;
use crate::models::{LogRecord, SummaryEntry};

#[derive(Debug, Clone)]
pub struct SummaryLog {
    path: PathBuf,
    lock_path: PathBuf,
}

impl SummaryLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let lock_path = lock::sidecar(&path, "lock");
        Self { path, lock_path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Appends `entry` and rewrites the log. Returns the new entry count.
    ///
    /// A missing log starts empty. A log that exists but cannot be parsed is
    /// moved aside to `<file>.corrupt-<unix time>` first.
    pub fn append(&self, entry: &SummaryEntry) -> Result<usize, InventoryError> {
        let _lock = FileLock::exclusive(&self.lock_path)
            .map_err(|e| InventoryError::StoreIo(self.lock_path.clone(), e))?;

        let mut records = match self.load() {
            Ok(records) => records,
            Err(InventoryError::MalformedDocument(_, reason)) => {
                let moved_to = lock::quarantine(&self.path)
                    .map_err(|e| InventoryError::StoreIo(self.path.clone(), e))?;
                tracing::warn!(
                    "Summary log {} was unreadable ({}); moved to {} and starting a new log",
                    self.path.display(),
                    reason,
                    moved_to.display()
                );
                Vec::new()
            }
            Err(e) => return Err(e),
        };

        records.push(LogRecord::Entry(entry.clone()));

        let bytes = serde_json::to_vec_pretty(&records)
            .map_err(|e| InventoryError::MalformedDocument(self.path.clone(), e.to_string()))?;
        lock::write_atomic(&self.path, &bytes)
            .map_err(|e| InventoryError::StoreIo(self.path.clone(), e))?;

        Ok(records.len())
    }

    /// All records, oldest first. A missing log is empty.
    pub fn records(&self) -> Result<Vec<LogRecord>, InventoryError> {
        let _lock = FileLock::shared(&self.lock_path)
            .map_err(|e| InventoryError::StoreIo(self.lock_path.clone(), e))?;
        self.load()
    }

    fn load(&self) -> Result<Vec<LogRecord>, InventoryError> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(InventoryError::StoreIo(self.path.clone(), e)),
        };

        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Vec::new());
        }

        serde_json::from_slice(&bytes)
            .map_err(|e| InventoryError::MalformedDocument(self.path.clone(), e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SummaryItem;
    use chrono::DateTime;
    use serde_json::{json, Value};
    use tempfile::TempDir;

    fn setup() -> (SummaryLog, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let log = SummaryLog::new(temp_dir.path().join("summary.json"));
        (log, temp_dir)
    }

    fn entry(day: u32) -> SummaryEntry {
        SummaryEntry {
            date: DateTime::parse_from_rfc3339(&format!("2026-10-{:02}T00:00:00+07:00", day))
                .unwrap(),
            items: vec![SummaryItem {
                name: "Onion".into(),
                unit: Some("kg".into()),
                remaining: 5.0,
                used: 2.0,
                to_buy: 0.0,
            }],
        }
    }

    #[test]
    fn test_append_to_missing_log() {
        let (log, _temp) = setup();
        assert_eq!(log.append(&entry(17)).unwrap(), 1);

        let records = log.records().unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].as_entry(), Some(&entry(17)));
    }

    #[test]
    fn test_append_keeps_order() {
        let (log, _temp) = setup();
        log.append(&entry(16)).unwrap();
        log.append(&entry(17)).unwrap();
        assert_eq!(log.append(&entry(18)).unwrap(), 3);

        let dates: Vec<String> = log.records().unwrap().iter().map(|r| r.date_label()).collect();
        assert_eq!(
            dates,
            vec![
                "2026-10-16T00:00:00+07:00",
                "2026-10-17T00:00:00+07:00",
                "2026-10-18T00:00:00+07:00"
            ]
        );
    }

    #[test]
    fn test_legacy_entries_survive_append() {
        let (log, _temp) = setup();
        let legacy = json!([{ "date": "17/10/2569 00:00:00", "items": [] }]);
        fs::write(log.path(), serde_json::to_vec(&legacy).unwrap()).unwrap();

        log.append(&entry(18)).unwrap();

        let on_disk: Value = serde_json::from_slice(&fs::read(log.path()).unwrap()).unwrap();
        assert_eq!(on_disk[0], legacy[0]);
        assert_eq!(on_disk[1]["date"], json!("2026-10-18T00:00:00+07:00"));
    }

    #[test]
    fn test_corrupt_log_is_moved_aside() {
        let (log, temp) = setup();
        fs::write(log.path(), "[{ truncated").unwrap();

        assert_eq!(log.append(&entry(18)).unwrap(), 1);

        let moved: Vec<_> = fs::read_dir(temp.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_string_lossy().contains(".corrupt-"))
            .collect();
        assert_eq!(moved.len(), 1);
        assert_eq!(fs::read_to_string(moved[0].path()).unwrap(), "[{ truncated");
    }

    #[test]
    fn test_empty_file_reads_as_empty_log() {
        let (log, _temp) = setup();
        fs::write(log.path(), "").unwrap();
        assert!(log.records().unwrap().is_empty());
    }
}
