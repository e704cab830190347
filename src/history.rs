// Persisted list of saved calculations.
//
// The on-disk layout mimics browser local storage: one JSON object mapping
// string keys to string blobs. History is the blob under `HISTORY_KEY`,
// itself a JSON array of `CalculationEntry`.
use crate::error::HistoryError;
use crate::types::CalculationEntry;
use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

pub const HISTORY_KEY: &str = "carbonHistory";

/// Append-only store of calculation entries, kept in insertion order.
pub trait HistoryStore {
    fn append(&mut self, entry: CalculationEntry) -> Result<(), HistoryError>;
    /// Never fails: unreadable storage reads as an empty history.
    fn load_all(&self) -> Vec<CalculationEntry>;
    fn clear_all(&mut self) -> Result<(), HistoryError>;
}

#[derive(Debug, Default)]
pub struct MemoryHistory {
    entries: Vec<CalculationEntry>,
}

impl HistoryStore for MemoryHistory {
    fn append(&mut self, entry: CalculationEntry) -> Result<(), HistoryError> {
        self.entries.push(entry);
        Ok(())
    }

    fn load_all(&self) -> Vec<CalculationEntry> {
        self.entries.clone()
    }

    fn clear_all(&mut self) -> Result<(), HistoryError> {
        self.entries.clear();
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct JsonFileHistory {
    path: PathBuf,
}

impl JsonFileHistory {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_storage(&self) -> BTreeMap<String, String> {
        let text = match std::fs::read_to_string(&self.path) {
            Ok(t) => t,
            Err(e) if e.kind() == ErrorKind::NotFound => return BTreeMap::new(),
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "storage unreadable; treating as empty");
                return BTreeMap::new();
            }
        };
        if text.trim().is_empty() {
            return BTreeMap::new();
        }
        serde_json::from_str(&text).unwrap_or_else(|e| {
            warn!(path = %self.path.display(), error = %e, "storage corrupt; treating as empty");
            BTreeMap::new()
        })
    }

    /// Replace the whole storage file: write a sibling temp file, then
    /// rename it over the original.
    fn write_storage(&self, storage: &BTreeMap<String, String>) -> Result<(), HistoryError> {
        let io_err = |source| HistoryError::Io {
            path: self.path.clone(),
            source,
        };
        let s = serde_json::to_string_pretty(storage)?;
        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);
        std::fs::write(&tmp, s).map_err(io_err)?;
        std::fs::rename(&tmp, &self.path).map_err(io_err)?;
        Ok(())
    }

    fn write_entries(&self, entries: &[CalculationEntry]) -> Result<(), HistoryError> {
        let mut storage = self.read_storage();
        storage.insert(HISTORY_KEY.to_string(), serde_json::to_string(entries)?);
        self.write_storage(&storage)
    }
}

impl HistoryStore for JsonFileHistory {
    fn append(&mut self, entry: CalculationEntry) -> Result<(), HistoryError> {
        let mut entries = self.load_all();
        entries.push(entry);
        self.write_entries(&entries)?;
        debug!(count = entries.len(), "history entry appended");
        Ok(())
    }

    fn load_all(&self) -> Vec<CalculationEntry> {
        let storage = self.read_storage();
        let Some(blob) = storage.get(HISTORY_KEY) else {
            return Vec::new();
        };
        serde_json::from_str(blob).unwrap_or_else(|e| {
            warn!(key = HISTORY_KEY, error = %e, "history blob corrupt; treating as empty");
            Vec::new()
        })
    }

    fn clear_all(&mut self) -> Result<(), HistoryError> {
        let mut storage = self.read_storage();
        if storage.remove(HISTORY_KEY).is_none() && !self.path.exists() {
            return Ok(());
        }
        self.write_storage(&storage)?;
        debug!("history cleared");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Breakdown;
    use tempfile::tempdir;

    fn entry(date: i64, total: f64) -> CalculationEntry {
        CalculationEntry {
            date,
            total,
            details: Breakdown {
                transport: total,
                electricity: 0.0,
                meat: 0.0,
            },
        }
    }

    #[test]
    fn file_store_keeps_insertion_order_across_instances() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("storage.json");
        let mut store = JsonFileHistory::new(&path);
        store.append(entry(3, 1.0)).unwrap();
        store.append(entry(1, 2.0)).unwrap();

        let reopened = JsonFileHistory::new(&path);
        let dates: Vec<i64> = reopened.load_all().iter().map(|e| e.date).collect();
        assert_eq!(dates, vec![3, 1]);
    }

    #[test]
    fn persisted_schema_matches_local_storage_blob() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("storage.json");
        let mut store = JsonFileHistory::new(&path);
        store.append(entry(1_700_000_000_000, 5.0)).unwrap();

        let raw: BTreeMap<String, String> =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        let blob: serde_json::Value = serde_json::from_str(&raw[HISTORY_KEY]).unwrap();
        assert_eq!(blob[0]["date"], 1_700_000_000_000i64);
        assert_eq!(blob[0]["total"], 5.0);
        assert_eq!(blob[0]["details"]["transport"], 5.0);
        assert_eq!(blob[0]["details"]["meat"], 0.0);
    }

    #[test]
    fn corrupt_storage_reads_as_empty_and_can_be_overwritten() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("storage.json");
        std::fs::write(&path, "{not json").unwrap();
        let mut store = JsonFileHistory::new(&path);
        assert!(store.load_all().is_empty());
        store.append(entry(1, 1.0)).unwrap();
        assert_eq!(store.load_all().len(), 1);
    }

    #[test]
    fn corrupt_blob_reads_as_empty() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("storage.json");
        std::fs::write(&path, r#"{"carbonHistory": "[{\"date\": \"oops\"}]"}"#).unwrap();
        assert!(JsonFileHistory::new(&path).load_all().is_empty());
    }

    #[test]
    fn clear_keeps_unrelated_keys() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("storage.json");
        std::fs::write(&path, r#"{"theme": "dark"}"#).unwrap();
        let mut store = JsonFileHistory::new(&path);
        store.append(entry(1, 1.0)).unwrap();
        store.clear_all().unwrap();
        assert!(store.load_all().is_empty());
        let raw: BTreeMap<String, String> =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(raw.get("theme").map(String::as_str), Some("dark"));
    }

    #[test]
    fn clearing_missing_file_is_a_no_op() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("never.json");
        let mut store = JsonFileHistory::new(&path);
        store.clear_all().unwrap();
        assert!(!path.exists());
    }

    #[test]
    fn memory_store_round_trip() {
        let mut store = MemoryHistory::default();
        store.append(entry(1, 1.0)).unwrap();
        assert_eq!(store.load_all().len(), 1);
        store.clear_all().unwrap();
        assert!(store.load_all().is_empty());
    }
}
