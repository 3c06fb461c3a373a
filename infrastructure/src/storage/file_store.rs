//! JSON file key-value store.
//!
//! All keys live in one JSON object (`store.json` in the data directory).
//! The whole map is kept in memory and rewritten on every change through a
//! temporary file and a rename, so a crash never leaves a half-written file.

use balikci_application::{KeyValueStore, StoreError};
use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};
use tracing::{debug, warn};

/// File name of the store inside the data directory.
pub const STORE_FILE_NAME: &str = "store.json";

type Entries = BTreeMap<String, String>;

/// Key-value store persisted as a single JSON object file.
pub struct FileKeyValueStore {
    path: PathBuf,
    entries: Mutex<Entries>,
}

impl FileKeyValueStore {
    /// Open (or create) the store in `data_dir`.
    pub fn open(data_dir: impl AsRef<Path>) -> Result<Self, StoreError> {
        let data_dir = data_dir.as_ref();
        fs::create_dir_all(data_dir)?;
        Self::open_file(data_dir.join(STORE_FILE_NAME))
    }

    /// Open the store at an explicit file path.
    pub fn open_file(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let entries = Self::read_entries(&path)?;
        debug!(
            "Opened key-value store {} ({} keys)",
            path.display(),
            entries.len()
        );
        Ok(Self {
            path,
            entries: Mutex::new(entries),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_entries(path: &Path) -> Result<Entries, StoreError> {
        let raw = match fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Entries::new()),
            Err(e) => return Err(e.into()),
        };

        match serde_json::from_str(&raw) {
            Ok(entries) => Ok(entries),
            Err(e) => {
                warn!(
                    "Ignoring unreadable store file {}: {}",
                    path.display(),
                    e
                );
                Ok(Entries::new())
            }
        }
    }

    fn write_entries(&self, entries: &Entries) -> Result<(), StoreError> {
        let json = serde_json::to_string_pretty(entries)?;
        let tmp = self.path.with_extension("json.tmp");
        {
            let mut file = fs::File::create(&tmp)?;
            file.write_all(json.as_bytes())?;
            file.sync_all()?;
        }
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }

    fn lock(&self) -> MutexGuard<'_, Entries> {
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl KeyValueStore for FileKeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.lock().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut entries = self.lock();
        entries.insert(key.to_string(), value.to_string());
        self.write_entries(&entries)
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        let mut entries = self.lock();
        if entries.remove(key).is_some() {
            self.write_entries(&entries)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_values_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();

        let store = FileKeyValueStore::open(dir.path()).unwrap();
        store.set("chatMessages", "[]").unwrap();
        store.set("hasSeenWelcome", "true").unwrap();
        drop(store);

        let store = FileKeyValueStore::open(dir.path()).unwrap();
        assert_eq!(store.get("chatMessages").unwrap().as_deref(), Some("[]"));
        assert_eq!(store.get("hasSeenWelcome").unwrap().as_deref(), Some("true"));
        assert_eq!(store.get("missing").unwrap(), None);
    }

    #[test]
    fn test_remove_deletes_key_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileKeyValueStore::open(dir.path()).unwrap();
        store.set("a", "1").unwrap();
        store.remove("a").unwrap();
        store.remove("never-set").unwrap();

        let raw = fs::read_to_string(dir.path().join(STORE_FILE_NAME)).unwrap();
        let on_disk: Entries = serde_json::from_str(&raw).unwrap();
        assert!(on_disk.is_empty());
    }

    #[test]
    fn test_corrupt_file_is_treated_as_empty_and_replaced() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(STORE_FILE_NAME);
        fs::write(&path, "{ this is not json").unwrap();

        let store = FileKeyValueStore::open(dir.path()).unwrap();
        assert_eq!(store.get("chatMessages").unwrap(), None);

        store.set("k", "v").unwrap();
        let raw = fs::read_to_string(&path).unwrap();
        assert!(raw.contains("\"k\""));
        assert!(!dir.path().join("store.json.tmp").exists());
    }

    #[test]
    fn test_open_creates_missing_data_dir() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a").join("b");
        let store = FileKeyValueStore::open(&nested).unwrap();
        store.set("x", "y").unwrap();
        assert!(nested.join(STORE_FILE_NAME).exists());
    }
}
