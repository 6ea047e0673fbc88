//! Local key-value persistence
//!
//! The tracker keeps four string slots, one JSON document each. On disk every
//! slot is a file named after its key inside the data directory.

use std::collections::HashMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::error::{CoreError, CoreResult};

/// Slot holding the movement list
pub const MOVEMENTS_KEY: &str = "finance_tracker_data_v1";
/// Slot holding initial balances by account id
pub const BALANCES_KEY: &str = "finance_tracker_balances_v1";
/// Slot holding the accounts map
pub const ACCOUNTS_KEY: &str = "finance_tracker_cards_v1";
/// Slot holding the theme name
pub const THEME_KEY: &str = "finance_tracker_theme_v1";

/// String key-value store
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> CoreResult<Option<String>>;
    fn set(&self, key: &str, value: &str) -> CoreResult<()>;
    fn remove(&self, key: &str) -> CoreResult<()>;
}

/// Store keeping one file per key under a directory
#[derive(Debug, Clone)]
pub struct FileKeyValueStore {
    dir: PathBuf,
}

impl FileKeyValueStore {
    /// Open (creating if needed) a store rooted at `dir`
    pub fn open(dir: impl Into<PathBuf>) -> CoreResult<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(|e| CoreError::StorageError {
            key: dir.display().to_string(),
            message: e.to_string(),
        })?;
        log::debug!("Opened key-value store at {}", dir.display());
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }
}

impl KeyValueStore for FileKeyValueStore {
    fn get(&self, key: &str) -> CoreResult<Option<String>> {
        match fs::read_to_string(self.path_for(key)) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(CoreError::StorageError {
                key: key.to_string(),
                message: e.to_string(),
            }),
        }
    }

    fn set(&self, key: &str, value: &str) -> CoreResult<()> {
        let path = self.path_for(key);
        let tmp = self.dir.join(format!(".{}.tmp", key));
        let storage_error = |e: std::io::Error| CoreError::StorageError {
            key: key.to_string(),
            message: e.to_string(),
        };

        // Write then rename: a slot is never observed half-written
        let mut file = fs::File::create(&tmp).map_err(storage_error)?;
        file.write_all(value.as_bytes()).map_err(storage_error)?;
        file.sync_all().map_err(storage_error)?;
        fs::rename(&tmp, &path).map_err(storage_error)?;
        Ok(())
    }

    fn remove(&self, key: &str) -> CoreResult<()> {
        match fs::remove_file(self.path_for(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(CoreError::StorageError {
                key: key.to_string(),
                message: e.to_string(),
            }),
        }
    }
}

/// In-memory store, used in tests and when no data directory is wanted
#[derive(Debug, Default)]
pub struct MemoryKeyValueStore {
    slots: Mutex<HashMap<String, String>>,
}

impl MemoryKeyValueStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> CoreResult<std::sync::MutexGuard<'_, HashMap<String, String>>> {
        self.slots.lock().map_err(|_| CoreError::InternalError {
            message: "memory store lock poisoned".to_string(),
        })
    }
}

impl KeyValueStore for MemoryKeyValueStore {
    fn get(&self, key: &str) -> CoreResult<Option<String>> {
        Ok(self.lock()?.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> CoreResult<()> {
        self.lock()?.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> CoreResult<()> {
        self.lock()?.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_store_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileKeyValueStore::open(dir.path().join("data")).unwrap();

        assert_eq!(store.get(THEME_KEY).unwrap(), None);
        store.set(THEME_KEY, "dark").unwrap();
        assert_eq!(store.get(THEME_KEY).unwrap(), Some("dark".to_string()));
        assert!(dir.path().join("data").join("finance_tracker_theme_v1.json").exists());

        store.set(THEME_KEY, "light").unwrap();
        assert_eq!(store.get(THEME_KEY).unwrap(), Some("light".to_string()));

        store.remove(THEME_KEY).unwrap();
        store.remove(THEME_KEY).unwrap();
        assert_eq!(store.get(THEME_KEY).unwrap(), None);
    }

    #[test]
    fn test_file_store_leaves_no_temp_files() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileKeyValueStore::open(dir.path()).unwrap();
        store.set(MOVEMENTS_KEY, "[]").unwrap();

        let names: Vec<String> = fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
            .collect();
        assert_eq!(names, vec!["finance_tracker_data_v1.json".to_string()]);
    }

    #[test]
    fn test_memory_store() {
        let store = MemoryKeyValueStore::new();
        store.set(BALANCES_KEY, "{}").unwrap();
        assert_eq!(store.get(BALANCES_KEY).unwrap().as_deref(), Some("{}"));
        store.remove(BALANCES_KEY).unwrap();
        assert!(store.get(BALANCES_KEY).unwrap().is_none());
    }
}
