//! Score storage
//!
//! A tiny integer key-value interface. Backends:
//! - `MemoryStore`: tests and throwaway sessions
//! - `FileStore`: JSON map on disk (native)
//! - `LocalStorageStore`: browser LocalStorage (wasm32)

use std::collections::BTreeMap;

use crate::error::PersistenceError;

/// Integer key-value store for persisted scores
pub trait ScoreRepository {
    fn get_int(&self, key: &str) -> Option<i64>;
    fn set_int(&mut self, key: &str, value: i64) -> Result<(), PersistenceError>;
}

/// In-memory store
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    values: BTreeMap<String, i64>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ScoreRepository for MemoryStore {
    fn get_int(&self, key: &str) -> Option<i64> {
        self.values.get(key).copied()
    }

    fn set_int(&mut self, key: &str, value: i64) -> Result<(), PersistenceError> {
        self.values.insert(key.to_string(), value);
        Ok(())
    }
}

/// JSON file store; the whole map is rewritten on every set
#[cfg(not(target_arch = "wasm32"))]
#[derive(Debug, Clone)]
pub struct FileStore {
    path: std::path::PathBuf,
    values: BTreeMap<String, i64>,
}

#[cfg(not(target_arch = "wasm32"))]
impl FileStore {
    /// Open `path`, starting empty if the file does not exist yet
    pub fn open(path: impl Into<std::path::PathBuf>) -> Result<Self, PersistenceError> {
        let path = path.into();
        let values = match std::fs::read_to_string(&path) {
            Ok(json) => serde_json::from_str(&json)?,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                log::info!("No score file at {}, starting fresh", path.display());
                BTreeMap::new()
            }
            Err(err) => return Err(err.into()),
        };
        Ok(Self { path, values })
    }

    fn flush(&self) -> Result<(), PersistenceError> {
        let json = serde_json::to_string_pretty(&self.values)?;
        // Write to a sibling then rename so a crash never leaves half a file
        let tmp = self.path.with_extension("tmp");
        std::fs::write(&tmp, json)?;
        std::fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

#[cfg(not(target_arch = "wasm32"))]
impl ScoreRepository for FileStore {
    fn get_int(&self, key: &str) -> Option<i64> {
        self.values.get(key).copied()
    }

    fn set_int(&mut self, key: &str, value: i64) -> Result<(), PersistenceError> {
        self.values.insert(key.to_string(), value);
        self.flush()
    }
}

/// Browser LocalStorage store; values are stored as decimal strings
#[cfg(target_arch = "wasm32")]
pub struct LocalStorageStore {
    storage: web_sys::Storage,
}

#[cfg(target_arch = "wasm32")]
impl LocalStorageStore {
    pub fn open() -> Result<Self, PersistenceError> {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten()
            .ok_or(PersistenceError::Unavailable("LocalStorage"))?;
        Ok(Self { storage })
    }
}

#[cfg(target_arch = "wasm32")]
impl ScoreRepository for LocalStorageStore {
    fn get_int(&self, key: &str) -> Option<i64> {
        self.storage
            .get_item(key)
            .ok()
            .flatten()
            .and_then(|s| s.parse().ok())
    }

    fn set_int(&mut self, key: &str, value: i64) -> Result<(), PersistenceError> {
        self.storage
            .set_item(key, &value.to_string())
            .map_err(|_| PersistenceError::Unavailable("LocalStorage write"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store() {
        let mut store = MemoryStore::new();
        assert_eq!(store.get_int("player1_score"), None);
        store.set_int("player1_score", 300).unwrap();
        assert_eq!(store.get_int("player1_score"), Some(300));
    }

    #[cfg(not(target_arch = "wasm32"))]
    #[test]
    fn test_file_store_survives_reopen() {
        let path = std::env::temp_dir().join(format!(
            "ski_slalom_scores_{}.json",
            std::process::id()
        ));
        let _ = std::fs::remove_file(&path);

        let mut store = FileStore::open(&path).unwrap();
        assert_eq!(store.get_int("player1_score"), None);
        store.set_int("player1_score", 500).unwrap();

        let reopened = FileStore::open(&path).unwrap();
        assert_eq!(reopened.get_int("player1_score"), Some(500));

        let _ = std::fs::remove_file(&path);
    }

    #[cfg(not(target_arch = "wasm32"))]
    #[test]
    fn test_file_store_rejects_garbage() {
        let path = std::env::temp_dir().join(format!(
            "ski_slalom_garbage_{}.json",
            std::process::id()
        ));
        std::fs::write(&path, "not json").unwrap();
        assert!(matches!(
            FileStore::open(&path),
            Err(PersistenceError::Json(_))
        ));
        let _ = std::fs::remove_file(&path);
    }
}
