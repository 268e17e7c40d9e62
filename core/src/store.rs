//! Durable key-value storage for the token and the current user.
//!
//! Values are stored as JSON text, the way the browser client wrote them to
//! local storage.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::error::ApiError;

/// Named string values that survive restarts.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, ApiError>;
    fn set(&self, key: &str, value: &str) -> Result<(), ApiError>;
    /// Removing a missing key is not an error.
    fn remove(&self, key: &str) -> Result<(), ApiError>;
}

/// Process-local store. Nothing is persisted.
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: Mutex<BTreeMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, ApiError> {
        Ok(lock(&self.values)?.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), ApiError> {
        lock(&self.values)?.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), ApiError> {
        lock(&self.values)?.remove(key);
        Ok(())
    }
}

/// A JSON object on disk, rewritten on every change.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    values: Mutex<BTreeMap<String, String>>,
}

impl FileStore {
    /// Open `path`, loading existing values. A missing file is an empty store.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, ApiError> {
        let path = path.into();
        let values = match fs::read_to_string(&path) {
            Ok(raw) => serde_json::from_str(&raw)
                .map_err(|e| ApiError::Storage(format!("{}: {e}", path.display())))?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => return Err(e.into()),
        };
        Ok(Self {
            path,
            values: Mutex::new(values),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn flush(&self, values: &BTreeMap<String, String>) -> Result<(), ApiError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let raw = serde_json::to_string_pretty(values)
            .map_err(|e| ApiError::Storage(e.to_string()))?;
        fs::write(&self.path, raw)?;
        Ok(())
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, ApiError> {
        Ok(lock(&self.values)?.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), ApiError> {
        let mut values = lock(&self.values)?;
        values.insert(key.to_string(), value.to_string());
        self.flush(&values)
    }

    fn remove(&self, key: &str) -> Result<(), ApiError> {
        let mut values = lock(&self.values)?;
        if values.remove(key).is_some() {
            self.flush(&values)?;
        }
        Ok(())
    }
}

fn lock<T>(mutex: &Mutex<T>) -> Result<std::sync::MutexGuard<'_, T>, ApiError> {
    mutex
        .lock()
        .map_err(|_| ApiError::Storage("store lock poisoned".to_string()))
}
