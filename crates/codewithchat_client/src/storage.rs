//! # Local storage
//!
//! The client keeps two string entries between runs, mirroring the browser's
//! `localStorage`:
//!
//! | Key | Value |
//! |-----|-------|
//! | [`TOKEN_KEY`] | the opaque bearer token |
//! | [`USER_KEY`] | the JSON-serialized [`User`](crate::models::User) |
//!
//! [`FileStorage`] persists them as a flat JSON object on disk; [`MemoryStorage`]
//! keeps them in process for tests.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::error::ClientError;

pub const TOKEN_KEY: &str = "token";
pub const USER_KEY: &str = "user";

/// A string key-value store that survives between sessions.
pub trait LocalStorage: Send + Sync {
    fn get_item(&self, key: &str) -> Result<Option<String>, ClientError>;
    fn set_item(&self, key: &str, value: &str) -> Result<(), ClientError>;
    fn remove_item(&self, key: &str) -> Result<(), ClientError>;
}

/// In-memory storage for tests.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    items: Mutex<BTreeMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    // A panic mid-update cannot leave the map half-written, so a poisoned
    // lock is still safe to use.
    fn items(&self) -> MutexGuard<'_, BTreeMap<String, String>> {
        self.items.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl LocalStorage for MemoryStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, ClientError> {
        Ok(self.items().get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), ClientError> {
        self.items().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<(), ClientError> {
        self.items().remove(key);
        Ok(())
    }
}

/// Storage persisted as a JSON object in a single file.
#[derive(Debug)]
pub struct FileStorage {
    path: PathBuf,
    // Serializes read-modify-write cycles within this process.
    lock: Mutex<()>,
}

impl FileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    /// `<data_dir>/codewithchat/storage.json`, or a dot directory in the
    /// working directory when the platform has no data directory.
    pub fn default_path() -> PathBuf {
        dirs::data_dir()
            .map(|dir| dir.join("codewithchat"))
            .unwrap_or_else(|| PathBuf::from(".codewithchat"))
            .join("storage.json")
    }

    fn load(&self) -> Result<BTreeMap<String, String>, ClientError> {
        match std::fs::read_to_string(&self.path) {
            Ok(contents) if contents.trim().is_empty() => Ok(BTreeMap::new()),
            Ok(contents) => Ok(serde_json::from_str(&contents)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(e) => Err(e.into()),
        }
    }

    fn save(&self, items: &BTreeMap<String, String>) -> Result<(), ClientError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.path, serde_json::to_string_pretty(items)?)?;
        Ok(())
    }
}

impl LocalStorage for FileStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, ClientError> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(self.load()?.remove(key))
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), ClientError> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        let mut items = self.load()?;
        items.insert(key.to_string(), value.to_string());
        self.save(&items)
    }

    fn remove_item(&self, key: &str) -> Result<(), ClientError> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        let mut items = self.load()?;
        if items.remove(key).is_some() {
            self.save(&items)?;
        }
        Ok(())
    }
}
