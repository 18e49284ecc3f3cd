//! Key-value token store capability.
//!
//! # Design
//! - The client only ever reads the admin token and deletes it after a 401.
//!   Writing belongs to whoever issues the token, so `set` lives on the
//!   concrete stores rather than on the trait.
//! - `FileStore` mirrors browser local storage: one flat JSON object of
//!   string values, re-read on every access so other processes see updates.

use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::error::{StoreError, StoreResult};

/// Key under which the admin token is stored.
pub const ADMIN_TOKEN_KEY: &str = "admin_token";

/// Read/delete access to a string-keyed store.
pub trait TokenStore: Send + Sync {
    /// Look up the value stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] when the store cannot be read.
    fn get(&self, key: &str) -> StoreResult<Option<String>>;

    /// Remove the value stored under `key`. Removing a missing key succeeds.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] when the store cannot be written.
    fn delete(&self, key: &str) -> StoreResult<()>;
}

/// In-process store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<BTreeMap<String, String>>,
}

impl MemoryStore {
    /// Empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Unavailable`] if the store lock is poisoned.
    pub fn set(&self, key: &str, value: impl Into<String>) -> StoreResult<()> {
        self.lock()?.insert(key.to_string(), value.into());
        Ok(())
    }

    fn lock(&self) -> StoreResult<std::sync::MutexGuard<'_, BTreeMap<String, String>>> {
        self.entries.lock().map_err(|_| StoreError::Unavailable {
            reason: "memory store lock poisoned",
        })
    }
}

impl TokenStore for MemoryStore {
    fn get(&self, key: &str) -> StoreResult<Option<String>> {
        Ok(self.lock()?.get(key).cloned())
    }

    fn delete(&self, key: &str) -> StoreResult<()> {
        self.lock()?.remove(key);
        Ok(())
    }
}

/// Store persisted as a JSON object in a single file.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    /// Store backed by `path`. The file is created on first write.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// File backing the store.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Store `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] if the file cannot be read or written.
    pub fn set(&self, key: &str, value: impl Into<String>) -> StoreResult<()> {
        let mut entries = self.load()?;
        entries.insert(key.to_string(), value.into());
        self.save(&entries)
    }

    fn load(&self) -> StoreResult<BTreeMap<String, String>> {
        let raw = match fs::read(&self.path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(source) => {
                return Err(StoreError::Io {
                    operation: "read",
                    path: self.path.clone(),
                    source,
                });
            }
        };
        if raw.iter().all(u8::is_ascii_whitespace) {
            return Ok(BTreeMap::new());
        }
        serde_json::from_slice(&raw).map_err(|source| StoreError::Corrupt {
            path: self.path.clone(),
            source,
        })
    }

    fn save(&self, entries: &BTreeMap<String, String>) -> StoreResult<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|source| StoreError::Io {
                operation: "create_dir",
                path: parent.to_path_buf(),
                source,
            })?;
        }
        let payload = serde_json::to_vec_pretty(entries).map_err(|source| StoreError::Corrupt {
            path: self.path.clone(),
            source,
        })?;
        fs::write(&self.path, payload).map_err(|source| StoreError::Io {
            operation: "write",
            path: self.path.clone(),
            source,
        })
    }
}

impl TokenStore for FileStore {
    fn get(&self, key: &str) -> StoreResult<Option<String>> {
        Ok(self.load()?.remove(key))
    }

    fn delete(&self, key: &str) -> StoreResult<()> {
        let mut entries = self.load()?;
        if entries.remove(key).is_some() {
            self.save(&entries)?;
        }
        Ok(())
    }
}
