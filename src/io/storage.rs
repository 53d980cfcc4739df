use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use tempfile::NamedTempFile;
use tracing::{debug, warn};

use crate::io::lock::{LockError, StoreLock};

/// Error type for storage operations
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("storage quota exceeded writing {key}: {needed} bytes needed, {quota} allowed")]
    QuotaExceeded {
        key: String,
        needed: usize,
        quota: usize,
    },
    #[error("could not read {path}: {source}")]
    ReadError { path: PathBuf, source: io::Error },
    #[error("could not write {path}: {source}")]
    WriteError { path: PathBuf, source: io::Error },
    #[error("{path} is corrupt and could not be backed up to {backup}: {source}")]
    CorruptUnbacked {
        path: PathBuf,
        backup: PathBuf,
        source: io::Error,
    },
    #[error("could not serialize store: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error(transparent)]
    Lock(#[from] LockError),
}

/// A string key-value store, the shape of browser local storage.
///
/// Values are raw strings; JSON encoding happens one layer up in
/// [`crate::io::persist::PersistentStore`].
pub trait Storage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set_item(&mut self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove_item(&mut self, key: &str) -> Result<(), StorageError>;
    fn keys(&self) -> Vec<String>;
}

/// Bytes counted against a quota: every key plus every value
fn usage(items: &IndexMap<String, String>) -> usize {
    items.iter().map(|(k, v)| k.len() + v.len()).sum()
}

/// Usage after replacing `key`'s value with `value`
fn usage_after_set(items: &IndexMap<String, String>, key: &str, value: &str) -> usize {
    let current = usage(items);
    let old = items.get(key).map(|v| key.len() + v.len()).unwrap_or(0);
    current - old + key.len() + value.len()
}

fn check_quota(
    items: &IndexMap<String, String>,
    quota: Option<usize>,
    key: &str,
    value: &str,
) -> Result<(), StorageError> {
    if let Some(quota) = quota {
        let needed = usage_after_set(items, key, value);
        if needed > quota {
            return Err(StorageError::QuotaExceeded {
                key: key.to_string(),
                needed,
                quota,
            });
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// In-memory storage
// ---------------------------------------------------------------------------

/// Storage held entirely in memory. Used by tests and as a scratch store.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    items: IndexMap<String, String>,
    quota: Option<usize>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store that rejects writes pushing total usage past `quota` bytes
    pub fn with_quota(quota: usize) -> Self {
        MemoryStorage {
            items: IndexMap::new(),
            quota: Some(quota),
        }
    }

    /// Raw value under `key`, bypassing the `Result` of the trait
    pub fn raw(&self, key: &str) -> Option<&str> {
        self.items.get(key).map(|s| s.as_str())
    }
}

impl Storage for MemoryStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.items.get(key).cloned())
    }

    fn set_item(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        check_quota(&self.items, self.quota, key, value)?;
        self.items.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&mut self, key: &str) -> Result<(), StorageError> {
        self.items.shift_remove(key);
        Ok(())
    }

    fn keys(&self) -> Vec<String> {
        self.items.keys().cloned().collect()
    }
}

// ---------------------------------------------------------------------------
// File-backed storage
// ---------------------------------------------------------------------------

/// Storage persisted as a single JSON object file (`{"key": "raw value"}`).
#[derive(Debug)]
pub struct FileStorage {
    path: PathBuf,
    items: IndexMap<String, String>,
    quota: Option<usize>,
}

impl FileStorage {
    /// Open the store at `path`. A missing file is an empty store; a corrupt
    /// file is backed up as `<file>.bak` and the store starts empty.
    ///
    /// If the backup fails the store still opens empty, but every write is
    /// refused until the file is repaired or removed.
    pub fn open(path: &Path) -> Result<Self, StorageError> {
        let items = match load_items(path) {
            Err(e @ StorageError::CorruptUnbacked { .. }) => {
                warn!(error = %e, "store is read-only until the corrupt file is dealt with");
                IndexMap::new()
            }
            other => other?,
        };
        debug!(path = %path.display(), keys = items.len(), "opened store");
        Ok(FileStorage {
            path: path.to_path_buf(),
            items,
            quota: None,
        })
    }

    pub fn with_quota(mut self, quota: Option<usize>) -> Self {
        self.quota = quota;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Re-read the file under the lock, apply `change`, and write it back.
    /// The in-memory map only takes the new contents once the write lands.
    fn write_through<F>(&mut self, change: F) -> Result<(), StorageError>
    where
        F: FnOnce(&mut IndexMap<String, String>) -> Result<(), StorageError>,
    {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| StorageError::WriteError {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }
        let _lock = StoreLock::acquire_default(&self.path)?;
        let mut items = load_items(&self.path)?;
        change(&mut items)?;
        let content = serde_json::to_string_pretty(&items)?;
        atomic_write(&self.path, content.as_bytes()).map_err(|e| StorageError::WriteError {
            path: self.path.clone(),
            source: e,
        })?;
        self.items = items;
        Ok(())
    }
}

impl Storage for FileStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.items.get(key).cloned())
    }

    fn set_item(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        let quota = self.quota;
        self.write_through(|items| {
            check_quota(items, quota, key, value)?;
            items.insert(key.to_string(), value.to_string());
            Ok(())
        })
    }

    fn remove_item(&mut self, key: &str) -> Result<(), StorageError> {
        if !self.items.contains_key(key) && !self.path.exists() {
            return Ok(());
        }
        self.write_through(|items| {
            items.shift_remove(key);
            Ok(())
        })
    }

    fn keys(&self) -> Vec<String> {
        self.items.keys().cloned().collect()
    }
}

fn load_items(path: &Path) -> Result<IndexMap<String, String>, StorageError> {
    if !path.exists() {
        return Ok(IndexMap::new());
    }
    let content = fs::read_to_string(path).map_err(|e| StorageError::ReadError {
        path: path.to_path_buf(),
        source: e,
    })?;
    if content.trim().is_empty() {
        return Ok(IndexMap::new());
    }
    match serde_json::from_str::<IndexMap<String, String>>(&content) {
        Ok(items) => Ok(items),
        Err(e) => {
            let bak = backup_path_for(path);
            if let Err(source) = fs::copy(path, &bak) {
                return Err(StorageError::CorruptUnbacked {
                    path: path.to_path_buf(),
                    backup: bak,
                    source,
                });
            }
            warn!(
                path = %path.display(),
                backup = %bak.display(),
                error = %e,
                "store file is corrupt, starting empty"
            );
            Ok(IndexMap::new())
        }
    }
}

/// Where a corrupt store file is copied before it is replaced
pub fn backup_path_for(store_path: &Path) -> PathBuf {
    let mut name = store_path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(|| "store".into());
    name.push(".bak");
    store_path.with_file_name(name)
}

/// Write `content` to `path` atomically using a temp file + rename.
pub fn atomic_write(path: &Path, content: &[u8]) -> io::Result<()> {
    let dir = path.parent().unwrap_or(Path::new("."));
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(content)?;
    tmp.flush()?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}
