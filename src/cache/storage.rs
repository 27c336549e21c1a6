//! Synchronous key-value storage media for the cache blob
//!
//! The cache persists a single serialized document under one key. Storage
//! access is fallible and reported through `Result`; the cache manager
//! decides what a failure means.

use std::collections::HashMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use directories::ProjectDirs;
use thiserror::Error;

/// Errors that can occur when accessing a storage medium
#[derive(Debug, Error)]
pub enum StorageError {
    /// Filesystem read or write failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The medium refused the write because it is full
    #[error("storage quota exceeded")]
    QuotaExceeded,

    /// The medium cannot be used at all
    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

/// A synchronous string key-value store
pub trait Storage: Send + Sync + std::fmt::Debug {
    /// Reads the value stored under `key`, `Ok(None)` if there is none
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Replaces the value stored under `key`
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Deletes `key`; deleting a missing key is not an error
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

/// Stores each key as a JSON file in a cache directory
///
/// Uses `~/.cache/flashquiz/` on Linux, or the platform equivalent, unless
/// a directory is given explicitly.
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    /// Creates a FileStorage in the XDG-compliant cache directory
    ///
    /// Returns `None` if the cache directory cannot be determined (e.g., no home directory).
    pub fn new() -> Option<Self> {
        let project_dirs = ProjectDirs::from("", "", "flashquiz")?;
        Some(Self {
            dir: project_dirs.cache_dir().to_path_buf(),
        })
    }

    /// Creates a FileStorage rooted at a custom directory
    pub fn with_dir(dir: PathBuf) -> Self {
        Self { dir }
    }

    /// Directory holding the cache files
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }
}

impl Storage for FileStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let path = self.path(key);
        if !path.exists() {
            return Ok(None);
        }
        Ok(Some(fs::read_to_string(path)?))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        fs::create_dir_all(&self.dir)?;

        // Write atomically via temp file
        let path = self.path(key);
        let temp_path = path.with_extension("tmp");
        let mut file = fs::File::create(&temp_path)?;
        file.write_all(value.as_bytes())?;
        file.sync_all()?;
        fs::rename(&temp_path, &path)?;

        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let path = self.path(key);
        if path.exists() {
            fs::remove_file(path)?;
        }
        Ok(())
    }
}

/// In-process storage, mainly for tests and ephemeral sessions
///
/// `set_fail_writes(true)` makes every write fail with
/// [`StorageError::QuotaExceeded`], and `set_fail_reads(true)` does the same
/// for reads with [`StorageError::Unavailable`].
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: Mutex<HashMap<String, String>>,
    fail_writes: AtomicBool,
    fail_reads: AtomicBool,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, String>>, StorageError> {
        self.entries
            .lock()
            .map_err(|_| StorageError::Unavailable("storage lock poisoned".to_string()))
    }
}

impl Storage for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(StorageError::Unavailable("reads disabled".to_string()));
        }
        Ok(self.lock()?.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StorageError::QuotaExceeded);
        }
        self.lock()?.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.lock()?.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_file_storage_roundtrip() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let storage = FileStorage::with_dir(temp_dir.path().to_path_buf());

        storage.set("blob", "{\"a\":1}").expect("Write should succeed");

        assert!(temp_dir.path().join("blob.json").exists());
        assert_eq!(storage.get("blob").unwrap().as_deref(), Some("{\"a\":1}"));
    }

    #[test]
    fn test_file_storage_missing_key() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let storage = FileStorage::with_dir(temp_dir.path().to_path_buf());

        assert!(storage.get("nothing").unwrap().is_none());
        storage.remove("nothing").expect("Removing a missing key is fine");
    }

    #[test]
    fn test_file_storage_creates_nested_dir() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let nested = temp_dir.path().join("nested").join("cache");
        let storage = FileStorage::with_dir(nested.clone());

        storage.set("blob", "x").expect("Write should succeed");

        assert!(nested.join("blob.json").exists());
        assert!(!nested.join("blob.tmp").exists(), "temp file should be renamed away");
    }

    #[test]
    fn test_file_storage_remove() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let storage = FileStorage::with_dir(temp_dir.path().to_path_buf());

        storage.set("blob", "x").unwrap();
        storage.remove("blob").unwrap();

        assert!(storage.get("blob").unwrap().is_none());
    }

    #[test]
    fn test_new_creates_xdg_compliant_path() {
        if let Some(storage) = FileStorage::new() {
            assert!(storage.dir().to_string_lossy().contains("flashquiz"));
        }
        // Test passes if new() returns None (e.g., no home directory in CI)
    }

    #[test]
    fn test_memory_storage_failure_switches() {
        let storage = MemoryStorage::new();
        storage.set("k", "v").unwrap();

        storage.set_fail_writes(true);
        assert!(matches!(storage.set("k", "w"), Err(StorageError::QuotaExceeded)));
        assert_eq!(storage.get("k").unwrap().as_deref(), Some("v"));

        storage.set_fail_reads(true);
        assert!(storage.get("k").is_err());
    }
}
