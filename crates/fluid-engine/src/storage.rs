//! Whole-blob text persistence keyed by path.
//!
//! Saves are full overwrites, never appends. Reads of an absent key report
//! [`StorageError::NotFound`] so callers can fall back to defaults.

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::PathBuf;

use crate::error::StorageError;

/// A byte-stream read/write pair keyed by a configured path.
pub trait Storage {
    fn read(&self, key: &str) -> Result<String, StorageError>;
    fn write(&mut self, key: &str, contents: &str) -> Result<(), StorageError>;
}

/// Files on disk, resolved relative to a data directory.
#[derive(Debug, Clone)]
pub struct FileStorage {
    root: PathBuf,
}

impl FileStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn path_for(&self, key: &str) -> PathBuf {
        self.root.join(key)
    }
}

impl Storage for FileStorage {
    fn read(&self, key: &str) -> Result<String, StorageError> {
        fs::read_to_string(self.path_for(key)).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => StorageError::NotFound(key.to_string()),
            _ => StorageError::Io(e),
        })
    }

    fn write(&mut self, key: &str, contents: &str) -> Result<(), StorageError> {
        let path = self.path_for(key);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, contents)?;
        Ok(())
    }
}

/// In-memory store, used by tests and by hosts without a filesystem.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    entries: HashMap<String, String>,
    read_only: bool,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store whose writes always fail.
    pub fn read_only() -> Self {
        Self {
            entries: HashMap::new(),
            read_only: true,
        }
    }

    pub fn with_entry(mut self, key: &str, contents: &str) -> Self {
        self.entries.insert(key.to_string(), contents.to_string());
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }
}

impl Storage for MemoryStorage {
    fn read(&self, key: &str) -> Result<String, StorageError> {
        self.entries
            .get(key)
            .cloned()
            .ok_or_else(|| StorageError::NotFound(key.to_string()))
    }

    fn write(&mut self, key: &str, contents: &str) -> Result<(), StorageError> {
        if self.read_only {
            return Err(StorageError::Unavailable(format!("'{}' is read-only", key)));
        }
        self.entries.insert(key.to_string(), contents.to_string());
        Ok(())
    }
}

impl<S: Storage + ?Sized> Storage for Box<S> {
    fn read(&self, key: &str) -> Result<String, StorageError> {
        (**self).read(key)
    }

    fn write(&mut self, key: &str, contents: &str) -> Result<(), StorageError> {
        (**self).write(key, contents)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("fluid-engine-{}-{}", name, std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        dir
    }

    #[test]
    fn memory_read_missing_is_not_found() {
        let store = MemoryStorage::new();
        assert!(matches!(store.read("lines.txt"), Err(StorageError::NotFound(_))));
    }

    #[test]
    fn memory_write_overwrites() {
        let mut store = MemoryStorage::new().with_entry("k", "old");
        store.write("k", "new").unwrap();
        assert_eq!(store.read("k").unwrap(), "new");
    }

    #[test]
    fn read_only_memory_rejects_writes() {
        let mut store = MemoryStorage::read_only();
        assert!(store.write("k", "v").is_err());
        assert!(store.get("k").is_none());
    }

    #[test]
    fn file_storage_round_trip() {
        let dir = scratch_dir("roundtrip");
        let mut store = FileStorage::new(&dir);

        assert!(matches!(store.read("lines.txt"), Err(StorageError::NotFound(_))));
        store.write("lines.txt", "1,2,\n").unwrap();
        store.write("lines.txt", "3,4,\n").unwrap();
        assert_eq!(store.read("lines.txt").unwrap(), "3,4,\n");

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn file_storage_write_into_file_path_fails() {
        let dir = scratch_dir("blocked");
        let mut store = FileStorage::new(&dir);
        store.write("blocker", "x").unwrap();

        // "blocker" is a file, so it cannot act as a directory.
        let err = store.write("blocker/lines.txt", "1,2,\n");
        assert!(err.is_err());

        let _ = fs::remove_dir_all(&dir);
    }
}
