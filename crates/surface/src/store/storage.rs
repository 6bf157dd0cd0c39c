//! Durable mirror backends.
//!
//! The store persists through this seam: a string value per fixed key.
//! Reads that fail for any reason surface as "absent" - the store treats
//! a missing or unreadable mirror as an empty collection. Writes are
//! best-effort; callers swallow failures and keep the in-memory state
//! authoritative.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

use crate::error::StorageError;

/// Key-value durable medium for the store's mirror.
pub trait Storage {
    /// Read the value under `key`, if present and readable.
    fn read(&self, key: &str) -> Option<String>;

    /// Write `value` under `key`.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the medium rejects the write; the
    /// caller keeps its in-memory state and retries on the next
    /// mutation.
    fn write(&self, key: &str, value: &str) -> Result<(), StorageError>;
}

/// In-process storage, for embedders without a durable medium and for
/// tests.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    values: RefCell<HashMap<String, String>>,
}

impl MemoryStorage {
    /// Create an empty in-memory store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl Storage for MemoryStorage {
    fn read(&self, key: &str) -> Option<String> {
        self.values.borrow().get(key).cloned()
    }

    fn write(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.values
            .borrow_mut()
            .insert(key.to_owned(), value.to_owned());
        Ok(())
    }
}

/// File-backed storage: one JSON document per key under a root
/// directory.
#[derive(Debug, Clone)]
pub struct FileStorage {
    root: PathBuf,
}

impl FileStorage {
    /// Create storage rooted at `root`. The directory is created lazily
    /// on first write.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.root.join(format!("{key}.json"))
    }
}

impl Storage for FileStorage {
    fn read(&self, key: &str) -> Option<String> {
        fs::read_to_string(self.path_for(key)).ok()
    }

    fn write(&self, key: &str, value: &str) -> Result<(), StorageError> {
        fs::create_dir_all(&self.root)?;
        fs::write(self.path_for(key), value)?;
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn temp_root() -> PathBuf {
        std::env::temp_dir().join(format!("flourish-storage-{}", uuid::Uuid::new_v4()))
    }

    #[test]
    fn test_memory_round_trip() {
        let storage = MemoryStorage::new();
        assert_eq!(storage.read("cart"), None);
        storage.write("cart", "[]").unwrap();
        assert_eq!(storage.read("cart"), Some("[]".to_owned()));
    }

    #[test]
    fn test_file_round_trip() {
        let root = temp_root();
        let storage = FileStorage::new(&root);
        assert_eq!(storage.read("cart"), None);
        storage.write("cart", r#"[{"id":"a"}]"#).unwrap();
        assert_eq!(storage.read("cart"), Some(r#"[{"id":"a"}]"#.to_owned()));
        fs::remove_dir_all(&root).unwrap();
    }

    #[test]
    fn test_file_read_of_missing_root_is_absent() {
        let storage = FileStorage::new(temp_root());
        assert_eq!(storage.read("cart"), None);
    }
}
