//! Durable key-value slots and their built-in backends.

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{PoisonError, RwLock};

/// A client-side key-value slot holding string documents.
///
/// Mirrors what a browser's local storage offers. Backends report failures
/// as `io::Error`; callers in this crate decide whether a failure matters.
pub trait KeyValueStorage: Send + Sync {
    /// Read the value under `key`. `Ok(None)` when the key was never written.
    fn get(&self, key: &str) -> io::Result<Option<String>>;

    /// Replace the value under `key`.
    fn set(&self, key: &str, value: &str) -> io::Result<()>;

    /// Delete the value under `key`. Removing a missing key is not an error.
    fn remove(&self, key: &str) -> io::Result<()>;
}

/// Stores each key as `<base_dir>/<key>.json`.
///
/// Writes go to `<key>.json.tmp` first and are renamed into place, so a
/// reader never observes a partially-written document.
#[derive(Debug, Clone)]
pub struct FileStorage {
    base_dir: PathBuf,
}

impl FileStorage {
    /// Create a backend rooted at `base_dir`.
    ///
    /// The directory does not need to exist yet; it is created on the first
    /// write.
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Path of the file backing `key`.
    pub fn path_for(&self, key: &str) -> PathBuf {
        self.base_dir.join(format!("{key}.json"))
    }
}

impl KeyValueStorage for FileStorage {
    fn get(&self, key: &str) -> io::Result<Option<String>> {
        match fs::read_to_string(self.path_for(key)) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }

    fn set(&self, key: &str, value: &str) -> io::Result<()> {
        fs::create_dir_all(&self.base_dir)?;
        let path = self.path_for(key);
        let tmp_path = path.with_extension("json.tmp");
        fs::write(&tmp_path, value)?;
        fs::rename(&tmp_path, &path)?;
        Ok(())
    }

    fn remove(&self, key: &str) -> io::Result<()> {
        match fs::remove_file(self.path_for(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e),
        }
    }
}

/// Session-only storage: values live as long as this value does.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    values: RwLock<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStorage for MemoryStorage {
    fn get(&self, key: &str) -> io::Result<Option<String>> {
        let values = self.values.read().unwrap_or_else(PoisonError::into_inner);
        Ok(values.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> io::Result<()> {
        let mut values = self.values.write().unwrap_or_else(PoisonError::into_inner);
        values.insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    fn remove(&self, key: &str) -> io::Result<()> {
        let mut values = self.values.write().unwrap_or_else(PoisonError::into_inner);
        values.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn path_for_appends_json_extension() {
        let storage = FileStorage::new("/data/civicfix");
        assert_eq!(
            storage.path_for("civicfix-storage"),
            PathBuf::from("/data/civicfix/civicfix-storage.json")
        );
    }

    #[test]
    fn file_get_missing_key_is_none() {
        let tmp = TempDir::new().expect("failed to create temp dir");
        let storage = FileStorage::new(tmp.path());
        assert_eq!(storage.get("nope").expect("get should succeed"), None);
    }

    #[test]
    fn file_set_creates_directory_lazily() {
        let tmp = TempDir::new().expect("failed to create temp dir");
        let storage = FileStorage::new(tmp.path().join("nested/dir"));

        storage.set("k", "v").expect("set should succeed");

        assert_eq!(storage.get("k").expect("get should succeed").as_deref(), Some("v"));
    }

    #[test]
    fn file_set_uses_atomic_temp_rename() {
        let tmp = TempDir::new().expect("failed to create temp dir");
        let storage = FileStorage::new(tmp.path());

        storage.set("k", "{}").expect("set should succeed");

        let path = storage.path_for("k");
        assert!(path.exists(), "final file should exist");
        assert!(
            !path.with_extension("json.tmp").exists(),
            "temp file should not exist after successful set"
        );
    }

    #[test]
    fn file_set_overwrites() {
        let tmp = TempDir::new().expect("failed to create temp dir");
        let storage = FileStorage::new(tmp.path());
        storage.set("k", "one").expect("first set");
        storage.set("k", "two").expect("second set");
        assert_eq!(storage.get("k").expect("get").as_deref(), Some("two"));
    }

    #[test]
    fn file_remove_is_idempotent() {
        let tmp = TempDir::new().expect("failed to create temp dir");
        let storage = FileStorage::new(tmp.path());
        storage.set("k", "v").expect("set");
        storage.remove("k").expect("first remove");
        storage.remove("k").expect("second remove");
        assert_eq!(storage.get("k").expect("get"), None);
    }

    #[test]
    fn memory_round_trips_unicode() {
        let storage = MemoryStorage::new();
        storage.set("k", "Straße ✓ 道路").expect("set");
        assert_eq!(storage.get("k").expect("get").as_deref(), Some("Straße ✓ 道路"));
        storage.remove("k").expect("remove");
        assert_eq!(storage.get("k").expect("get"), None);
    }
}
