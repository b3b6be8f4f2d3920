//! Pluggable durable storage backends

use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use std::sync::Mutex;

use crate::error::Result;

/// A flat string-keyed store the cache writes its envelopes into.
///
/// Implementations are expected to be cheap for small values; the cache
/// never stores blobs here, only JSON envelopes.
pub trait Storage: Send + Sync {
    fn read(&self, key: &str) -> Result<Option<String>>;
    fn write(&self, key: &str, value: &str) -> Result<()>;
    fn delete(&self, key: &str) -> Result<()>;
    /// All keys currently present, in no particular order.
    fn keys(&self) -> Result<Vec<String>>;
}

/// In-memory storage for tests and ephemeral processes.
#[derive(Default)]
pub struct MemoryStorage {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Storage for MemoryStorage {
    fn read(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.lock().unwrap().get(key).cloned())
    }

    fn write(&self, key: &str, value: &str) -> Result<()> {
        self.entries
            .lock()
            .unwrap()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<()> {
        self.entries.lock().unwrap().remove(key);
        Ok(())
    }

    fn keys(&self) -> Result<Vec<String>> {
        Ok(self.entries.lock().unwrap().keys().cloned().collect())
    }
}

/// File-backed storage: one JSON file per key under a directory.
///
/// Keys are percent-encoded into filenames so namespaced keys like
/// `catalog:brands` stay filesystem-safe.
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    /// Create a store rooted at `dir`, creating the directory if needed.
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir
            .join(format!("{}.json", urlencoding::encode(key)))
    }
}

impl Storage for FileStorage {
    fn read(&self, key: &str) -> Result<Option<String>> {
        match fs::read_to_string(self.path_for(key)) {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn write(&self, key: &str, value: &str) -> Result<()> {
        fs::write(self.path_for(key), value)?;
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<()> {
        match fs::remove_file(self.path_for(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    fn keys(&self) -> Result<Vec<String>> {
        let mut keys = Vec::new();
        for entry in fs::read_dir(&self.dir)? {
            let name = entry?.file_name();
            let name = name.to_string_lossy();
            if let Some(encoded) = name.strip_suffix(".json") {
                if let Ok(decoded) = urlencoding::decode(encoded) {
                    keys.push(decoded.into_owned());
                }
            }
        }
        Ok(keys)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_roundtrip() {
        let storage = MemoryStorage::new();
        storage.write("a", "1").unwrap();
        assert_eq!(storage.read("a").unwrap().as_deref(), Some("1"));
        storage.delete("a").unwrap();
        assert_eq!(storage.read("a").unwrap(), None);
    }

    #[test]
    fn test_memory_keys() {
        let storage = MemoryStorage::new();
        storage.write("a", "1").unwrap();
        storage.write("b", "2").unwrap();
        let mut keys = storage.keys().unwrap();
        keys.sort();
        assert_eq!(keys, vec!["a", "b"]);
    }

    #[test]
    fn test_file_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path()).unwrap();
        storage.write("catalog:brands", "[1,2]").unwrap();
        assert_eq!(
            storage.read("catalog:brands").unwrap().as_deref(),
            Some("[1,2]")
        );
        assert_eq!(storage.keys().unwrap(), vec!["catalog:brands"]);
        storage.delete("catalog:brands").unwrap();
        assert_eq!(storage.read("catalog:brands").unwrap(), None);
    }

    #[test]
    fn test_file_delete_missing_is_ok() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path()).unwrap();
        assert!(storage.delete("never-written").is_ok());
    }

    #[test]
    fn test_file_keys_decodes_special_chars() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path()).unwrap();
        storage.write("models:brand/42", "x").unwrap();
        assert_eq!(storage.keys().unwrap(), vec!["models:brand/42"]);
        assert_eq!(storage.read("models:brand/42").unwrap().as_deref(), Some("x"));
    }
}
