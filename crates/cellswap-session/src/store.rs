//! Durable token stores

use std::fs;
use std::path::PathBuf;
use std::sync::RwLock;

use tracing::{debug, warn};

use crate::types::TokenPair;

/// Where the session's token pair lives.
///
/// The API is infallible by design: the original storage (browser local
/// storage) was fire-and-forget, and a session that fails to persist is
/// still a usable session. Implementations log persistence failures and
/// keep the in-memory copy authoritative.
pub trait TokenStore: Send + Sync {
    fn get(&self) -> Option<TokenPair>;
    fn set(&self, pair: TokenPair);
    /// Rotate only the access token, keeping the refresh token. No-op when
    /// no session is stored.
    fn set_access(&self, access: String);
    fn clear(&self);
}

/// In-memory store for tests and ephemeral sessions.
#[derive(Default)]
pub struct MemoryTokenStore {
    inner: RwLock<Option<TokenPair>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_pair(pair: TokenPair) -> Self {
        Self {
            inner: RwLock::new(Some(pair)),
        }
    }
}

impl TokenStore for MemoryTokenStore {
    fn get(&self) -> Option<TokenPair> {
        self.inner.read().unwrap().clone()
    }

    fn set(&self, pair: TokenPair) {
        *self.inner.write().unwrap() = Some(pair);
    }

    fn set_access(&self, access: String) {
        if let Some(pair) = self.inner.write().unwrap().as_mut() {
            pair.access = access;
        }
    }

    fn clear(&self) {
        *self.inner.write().unwrap() = None;
    }
}

/// File-backed store: the pair as one JSON file, loaded once at
/// construction and rewritten on every mutation. An unreadable or corrupt
/// file reads as "no session".
pub struct FileTokenStore {
    path: PathBuf,
    inner: RwLock<Option<TokenPair>>,
}

impl FileTokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let loaded = match fs::read_to_string(&path) {
            Ok(raw) => match serde_json::from_str(&raw) {
                Ok(pair) => Some(pair),
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "corrupt session file, starting unauthenticated");
                    None
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => None,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "failed to read session file");
                None
            }
        };
        Self {
            path,
            inner: RwLock::new(loaded),
        }
    }

    fn persist(&self, pair: Option<&TokenPair>) {
        let result = match pair {
            Some(pair) => serde_json::to_string(pair)
                .map_err(std::io::Error::other)
                .and_then(|json| fs::write(&self.path, json)),
            None => match fs::remove_file(&self.path) {
                Err(e) if e.kind() != std::io::ErrorKind::NotFound => Err(e),
                _ => Ok(()),
            },
        };
        if let Err(e) = result {
            warn!(path = %self.path.display(), error = %e, "failed to persist session");
        } else {
            debug!(path = %self.path.display(), "session persisted");
        }
    }
}

impl TokenStore for FileTokenStore {
    fn get(&self) -> Option<TokenPair> {
        self.inner.read().unwrap().clone()
    }

    fn set(&self, pair: TokenPair) {
        let mut guard = self.inner.write().unwrap();
        *guard = Some(pair);
        self.persist(guard.as_ref());
    }

    fn set_access(&self, access: String) {
        let mut guard = self.inner.write().unwrap();
        if let Some(pair) = guard.as_mut() {
            pair.access = access;
        }
        self.persist(guard.as_ref());
    }

    fn clear(&self) {
        let mut guard = self.inner.write().unwrap();
        *guard = None;
        self.persist(None);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store_roundtrip() {
        let store = MemoryTokenStore::new();
        assert!(store.get().is_none());
        store.set(TokenPair::new("a", "r"));
        assert_eq!(store.get(), Some(TokenPair::new("a", "r")));
        store.clear();
        assert!(store.get().is_none());
    }

    #[test]
    fn test_set_access_keeps_refresh() {
        let store = MemoryTokenStore::with_pair(TokenPair::new("old", "r"));
        store.set_access("new".to_string());
        assert_eq!(store.get(), Some(TokenPair::new("new", "r")));
    }

    #[test]
    fn test_set_access_without_session_is_noop() {
        let store = MemoryTokenStore::new();
        store.set_access("orphan".to_string());
        assert!(store.get().is_none());
    }

    #[test]
    fn test_file_store_persists_across_instances() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        {
            let store = FileTokenStore::new(&path);
            store.set(TokenPair::new("a", "r"));
        }
        let store = FileTokenStore::new(&path);
        assert_eq!(store.get(), Some(TokenPair::new("a", "r")));
    }

    #[test]
    fn test_file_store_clear_removes_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        let store = FileTokenStore::new(&path);
        store.set(TokenPair::new("a", "r"));
        store.clear();
        assert!(!path.exists());
        assert!(FileTokenStore::new(&path).get().is_none());
    }

    #[test]
    fn test_corrupt_session_file_reads_as_no_session() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        fs::write(&path, "{broken").unwrap();
        assert!(FileTokenStore::new(&path).get().is_none());
    }
}
