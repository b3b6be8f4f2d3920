//! TTL cache over a storage backend

use std::time::Duration;

use chrono::Utc;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::storage::Storage;

/// The JSON envelope written to storage for every cached value.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope<T> {
    pub data: T,
    /// Write time, epoch milliseconds.
    pub timestamp: i64,
    /// Time-to-live, milliseconds.
    pub ttl: u64,
}

impl<T> Envelope<T> {
    /// An envelope is fresh while `now - timestamp <= ttl`.
    pub fn is_fresh_at(&self, now_ms: i64) -> bool {
        now_ms - self.timestamp <= self.ttl as i64
    }
}

/// Best-effort durable cache with lazy expiry.
///
/// Every key is stored under a namespace prefix so [`TtlCache::clear`] can
/// delete exactly this cache's entries without a hardcoded key list, even
/// when several caches share one storage backend.
pub struct TtlCache<S: Storage> {
    storage: S,
    namespace: String,
    default_ttl: Duration,
}

impl<S: Storage> TtlCache<S> {
    pub fn new(storage: S, namespace: &str, default_ttl: Duration) -> Self {
        Self {
            storage,
            namespace: namespace.to_string(),
            default_ttl,
        }
    }

    fn storage_key(&self, key: &str) -> String {
        format!("{}:{}", self.namespace, key)
    }

    /// Store `data` under `key`, overwriting any existing entry.
    ///
    /// Falls back to the cache's default TTL when `ttl` is `None`. Failures
    /// are logged and swallowed; the cache is an optimization, not a
    /// correctness dependency.
    pub fn set<T: Serialize>(&self, key: &str, data: &T, ttl: Option<Duration>) {
        let envelope = Envelope {
            data,
            timestamp: Utc::now().timestamp_millis(),
            ttl: ttl.unwrap_or(self.default_ttl).as_millis() as u64,
        };
        let json = match serde_json::to_string(&envelope) {
            Ok(json) => json,
            Err(e) => {
                debug!(key, error = %e, "failed to serialize cache entry");
                return;
            }
        };
        if let Err(e) = self.storage.write(&self.storage_key(key), &json) {
            debug!(key, error = %e, "failed to write cache entry");
        }
    }

    /// Read the value under `key`, or `None` on miss.
    ///
    /// Expired and unparseable entries are deleted on read and reported as
    /// a miss, so a `None` return leaves nothing behind in storage.
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let skey = self.storage_key(key);
        let raw = match self.storage.read(&skey) {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                debug!(key, error = %e, "cache read failed");
                return None;
            }
        };
        let envelope: Envelope<T> = match serde_json::from_str(&raw) {
            Ok(envelope) => envelope,
            Err(e) => {
                debug!(key, error = %e, "corrupt cache entry, deleting");
                self.delete_quietly(&skey, key);
                return None;
            }
        };
        if !envelope.is_fresh_at(Utc::now().timestamp_millis()) {
            debug!(key, "cache entry expired, deleting");
            self.delete_quietly(&skey, key);
            return None;
        }
        Some(envelope.data)
    }

    /// Delete one entry unconditionally.
    pub fn remove(&self, key: &str) {
        self.delete_quietly(&self.storage_key(key), key);
    }

    /// Delete every entry in this cache's namespace.
    pub fn clear(&self) {
        let prefix = format!("{}:", self.namespace);
        let keys = match self.storage.keys() {
            Ok(keys) => keys,
            Err(e) => {
                debug!(error = %e, "cache clear: key listing failed");
                return;
            }
        };
        for skey in keys.iter().filter(|k| k.starts_with(&prefix)) {
            if let Err(e) = self.storage.delete(skey) {
                debug!(key = %skey, error = %e, "cache clear: delete failed");
            }
        }
    }

    /// Same freshness check as [`TtlCache::get`] without mutating storage.
    /// Missing and corrupt entries count as expired.
    pub fn is_expired(&self, key: &str) -> bool {
        let raw = match self.storage.read(&self.storage_key(key)) {
            Ok(Some(raw)) => raw,
            _ => return true,
        };
        match serde_json::from_str::<Envelope<serde_json::Value>>(&raw) {
            Ok(envelope) => !envelope.is_fresh_at(Utc::now().timestamp_millis()),
            Err(_) => true,
        }
    }

    fn delete_quietly(&self, skey: &str, key: &str) {
        if let Err(e) = self.storage.delete(skey) {
            debug!(key, error = %e, "cache delete failed");
        }
    }
}
