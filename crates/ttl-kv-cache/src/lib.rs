//! Durable key-value cache with TTL envelopes
//!
//! Stores serde-serializable values under string keys as JSON envelopes
//! carrying a write timestamp and a time-to-live. Expiry is lazy: entries
//! past their TTL are deleted the next time they are read. All operations
//! are best-effort — storage or serialization failures degrade to a cache
//! miss and are never surfaced to callers.

mod cache;
mod error;
mod storage;

pub use cache::{Envelope, TtlCache};
pub use error::{CacheError, Result};
pub use storage::{FileStorage, MemoryStorage, Storage};
