//! Session tokens for the Cellswap client
//!
//! A [`TokenPair`] is created on login, its access half rotated on refresh,
//! and the whole pair destroyed on logout or when a refresh bottoms out.
//! Storage is behind the [`TokenStore`] trait so a session can live in
//! memory, on disk, or wherever the embedding application keeps it; the
//! store is passed explicitly into the HTTP client rather than living in a
//! process-global.

mod store;
mod types;

pub use store::{FileTokenStore, MemoryTokenStore, TokenStore};
pub use types::TokenPair;
