//! Authenticated HTTP client for the Cellswap trade-in backend
//!
//! [`ApiClient`] attaches the session's bearer token to every request and
//! owns the 401 concern: on an unauthorized response it refreshes the
//! access token once and transparently replays the original request.
//! Concurrent expiries share a single refresh call. Every other error
//! status passes through untouched for the caller to handle.
//!
//! [`AuthSession`] drives the session lifecycle on top of the client:
//! OTP login, logout, startup validation, and silent profile refetch.

mod auth;
mod client;
mod config;
mod error;

pub use auth::{AuthSession, KycStatus, LoginResponse, User, UserRole};
pub use client::ApiClient;
pub use config::Config;
pub use error::{ApiError, Result};

pub use cellswap_session::{FileTokenStore, MemoryTokenStore, TokenPair, TokenStore};
