//! Session lifecycle: OTP login, logout, startup validation

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use cellswap_session::{TokenPair, TokenStore};

use crate::client::ApiClient;
use crate::error::{ApiError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    Customer,
    Partner,
    Agent,
}

/// KYC verification state gating partner payouts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KycStatus {
    #[default]
    Pending,
    Submitted,
    Approved,
    Rejected,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub phone: String,
    pub name: Option<String>,
    pub role: UserRole,
    #[serde(default)]
    pub kyc_status: KycStatus,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub user: User,
}

/// Drives login, logout and session validation against the backend's OTP
/// auth endpoints. Holds the same token store as the [`ApiClient`] it
/// wraps, so a successful login immediately authenticates every service
/// sharing that client.
pub struct AuthSession {
    client: Arc<ApiClient>,
    tokens: Arc<dyn TokenStore>,
}

impl AuthSession {
    pub fn new(client: Arc<ApiClient>) -> Self {
        let tokens = client.token_store().clone();
        Self { client, tokens }
    }

    /// Ask the backend to send a one-time password to `phone`.
    pub async fn request_otp(&self, phone: &str) -> Result<()> {
        self.client
            .post_unit("/auth/otp/request", &serde_json::json!({ "phone": phone }))
            .await
    }

    /// Verify the OTP. On success the returned token pair is stored and
    /// the session is live.
    pub async fn login(&self, phone: &str, otp: &str) -> Result<User> {
        let response: LoginResponse = self
            .client
            .post(
                "/auth/otp/verify",
                &serde_json::json!({ "phone": phone, "otp": otp }),
            )
            .await?;
        self.tokens.set(TokenPair::new(
            response.access_token,
            response.refresh_token,
        ));
        debug!(user = %response.user.id, "logged in");
        Ok(response.user)
    }

    /// Invalidate the refresh token server-side (best effort), then clear
    /// the local session unconditionally.
    pub async fn logout(&self) {
        if let Some(pair) = self.tokens.get() {
            let result = self
                .client
                .post_unit(
                    "/auth/logout",
                    &serde_json::json!({ "refreshToken": pair.refresh }),
                )
                .await;
            if let Err(e) = result {
                warn!(error = %e, "server-side logout failed, clearing local session anyway");
            }
        }
        self.tokens.clear();
    }

    /// Validate a stored session at startup by fetching the profile.
    ///
    /// Returns `Ok(None)` when no session is stored or the stored one was
    /// rejected (tokens are cleared by the refresh path in that case).
    /// Transport and server errors bubble up with the tokens left intact,
    /// so a flaky network at startup does not destroy a valid session.
    pub async fn init_auth(&self) -> Result<Option<User>> {
        if self.tokens.get().is_none() {
            return Ok(None);
        }
        match self.fetch_profile().await {
            Ok(user) => Ok(Some(user)),
            Err(ApiError::SessionExpired) => Ok(None),
            Err(e) => Err(e),
        }
    }

    pub async fn fetch_profile(&self) -> Result<User> {
        self.client.get("/auth/me").await
    }

    /// Silent profile re-fetch, used to poll for status changes (KYC
    /// approval in particular). Failures are logged and swallowed.
    pub async fn refetch_user(&self) -> Option<User> {
        match self.fetch_profile().await {
            Ok(user) => Some(user),
            Err(e) => {
                debug!(error = %e, "profile refetch failed");
                None
            }
        }
    }

    /// Derived, not stored: authenticated means a token pair exists.
    pub fn is_authenticated(&self) -> bool {
        self.tokens.get().is_some()
    }
}
