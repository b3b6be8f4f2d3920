//! The authenticated HTTP client

use std::sync::Arc;

use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{debug, warn};

use cellswap_session::TokenStore;

use crate::config::Config;
use crate::error::{ApiError, Result};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RefreshResponse {
    access_token: String,
}

/// HTTP client for the Cellswap backend.
///
/// Attaches the stored bearer token to every request. A 401 response
/// triggers the refresh-and-replay branch exactly once per logical
/// request: refresh the access token through `/auth/refresh`, rebuild the
/// request with the new bearer, and return the replay's outcome as if the
/// first attempt had succeeded. A 401 on the replay itself propagates.
///
/// Refreshes are serialized through an internal gate so that N requests
/// failing on the same expired token produce one refresh call, not N.
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    tokens: Arc<dyn TokenStore>,
    refresh_gate: Mutex<()>,
}

impl ApiClient {
    pub fn new(config: &Config, tokens: Arc<dyn TokenStore>) -> Self {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .expect("Failed to create HTTP client");

        Self {
            http,
            base_url: config.base_url.clone(),
            tokens,
            refresh_gate: Mutex::new(()),
        }
    }

    /// The token store this client reads bearer tokens from.
    pub fn token_store(&self) -> &Arc<dyn TokenStore> {
        &self.tokens
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let response = self.request(Method::GET, path, None).await?;
        Self::expect_json(response).await
    }

    pub async fn post<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T> {
        let body = serde_json::to_value(body)?;
        let response = self.request(Method::POST, path, Some(body)).await?;
        Self::expect_json(response).await
    }

    /// POST where the caller only cares about success.
    pub async fn post_unit<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<()> {
        let body = serde_json::to_value(body)?;
        let response = self.request(Method::POST, path, Some(body)).await?;
        Self::expect_unit(response).await
    }

    pub async fn patch<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T> {
        let body = serde_json::to_value(body)?;
        let response = self.request(Method::PATCH, path, Some(body)).await?;
        Self::expect_json(response).await
    }

    pub async fn delete_unit(&self, path: &str) -> Result<()> {
        let response = self.request(Method::DELETE, path, None).await?;
        Self::expect_unit(response).await
    }

    /// Send a request with the current bearer attached, handling the 401
    /// branch. Returns the final response whatever its status; typed
    /// unwrapping happens in the callers.
    async fn request(
        &self,
        method: Method,
        path: &str,
        body: Option<serde_json::Value>,
    ) -> Result<reqwest::Response> {
        let url = format!("{}{}", self.base_url, path);
        let stale = self.tokens.get().map(|pair| pair.access);

        let response = self
            .dispatch(&method, &url, body.as_ref(), stale.as_deref())
            .await?;
        if response.status() != StatusCode::UNAUTHORIZED {
            return Ok(response);
        }

        debug!(%method, path, "unauthorized response, refreshing access token");
        let access = self.refresh_access(stale.as_deref()).await?;

        // One replay only: a 401 on the replayed request propagates.
        self.dispatch(&method, &url, body.as_ref(), Some(&access))
            .await
    }

    async fn dispatch(
        &self,
        method: &Method,
        url: &str,
        body: Option<&serde_json::Value>,
        access: Option<&str>,
    ) -> Result<reqwest::Response> {
        let mut request = self.http.request(method.clone(), url);
        if let Some(token) = access {
            request = request.bearer_auth(token);
        }
        if let Some(body) = body {
            request = request.json(body);
        }
        Ok(request.send().await?)
    }

    /// Mint a new access token, serialized across concurrent callers.
    ///
    /// `stale` is the access token the failed request carried. After
    /// acquiring the gate we re-read the store: if the token already
    /// differs, a concurrent request refreshed meanwhile and we reuse its
    /// result instead of issuing a second refresh call.
    ///
    /// Any dead end here is terminal for the session: missing refresh
    /// token, a rejected or failed refresh call, and an unreadable refresh
    /// body all clear the store and yield [`ApiError::SessionExpired`].
    async fn refresh_access(&self, stale: Option<&str>) -> Result<String> {
        let _gate = self.refresh_gate.lock().await;

        if let Some(pair) = self.tokens.get() {
            if stale != Some(pair.access.as_str()) {
                debug!("access token already rotated by a concurrent request");
                return Ok(pair.access);
            }
        }

        let refresh = match self.tokens.get() {
            Some(pair) => pair.refresh,
            None => {
                warn!("unauthorized with no stored session, forcing logout");
                self.tokens.clear();
                return Err(ApiError::SessionExpired);
            }
        };

        let url = format!("{}/auth/refresh", self.base_url);
        let sent = self
            .http
            .post(&url)
            .json(&serde_json::json!({ "refreshToken": refresh }))
            .send()
            .await;

        let response = match sent {
            Ok(response) if response.status().is_success() => response,
            Ok(response) => {
                warn!(status = %response.status(), "token refresh rejected, clearing session");
                self.tokens.clear();
                return Err(ApiError::SessionExpired);
            }
            Err(e) => {
                warn!(error = %e, "token refresh call failed, clearing session");
                self.tokens.clear();
                return Err(ApiError::SessionExpired);
            }
        };

        let body: RefreshResponse = match response.json().await {
            Ok(body) => body,
            Err(e) => {
                warn!(error = %e, "unreadable refresh response, clearing session");
                self.tokens.clear();
                return Err(ApiError::SessionExpired);
            }
        };

        self.tokens.set_access(body.access_token.clone());
        debug!("access token rotated");
        Ok(body.access_token)
    }

    async fn expect_json<T: DeserializeOwned>(response: reqwest::Response) -> Result<T> {
        let response = Self::check_status(response).await?;
        Ok(response.json().await?)
    }

    async fn expect_unit(response: reqwest::Response) -> Result<()> {
        Self::check_status(response).await.map(|_| ())
    }

    /// Map non-success statuses to [`ApiError::Status`], pulling the
    /// message out of the backend's `{"error": ...}` body when present.
    async fn check_status(response: reqwest::Response) -> Result<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<serde_json::Value>(&body)
            .ok()
            .and_then(|v| v.get("error").and_then(|m| m.as_str()).map(String::from))
            .unwrap_or_else(|| {
                if body.is_empty() {
                    status
                        .canonical_reason()
                        .unwrap_or("unknown error")
                        .to_string()
                } else {
                    body.clone()
                }
            });

        Err(ApiError::Status {
            status: status.as_u16(),
            message,
        })
    }
}
