//! KYC submission and status polling

use std::sync::Arc;

use serde::Deserialize;

use cellswap_client::{ApiClient, KycStatus, Result};

use crate::types::KycSubmission;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct KycStatusResponse {
    status: KycStatus,
}

pub struct KycService {
    client: Arc<ApiClient>,
}

impl KycService {
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self { client }
    }

    /// Submit document references. Media goes up separately through
    /// [`crate::MediaService`]; only object keys are sent here. Moves the
    /// partner's status to `Submitted`.
    pub async fn submit(&self, submission: &KycSubmission) -> Result<KycStatus> {
        let response: KycStatusResponse =
            self.client.post("/kyc/documents", submission).await?;
        Ok(response.status)
    }

    /// Current verification status; polled by the UI until it leaves
    /// `Submitted`.
    pub async fn status(&self) -> Result<KycStatus> {
        let response: KycStatusResponse = self.client.get("/kyc/status").await?;
        Ok(response.status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::routing::{get, post};
    use axum::{Json, Router};
    use cellswap_client::{Config, MemoryTokenStore};
    use serde_json::{json, Value};

    async fn documents(Json(body): Json<Value>) -> Json<Value> {
        assert_eq!(body["documentType"], "aadhaar");
        assert_eq!(body["frontKey"], "kyc/u-42/front.jpg");
        assert_eq!(body["backKey"], "kyc/u-42/back.jpg");
        Json(json!({"status": "submitted"}))
    }

    async fn status() -> Json<Value> {
        Json(json!({"status": "approved"}))
    }

    async fn spawn() -> String {
        let app = Router::new()
            .route("/kyc/documents", post(documents))
            .route("/kyc/status", get(status));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move { axum::serve(listener, app).await.unwrap() });
        format!("http://{}", addr)
    }

    fn service(base_url: &str) -> KycService {
        KycService::new(Arc::new(ApiClient::new(
            &Config::new(base_url),
            Arc::new(MemoryTokenStore::new()),
        )))
    }

    #[tokio::test]
    async fn test_submit_documents() {
        let base = spawn().await;
        let status = service(&base)
            .submit(&KycSubmission {
                document_type: "aadhaar".to_string(),
                front_key: "kyc/u-42/front.jpg".to_string(),
                back_key: Some("kyc/u-42/back.jpg".to_string()),
            })
            .await
            .unwrap();
        assert_eq!(status, KycStatus::Submitted);
    }

    #[tokio::test]
    async fn test_status_poll() {
        let base = spawn().await;
        assert_eq!(service(&base).status().await.unwrap(), KycStatus::Approved);
    }
}
