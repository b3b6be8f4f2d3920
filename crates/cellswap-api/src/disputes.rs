//! Disputes raised against completed or mispriced leads

use std::sync::Arc;

use cellswap_client::{ApiClient, Result};

use crate::types::Dispute;

pub struct DisputeService {
    client: Arc<ApiClient>,
}

impl DisputeService {
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self { client }
    }

    /// Open a dispute on a lead. The lead moves to `Disputed` and its
    /// payout is frozen until resolution.
    pub async fn open(&self, lead_id: &str, reason: &str) -> Result<Dispute> {
        self.client
            .post(
                "/disputes",
                &serde_json::json!({ "leadId": lead_id, "reason": reason }),
            )
            .await
    }

    pub async fn list(&self) -> Result<Vec<Dispute>> {
        self.client.get("/disputes").await
    }

    pub async fn respond(&self, dispute_id: &str, message: &str) -> Result<Dispute> {
        self.client
            .post(
                &format!("/disputes/{}/responses", dispute_id),
                &serde_json::json!({ "message": message }),
            )
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::DisputeStatus;
    use axum::extract::Path;
    use axum::routing::post;
    use axum::{Json, Router};
    use cellswap_client::{Config, MemoryTokenStore};
    use serde_json::{json, Value};

    async fn open(Json(body): Json<Value>) -> Json<Value> {
        Json(json!({
            "id": "d-1",
            "leadId": body["leadId"],
            "reason": body["reason"],
            "status": "open",
            "createdAt": "2026-08-23T10:00:00Z"
        }))
    }

    async fn respond(Path(id): Path<String>, Json(_body): Json<Value>) -> Json<Value> {
        Json(json!({
            "id": id,
            "leadId": "l-1",
            "reason": "device condition mismatch",
            "status": "under_review",
            "createdAt": "2026-08-23T10:00:00Z"
        }))
    }

    async fn spawn() -> String {
        let app = Router::new()
            .route("/disputes", post(open))
            .route("/disputes/{id}/responses", post(respond));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move { axum::serve(listener, app).await.unwrap() });
        format!("http://{}", addr)
    }

    fn service(base_url: &str) -> DisputeService {
        DisputeService::new(Arc::new(ApiClient::new(
            &Config::new(base_url),
            Arc::new(MemoryTokenStore::new()),
        )))
    }

    #[tokio::test]
    async fn test_open_dispute() {
        let base = spawn().await;
        let dispute = service(&base)
            .open("l-1", "device condition mismatch")
            .await
            .unwrap();
        assert_eq!(dispute.lead_id, "l-1");
        assert_eq!(dispute.status, DisputeStatus::Open);
    }

    #[tokio::test]
    async fn test_respond_moves_to_review() {
        let base = spawn().await;
        let dispute = service(&base).respond("d-1", "attaching photos").await.unwrap();
        assert_eq!(dispute.status, DisputeStatus::UnderReview);
    }
}
