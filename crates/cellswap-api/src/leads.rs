//! Partner-side leads: browse, claim, visit, complete
//!
//! A lead walks `Open → Claimed → Visited → Completed` in the happy path,
//! with `Disputed` and `Cancelled` as exits. The backend enforces the
//! transitions; illegal ones come back as 409s and pass through untouched.

use std::sync::Arc;

use cellswap_client::{ApiClient, Result};

use crate::types::Lead;

pub struct LeadsService {
    client: Arc<ApiClient>,
}

impl LeadsService {
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self { client }
    }

    /// Open leads available to claim, optionally filtered by area.
    pub async fn open(&self, area: Option<&str>) -> Result<Vec<Lead>> {
        let mut path = "/leads?status=open".to_string();
        if let Some(area) = area {
            path.push_str(&format!("&area={}", urlencoding::encode(area)));
        }
        self.client.get(&path).await
    }

    /// Leads the authenticated partner has claimed.
    pub async fn mine(&self) -> Result<Vec<Lead>> {
        self.client.get("/leads/mine").await
    }

    pub async fn claim(&self, lead_id: &str) -> Result<Lead> {
        self.client
            .post(&format!("/leads/{}/claim", lead_id), &serde_json::json!({}))
            .await
    }

    /// Hand a claimed lead back to the open pool.
    pub async fn release(&self, lead_id: &str) -> Result<Lead> {
        self.client
            .post(&format!("/leads/{}/release", lead_id), &serde_json::json!({}))
            .await
    }

    pub async fn mark_visited(&self, lead_id: &str) -> Result<Lead> {
        self.client
            .post(&format!("/leads/{}/visit", lead_id), &serde_json::json!({}))
            .await
    }

    /// Close out a visited lead with the price verified on site. The
    /// payout lands in the partner's wallet as a pending credit.
    pub async fn complete(&self, lead_id: &str, final_amount: i64) -> Result<Lead> {
        self.client
            .post(
                &format!("/leads/{}/complete", lead_id),
                &serde_json::json!({ "finalAmount": final_amount }),
            )
            .await
    }
}
