//! Customer-side listings: turning an accepted quote into a pickup

use std::sync::Arc;

use chrono::{DateTime, Utc};

use cellswap_client::{ApiClient, Result};

use crate::types::Listing;

pub struct ListingsService {
    client: Arc<ApiClient>,
}

impl ListingsService {
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self { client }
    }

    /// Create a listing from an accepted quote. The backend rejects stale
    /// quote ids with a 422.
    pub async fn create(
        &self,
        quote_id: &str,
        pickup_address: &str,
        pickup_slot: Option<DateTime<Utc>>,
    ) -> Result<Listing> {
        self.client
            .post(
                "/listings",
                &serde_json::json!({
                    "quoteId": quote_id,
                    "pickupAddress": pickup_address,
                    "pickupSlot": pickup_slot,
                }),
            )
            .await
    }

    /// The authenticated customer's own listings.
    pub async fn mine(&self) -> Result<Vec<Listing>> {
        self.client.get("/listings").await
    }

    pub async fn get(&self, listing_id: &str) -> Result<Listing> {
        self.client.get(&format!("/listings/{}", listing_id)).await
    }

    pub async fn cancel(&self, listing_id: &str) -> Result<()> {
        self.client
            .post_unit(&format!("/listings/{}/cancel", listing_id), &serde_json::json!({}))
            .await
    }

    pub async fn reschedule(
        &self,
        listing_id: &str,
        pickup_slot: DateTime<Utc>,
    ) -> Result<Listing> {
        self.client
            .patch(
                &format!("/listings/{}", listing_id),
                &serde_json::json!({ "pickupSlot": pickup_slot }),
            )
            .await
    }
}
