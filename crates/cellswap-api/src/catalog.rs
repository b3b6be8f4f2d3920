//! Catalog browsing and price quotes
//!
//! The only cached resource: brand/model/question reads go through a
//! durable TTL cache, and model suggestions additionally sit in a moka
//! in-memory cache for the autocomplete hot path.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use serde::Serialize;
use tracing::debug;

use cellswap_client::{ApiClient, Result};
use ttl_kv_cache::{Storage, TtlCache};

use crate::types::{Brand, ConditionQuestion, DeviceModel, PriceQuote};

const SUGGEST_CACHE_CAPACITY: u64 = 1_000;
const SUGGEST_CACHE_TTL_SECS: u64 = 300;
const SUGGEST_LIMIT: u32 = 10;

/// One answer in the condition assessment, sent when requesting a quote.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteAnswer {
    pub question_id: String,
    pub option_id: String,
}

pub struct CatalogService<S: Storage> {
    client: Arc<ApiClient>,
    cache: TtlCache<S>,
    suggest_cache: Cache<String, Arc<Vec<DeviceModel>>>,
}

impl<S: Storage> CatalogService<S> {
    /// The durable cache should be namespaced to the catalog (e.g.
    /// `TtlCache::new(storage, "catalog", ttl)`) so `invalidate` cannot
    /// touch other tenants of the same storage.
    pub fn new(client: Arc<ApiClient>, cache: TtlCache<S>) -> Self {
        let suggest_cache = Cache::builder()
            .max_capacity(SUGGEST_CACHE_CAPACITY)
            .time_to_live(Duration::from_secs(SUGGEST_CACHE_TTL_SECS))
            .build();

        Self {
            client,
            cache,
            suggest_cache,
        }
    }

    pub async fn brands(&self) -> Result<Vec<Brand>> {
        if let Some(cached) = self.cache.get::<Vec<Brand>>("brands") {
            debug!("brands served from cache");
            return Ok(cached);
        }
        let brands: Vec<Brand> = self.client.get("/catalog/brands").await?;
        self.cache.set("brands", &brands, None);
        Ok(brands)
    }

    pub async fn models(&self, brand_id: &str) -> Result<Vec<DeviceModel>> {
        let key = format!("models:{}", brand_id);
        if let Some(cached) = self.cache.get::<Vec<DeviceModel>>(&key) {
            debug!(brand_id, "models served from cache");
            return Ok(cached);
        }
        let models: Vec<DeviceModel> = self
            .client
            .get(&format!("/catalog/brands/{}/models", brand_id))
            .await?;
        self.cache.set(&key, &models, None);
        Ok(models)
    }

    /// The condition question set for a model, answered by the customer to
    /// price the device.
    pub async fn questions(&self, model_id: &str) -> Result<Vec<ConditionQuestion>> {
        let key = format!("questions:{}", model_id);
        if let Some(cached) = self.cache.get::<Vec<ConditionQuestion>>(&key) {
            return Ok(cached);
        }
        let questions: Vec<ConditionQuestion> = self
            .client
            .get(&format!("/catalog/models/{}/questions", model_id))
            .await?;
        self.cache.set(&key, &questions, None);
        Ok(questions)
    }

    /// Model autocomplete, memoized in memory per normalized query.
    pub async fn suggest(&self, query: &str) -> Result<Arc<Vec<DeviceModel>>> {
        let key = query.trim().to_lowercase();
        if let Some(hit) = self.suggest_cache.get(&key).await {
            return Ok(hit);
        }
        let models: Vec<DeviceModel> = self
            .client
            .get(&format!(
                "/catalog/models/suggest?q={}&limit={}",
                urlencoding::encode(&key),
                SUGGEST_LIMIT
            ))
            .await?;
        let models = Arc::new(models);
        self.suggest_cache.insert(key, models.clone()).await;
        Ok(models)
    }

    /// Price a model for the answered condition. Never cached: quotes are
    /// short-lived and priced server-side.
    pub async fn quote(&self, model_id: &str, answers: &[QuoteAnswer]) -> Result<PriceQuote> {
        self.client
            .post(
                "/catalog/quote",
                &serde_json::json!({ "modelId": model_id, "answers": answers }),
            )
            .await
    }

    /// Drop everything cached, durable and in-memory.
    pub fn invalidate(&self) {
        self.cache.clear();
        self.suggest_cache.invalidate_all();
    }
}
