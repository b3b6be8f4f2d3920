//! Presigned media uploads
//!
//! Two-step flow: ask the backend to presign an upload slot, then PUT the
//! bytes straight to the returned URL. The PUT goes through a plain
//! reqwest client with no bearer — presigned URLs are self-authorizing.

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

use cellswap_client::{ApiClient, ApiError, Result};

const UPLOAD_TIMEOUT_SECS: u64 = 120;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PresignedUpload {
    pub upload_url: String,
    pub object_key: String,
}

pub struct MediaService {
    client: Arc<ApiClient>,
    uploader: reqwest::Client,
}

impl MediaService {
    pub fn new(client: Arc<ApiClient>) -> Self {
        let uploader = reqwest::Client::builder()
            .timeout(Duration::from_secs(UPLOAD_TIMEOUT_SECS))
            .build()
            .expect("Failed to create HTTP client");

        Self { client, uploader }
    }

    /// Reserve an upload slot. `purpose` scopes the object key server-side
    /// (`"kyc"`, `"device_photo"`, `"dispute_evidence"`).
    pub async fn presign(&self, content_type: &str, purpose: &str) -> Result<PresignedUpload> {
        self.client
            .post(
                "/media/presign",
                &serde_json::json!({ "contentType": content_type, "purpose": purpose }),
            )
            .await
    }

    /// PUT the bytes to the presigned URL. Returns the object key to embed
    /// in whatever record references the media.
    pub async fn upload(
        &self,
        presigned: &PresignedUpload,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> Result<String> {
        let size = bytes.len();
        let response = self
            .uploader
            .put(&presigned.upload_url)
            .header("Content-Type", content_type)
            .body(bytes)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::Status {
                status: status.as_u16(),
                message: format!("upload rejected for {}", presigned.object_key),
            });
        }

        debug!(key = %presigned.object_key, size, "media uploaded");
        Ok(presigned.object_key.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Bytes;
    use axum::extract::{Path, State};
    use axum::http::HeaderMap;
    use axum::routing::{post, put};
    use axum::{Json, Router};
    use cellswap_client::{Config, MemoryTokenStore};
    use serde_json::{json, Value};
    use std::collections::HashMap;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Blobs {
        stored: Mutex<HashMap<String, (String, Vec<u8>)>>,
    }

    async fn put_blob(
        State(blobs): State<Arc<Blobs>>,
        Path(key): Path<String>,
        headers: HeaderMap,
        body: Bytes,
    ) -> &'static str {
        let content_type = headers
            .get("content-type")
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_string();
        blobs
            .stored
            .lock()
            .unwrap()
            .insert(key, (content_type, body.to_vec()));
        "ok"
    }

    async fn spawn(blobs: Arc<Blobs>) -> String {
        async fn presign_stub(Json(body): Json<Value>) -> Json<Value> {
            assert_eq!(body["purpose"], "kyc");
            Json(json!({
                "uploadUrl": "replaced-by-test",
                "objectKey": "kyc/u-42/front.jpg"
            }))
        }
        let app = Router::new()
            .route("/media/presign", post(presign_stub))
            .route("/blob/{key}", put(put_blob))
            .with_state(blobs);
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move { axum::serve(listener, app).await.unwrap() });
        format!("http://{}", addr)
    }

    fn service(base_url: &str) -> MediaService {
        MediaService::new(Arc::new(ApiClient::new(
            &Config::new(base_url),
            Arc::new(MemoryTokenStore::new()),
        )))
    }

    #[tokio::test]
    async fn test_presign_then_upload() {
        let blobs = Arc::new(Blobs::default());
        let base = spawn(blobs.clone()).await;
        let service = service(&base);

        let mut presigned = service.presign("image/jpeg", "kyc").await.unwrap();
        assert_eq!(presigned.object_key, "kyc/u-42/front.jpg");
        // The stub backend cannot know its own port; point the upload URL
        // at the test server's blob route.
        presigned.upload_url = format!("{}/blob/front.jpg", base);

        let key = service
            .upload(&presigned, "image/jpeg", b"jpegbytes".to_vec())
            .await
            .unwrap();
        assert_eq!(key, "kyc/u-42/front.jpg");

        let stored = blobs.stored.lock().unwrap();
        let (content_type, bytes) = stored.get("front.jpg").unwrap();
        assert_eq!(content_type, "image/jpeg");
        assert_eq!(bytes, b"jpegbytes");
    }

    #[tokio::test]
    async fn test_upload_rejection_surfaces_status() {
        let blobs = Arc::new(Blobs::default());
        let base = spawn(blobs).await;
        let service = service(&base);

        let presigned = PresignedUpload {
            // No route answers PUTs here, so the server 405s.
            upload_url: format!("{}/media/presign", base),
            object_key: "k".to_string(),
        };
        let err = service
            .upload(&presigned, "image/jpeg", vec![1])
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Status { .. }));
    }
}
