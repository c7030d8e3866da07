//! # Photo Storage
//!
//! Upload of parking photos to durable storage.
//!
//! ## Two-Phase Photo Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Photo Attachment Phases                            │
//! │                                                                         │
//! │  PHASE 1 (always, instant)                                              │
//! │  ─────────────────────────                                              │
//! │  camera bytes ──► inline data URL ──► memory + cache                    │
//! │  The UI renders the photo immediately, online or not.                   │
//! │                                                                         │
//! │  PHASE 2 (online only, async)                                           │
//! │  ───────────────────────────                                            │
//! │  bytes ──► PhotoStore::upload ──► durable URL                           │
//! │                    │                                                    │
//! │                    ▼                                                    │
//! │  replace inline ref in memory + cache with the URL                      │
//! │                                                                         │
//! │  Upload failure: logged, the inline ref stays. No automatic retry —     │
//! │  the photo is still renderable and still cached.                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use parkpin_core::PhotoRef;

use crate::config::SyncConfig;
use crate::error::{SyncError, SyncResult};

// =============================================================================
// Photo Store Trait
// =============================================================================

/// Capability interface over remote photo storage.
#[async_trait]
pub trait PhotoStore: Send + Sync {
    /// Uploads raw image bytes, returning the durable URL.
    async fn upload(&self, user_id: &str, bytes: Vec<u8>, content_type: &str)
        -> SyncResult<String>;
}

// =============================================================================
// REST Photo Store
// =============================================================================

/// Response body of a photo upload.
#[derive(Debug, Deserialize)]
struct UploadResponse {
    url: String,
}

/// REST adapter for photo storage.
///
/// Uploads go to `{base}/users/{id}/photos` as a raw body with the image
/// content type; the response carries the durable URL.
#[derive(Debug, Clone)]
pub struct RestPhotoStore {
    client: reqwest::Client,
    base_url: String,
}

impl RestPhotoStore {
    /// Creates a REST photo store from the sync configuration.
    pub fn new(config: &SyncConfig) -> SyncResult<Self> {
        let base_url = config
            .photos_url()
            .ok_or_else(|| SyncError::InvalidConfig("Photo base URL not configured".into()))?
            .trim_end_matches('/')
            .to_string();

        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(config.remote.connect_timeout_secs))
            .timeout(Duration::from_secs(config.remote.request_timeout_secs))
            .build()?;

        Ok(RestPhotoStore { client, base_url })
    }

    fn upload_url(&self, user_id: &str) -> String {
        format!("{}/users/{}/photos", self.base_url, user_id)
    }
}

#[async_trait]
impl PhotoStore for RestPhotoStore {
    async fn upload(
        &self,
        user_id: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> SyncResult<String> {
        let url = self.upload_url(user_id);
        debug!(%url, size = bytes.len(), "Uploading photo");

        let response = self
            .client
            .post(&url)
            .header(reqwest::header::CONTENT_TYPE, content_type)
            .body(bytes)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(SyncError::UploadFailed(format!("{}: {}", status, message)));
        }

        let body: UploadResponse = response
            .json()
            .await
            .map_err(|e| SyncError::DeserializationFailed(e.to_string()))?;

        Ok(body.url)
    }
}

// =============================================================================
// In-Memory Photo Store
// =============================================================================

/// [`PhotoStore`] double that mints fake durable URLs. For tests.
#[derive(Debug, Default)]
pub struct MemoryPhotoStore {
    uploads: AtomicUsize,
    fail: AtomicBool,
}

impl MemoryPhotoStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every subsequent upload fail.
    pub fn set_failing(&self, failing: bool) {
        self.fail.store(failing, Ordering::SeqCst);
    }

    /// Number of uploads attempted so far.
    pub fn upload_count(&self) -> usize {
        self.uploads.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PhotoStore for MemoryPhotoStore {
    async fn upload(
        &self,
        user_id: &str,
        _bytes: Vec<u8>,
        _content_type: &str,
    ) -> SyncResult<String> {
        let n = self.uploads.fetch_add(1, Ordering::SeqCst) + 1;

        if self.fail.load(Ordering::SeqCst) {
            return Err(SyncError::UploadFailed("simulated outage".into()));
        }

        Ok(format!("https://photos.invalid/{}/{}.jpg", user_id, n))
    }
}

// =============================================================================
// Data URL Helpers
// =============================================================================

/// Builds the immediately renderable inline representation of a captured
/// photo. This is phase 1: it goes into memory and the cache before any
/// upload is attempted.
pub fn inline_photo(bytes: &[u8], content_type: &str) -> PhotoRef {
    use base64::engine::general_purpose::STANDARD;
    use base64::Engine as _;

    let encoded = STANDARD.encode(bytes);
    PhotoRef::Inline(format!("data:{};base64,{}", content_type, encoded))
}

// =============================================================================
// Unit Tests
// =============================================================================
