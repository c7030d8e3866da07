//! # REST Remote Store
//!
//! [`RemoteStore`] adapter over the ParkPin location API.
//!
//! ## Endpoints
//! ```text
//! GET    {base}/users/{id}/locations            list
//! POST   {base}/users/{id}/locations            create → record with id
//! PATCH  {base}/users/{id}/locations/{rec}      partial update
//! DELETE {base}/users/{id}/locations/{rec}      delete (404 treated as done)
//! ```

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use reqwest::StatusCode;
use std::time::Duration;
use tracing::debug;

use async_trait::async_trait;

use crate::config::SyncConfig;
use crate::error::{SyncError, SyncResult};
use crate::remote::{RecordDraft, RecordPatch, RemoteRecord, RemoteStore};

/// REST adapter for the remote location collection.
#[derive(Debug, Clone)]
pub struct RestRemoteStore {
    client: reqwest::Client,
    base_url: String,
}

impl RestRemoteStore {
    /// Creates a REST remote store from the sync configuration.
    ///
    /// ## Errors
    /// - [`SyncError::InvalidConfig`] when no remote base URL is configured
    /// - [`SyncError::ConnectionFailed`] when the HTTP client fails to build
    pub fn new(config: &SyncConfig) -> SyncResult<Self> {
        let base_url = config
            .remote_url()
            .ok_or_else(|| SyncError::InvalidConfig("Remote base URL not configured".into()))?
            .trim_end_matches('/')
            .to_string();

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .connect_timeout(Duration::from_secs(config.remote.connect_timeout_secs))
            .timeout(Duration::from_secs(config.remote.request_timeout_secs))
            .build()?;

        Ok(RestRemoteStore { client, base_url })
    }

    /// URL of a user's location collection.
    fn collection_url(&self, user_id: &str) -> String {
        format!("{}/users/{}/locations", self.base_url, user_id)
    }

    /// URL of a single record.
    fn record_url(&self, user_id: &str, record_id: &str) -> String {
        format!("{}/{}", self.collection_url(user_id), record_id)
    }

    /// Handles a JSON response, mapping error statuses to typed errors.
    async fn handle_response<T: serde::de::DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> SyncResult<T> {
        let status = response.status();

        if status.is_success() {
            return response
                .json()
                .await
                .map_err(|e| SyncError::DeserializationFailed(e.to_string()));
        }

        Err(Self::parse_error(response).await)
    }

    /// Maps an error response to a typed error.
    async fn parse_error(response: reqwest::Response) -> SyncError {
        let status = response.status();

        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return SyncError::Unauthorized;
        }

        if status == StatusCode::NOT_FOUND {
            return SyncError::RecordNotFound(response.url().path().to_string());
        }

        let message = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());

        SyncError::RemoteRejected {
            status: status.as_u16(),
            message,
        }
    }
}

#[async_trait]
impl RemoteStore for RestRemoteStore {
    async fn list(&self, user_id: &str) -> SyncResult<Vec<RemoteRecord>> {
        let url = self.collection_url(user_id);
        debug!(%url, "Listing remote records");

        let response = self.client.get(&url).send().await?;
        self.handle_response(response).await
    }

    async fn create(&self, user_id: &str, draft: &RecordDraft) -> SyncResult<RemoteRecord> {
        let url = self.collection_url(user_id);
        debug!(%url, category = %draft.category, "Creating remote record");

        let response = self.client.post(&url).json(draft).send().await?;
        self.handle_response(response).await
    }

    async fn update(&self, user_id: &str, record_id: &str, patch: &RecordPatch) -> SyncResult<()> {
        let url = self.record_url(user_id, record_id);
        debug!(%url, "Updating remote record");

        let response = self.client.patch(&url).json(patch).send().await?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }

        Err(Self::parse_error(response).await)
    }

    async fn delete(&self, user_id: &str, record_id: &str) -> SyncResult<()> {
        let url = self.record_url(user_id, record_id);
        debug!(%url, "Deleting remote record");

        let response = self.client.delete(&url).send().await?;

        let status = response.status();
        // Already gone counts as deleted
        if status.is_success() || status == StatusCode::NOT_FOUND {
            return Ok(());
        }

        Err(Self::parse_error(response).await)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn configured() -> SyncConfig {
        let mut config = SyncConfig::default();
        config.remote.base_url = Some("https://api.parkpin.example/v1/".to_string());
        config
    }

    #[test]
    fn test_requires_base_url() {
        let err = RestRemoteStore::new(&SyncConfig::default()).unwrap_err();
        assert!(err.is_config_error());
    }

    #[test]
    fn test_url_construction_trims_trailing_slash() {
        let store = RestRemoteStore::new(&configured()).unwrap();
        assert_eq!(
            store.collection_url("user-abc"),
            "https://api.parkpin.example/v1/users/user-abc/locations"
        );
        assert_eq!(
            store.record_url("user-abc", "rec-0001"),
            "https://api.parkpin.example/v1/users/user-abc/locations/rec-0001"
        );
    }
}
