//! Client for the downstream storage service's hash listing

use crate::core::error::{Result, VeristoreError};
use crate::core::types::LeafHash;
use crate::wire::ListHashesResponse;
use std::time::Duration;

/// Default deadline for the attestation fan-out to the storage service
pub const DEFAULT_LIST_TIMEOUT: Duration = Duration::from_secs(1);

/// Thin reqwest wrapper over the storage API
#[derive(Debug, Clone)]
pub struct StorageApiClient {
    base_url: String,
    client: reqwest::Client,
    list_timeout: Duration,
}

impl StorageApiClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_timeout(base_url, DEFAULT_LIST_TIMEOUT)
    }

    pub fn with_timeout(base_url: impl Into<String>, list_timeout: Duration) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            base_url,
            client: reqwest::Client::new(),
            list_timeout,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Fetch the bucket's per-file leaf hashes, lexical order
    pub async fn list_hashes(&self, bucket_id: &str) -> Result<Vec<LeafHash>> {
        let url = format!("{}/v1/buckets/{bucket_id}/hashes", self.base_url);
        let resp = self
            .client
            .get(&url)
            .timeout(self.list_timeout)
            .send()
            .await
            .map_err(|e| VeristoreError::transport("storage hash listing", e))?;

        if !resp.status().is_success() {
            return Err(VeristoreError::internal(format!(
                "storage hash listing for bucket '{bucket_id}' returned {}",
                resp.status()
            )));
        }

        let body: ListHashesResponse = resp
            .json()
            .await
            .map_err(|e| VeristoreError::transport("storage hash listing", e))?;
        Ok(body.file_hashes)
    }
}
