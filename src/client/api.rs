//! Client for the verifier API

use crate::core::error::{Result, VeristoreError};
use crate::core::types::Hash;
use crate::wire::{
    AttestRequest, AttestResponse, BucketRequest, BucketResponse, DownloadInfoResponse,
    PingResponse,
};
use std::time::Duration;

/// Default deadline for unary verifier calls
pub const DEFAULT_RPC_TIMEOUT: Duration = Duration::from_secs(1);

/// Thin reqwest wrapper over the verifier API
#[derive(Debug, Clone)]
pub struct VerifierApiClient {
    base_url: String,
    client: reqwest::Client,
    timeout: Duration,
}

impl VerifierApiClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_timeout(base_url, DEFAULT_RPC_TIMEOUT)
    }

    pub fn with_timeout(base_url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
            timeout,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Ask the verifier for the bucket to upload a fileset into
    pub async fn allocate_bucket(&self, tenant_id: &str, fileset_id: &str) -> Result<String> {
        let url = format!("{}/v1/buckets", self.base_url);
        let req = BucketRequest {
            tenant_id: tenant_id.to_string(),
            fileset_id: fileset_id.to_string(),
        };

        let resp = self
            .client
            .post(&url)
            .timeout(self.timeout)
            .json(&req)
            .send()
            .await
            .map_err(|e| VeristoreError::transport("bucket allocation", e))?;
        let resp = check_status("bucket allocation", resp).await?;

        let body: BucketResponse = resp
            .json()
            .await
            .map_err(|e| VeristoreError::transport("bucket allocation", e))?;
        Ok(body.bucket_id)
    }

    /// Report the client root and ask the verifier to attest the upload
    pub async fn attest_upload(
        &self,
        tenant_id: &str,
        fileset_id: &str,
        mt_root: Hash,
    ) -> Result<AttestResponse> {
        let url = format!("{}/v1/attest", self.base_url);
        let req = AttestRequest {
            tenant_id: tenant_id.to_string(),
            fileset_id: fileset_id.to_string(),
            mt_root,
        };

        let resp = self
            .client
            .post(&url)
            .timeout(self.timeout)
            .json(&req)
            .send()
            .await
            .map_err(|e| VeristoreError::transport("upload attestation", e))?;
        let resp = check_status("upload attestation", resp).await?;

        resp.json()
            .await
            .map_err(|e| VeristoreError::transport("upload attestation", e))
    }

    /// Fetch the bucket id and inclusion proof needed to download one file
    pub async fn download_info(
        &self,
        tenant_id: &str,
        fileset_id: &str,
        file_index: usize,
    ) -> Result<DownloadInfoResponse> {
        let url = format!("{}/v1/download-info", self.base_url);
        let index = file_index.to_string();
        let resp = self
            .client
            .get(&url)
            .timeout(self.timeout)
            .query(&[
                ("tenant_id", tenant_id),
                ("fileset_id", fileset_id),
                ("file_index", index.as_str()),
            ])
            .send()
            .await
            .map_err(|e| VeristoreError::transport("download info", e))?;
        let resp = check_status("download info", resp).await?;

        resp.json()
            .await
            .map_err(|e| VeristoreError::transport("download info", e))
    }

    /// Liveness probe
    pub async fn ping(&self, name: &str) -> Result<String> {
        let url = format!("{}/v1/ping", self.base_url);
        let resp = self
            .client
            .get(&url)
            .timeout(self.timeout)
            .query(&[("name", name)])
            .send()
            .await
            .map_err(|e| VeristoreError::transport("ping", e))?;
        let resp = check_status("ping", resp).await?;

        let body: PingResponse = resp
            .json()
            .await
            .map_err(|e| VeristoreError::transport("ping", e))?;
        Ok(body.message)
    }
}

/// Turn a non-success HTTP response into the matching error kind, keeping
/// the server's message in the chain
pub(crate) async fn check_status(
    operation: &str,
    resp: reqwest::Response,
) -> Result<reqwest::Response> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }

    let message = match resp.text().await {
        Ok(body) if !body.is_empty() => body,
        _ => status.to_string(),
    };
    Err(VeristoreError::RemoteRejected {
        operation: operation.to_string(),
        status: status.as_u16(),
        message,
    })
}
