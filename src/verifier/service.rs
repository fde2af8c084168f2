//! Verifier service: bucket allocation, upload attestation, download info
//!
//! Attestation is the only write point for the proof store. Handlers share
//! no mutable state beyond the store handle and the downstream storage
//! client; single-key store writes are last-write-wins.

use crate::core::error::{Result, VeristoreError};
use crate::merkle::{MerkleTree, Proof, TreeConfig, TreeMode};
use crate::proofstore::{proofs_key, ProofStore};
use crate::verifier::fsclient::StorageApiClient;
use crate::wire::{
    AttestRequest, AttestResponse, BucketRequest, BucketResponse, DownloadInfoQuery,
    DownloadInfoResponse, PingQuery, PingResponse, STATUS_INTERNAL, STATUS_MATCH, STATUS_MISMATCH,
};
use axum::extract::{Query, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info};

/// Shared state of the verifier service
pub struct VerifierState {
    pub store: Arc<dyn ProofStore>,
    pub fs: StorageApiClient,
    /// TTL applied to persisted proof records, `None` = unbounded
    pub proof_ttl: Option<Duration>,
}

impl VerifierState {
    pub fn new(store: Arc<dyn ProofStore>, fs: StorageApiClient) -> Self {
        Self {
            store,
            fs,
            proof_ttl: None,
        }
    }
}

/// Build the verifier API router
pub fn router(state: Arc<VerifierState>) -> Router {
    Router::new()
        .route("/v1/buckets", post(allocate_bucket))
        .route("/v1/attest", post(attest_upload))
        .route("/v1/download-info", get(download_info))
        .route("/v1/ping", get(ping))
        .with_state(state)
}

/// Compute a bucket identifier; allocation has no side effects, the bucket
/// directory materializes on the first upload chunk
pub fn compute_bucket_id(tenant_id: &str, fileset_id: &str) -> String {
    format!("{tenant_id}_{fileset_id}")
}

async fn allocate_bucket(
    State(_state): State<Arc<VerifierState>>,
    Json(req): Json<BucketRequest>,
) -> Json<BucketResponse> {
    debug!(tenant = %req.tenant_id, fileset = %req.fileset_id, "bucket requested");
    Json(BucketResponse {
        bucket_id: compute_bucket_id(&req.tenant_id, &req.fileset_id),
    })
}

/// Recompute the fileset root from the storage-side hashes and compare it
/// to the client's. Proofs are persisted only when the roots match; a
/// mismatch purges any record left by an earlier attestation.
async fn attest_upload(
    State(state): State<Arc<VerifierState>>,
    Json(req): Json<AttestRequest>,
) -> Json<AttestResponse> {
    info!(tenant = %req.tenant_id, fileset = %req.fileset_id, "attestation requested");
    match attest_inner(&state, &req).await {
        Ok(resp) => Json(resp),
        Err(e) => {
            error!(fileset = %req.fileset_id, error = %e, "attestation failed");
            Json(AttestResponse {
                status: STATUS_INTERNAL,
                message: format!("attestation failed for fileset '{}': {e}", req.fileset_id),
            })
        }
    }
}

async fn attest_inner(state: &VerifierState, req: &AttestRequest) -> Result<AttestResponse> {
    let bucket_id = compute_bucket_id(&req.tenant_id, &req.fileset_id);
    let leaves = state.fs.list_hashes(&bucket_id).await?;
    debug!(bucket = %bucket_id, leaves = leaves.len(), "storage hashes retrieved");

    let config = TreeConfig::fileset(TreeMode::RootAndProofs);
    let tree = MerkleTree::build(&config, &leaves)?;

    let key = proofs_key(&req.tenant_id, &req.fileset_id);
    if tree.root() != req.mt_root.as_bytes() {
        // A stale record from a previous successful attestation must not
        // outlive a failed one.
        state.store.remove(&key)?;
        info!(
            bucket = %bucket_id,
            computed = %hex::encode(tree.root()),
            "merkle roots differ"
        );
        return Ok(AttestResponse {
            status: STATUS_MISMATCH,
            message: format!(
                "merkle roots differ for fileset '{}' (bucket '{bucket_id}'): computed {}",
                req.fileset_id,
                hex::encode(tree.root())
            ),
        });
    }

    let encoded = serde_json::to_vec(tree.proofs())?;
    state.store.set(&key, encoded, state.proof_ttl)?;
    info!(
        bucket = %bucket_id,
        proofs = tree.proofs().len(),
        "roots match, proofs persisted"
    );

    Ok(AttestResponse {
        status: STATUS_MATCH,
        message: "merkle roots match - fileset upload verified".to_string(),
    })
}

/// Return the bucket id and the requested leaf's inclusion proof
async fn download_info(
    State(state): State<Arc<VerifierState>>,
    Query(query): Query<DownloadInfoQuery>,
) -> Result<Json<DownloadInfoResponse>> {
    info!(
        tenant = %query.tenant_id,
        fileset = %query.fileset_id,
        index = query.file_index,
        "download info requested"
    );
    if query.file_index < 0 {
        return Err(VeristoreError::InvalidFileIndex {
            index: query.file_index,
        });
    }

    let key = proofs_key(&query.tenant_id, &query.fileset_id);
    let bytes = state
        .store
        .get(&key)?
        .ok_or_else(|| VeristoreError::ProofsNotFound { key: key.clone() })?;

    let proofs: Vec<Proof> =
        serde_json::from_slice(&bytes).map_err(|e| VeristoreError::ProofRecordCorrupt {
            key: key.clone(),
            reason: e.to_string(),
        })?;

    let index = query.file_index as usize;
    let proof = proofs
        .get(index)
        .cloned()
        .ok_or(VeristoreError::ProofIndexOutOfRange {
            index,
            count: proofs.len(),
        })?;

    Ok(Json(DownloadInfoResponse {
        bucket_id: compute_bucket_id(&query.tenant_id, &query.fileset_id),
        proof,
    }))
}

/// Liveness probe
async fn ping(Query(query): Query<PingQuery>) -> Json<PingResponse> {
    let name = query.name.as_deref().unwrap_or("anonymous");
    Json(PingResponse {
        message: format!("Hello {name}"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bucket_id_format() {
        assert_eq!(compute_bucket_id("t1", "fs-00ff"), "t1_fs-00ff");
    }
}
