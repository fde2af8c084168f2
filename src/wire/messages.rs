//! Logical request/response payloads shared by services and clients

use crate::core::types::Hash;
use crate::merkle::Proof;
use serde::{Deserialize, Serialize};

/// Download metadata header: file name
pub const HEADER_FILE_NAME: &str = "file-name";
/// Download metadata header: file extension
pub const HEADER_FILE_TYPE: &str = "file-type";
/// Download metadata header: file size in bytes
pub const HEADER_FILE_SIZE: &str = "file-size";

/// Attestation outcome: roots match, proofs persisted
pub const STATUS_MATCH: i32 = 200;
/// Attestation outcome: roots differ, nothing persisted
pub const STATUS_MISMATCH: i32 = 419;
/// Attestation outcome: upstream or internal failure
pub const STATUS_INTERNAL: i32 = 500;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BucketRequest {
    pub tenant_id: String,
    pub fileset_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BucketResponse {
    pub bucket_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttestRequest {
    pub tenant_id: String,
    pub fileset_id: String,
    /// Client-computed Merkle root of the fileset
    pub mt_root: Hash,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttestResponse {
    pub status: i32,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DownloadInfoQuery {
    pub tenant_id: String,
    pub fileset_id: String,
    /// Signed so a negative index surfaces as invalid input, not a parse error
    pub file_index: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DownloadInfoResponse {
    pub bucket_id: String,
    pub proof: Proof,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PingQuery {
    pub name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PingResponse {
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListHashesResponse {
    /// Per-file leaves in lexical full-path order
    pub file_hashes: Vec<Hash>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadResponse {
    pub file_name: String,
    pub size: u64,
}
