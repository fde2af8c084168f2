//! Error types for Veristore

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use std::path::PathBuf;
use thiserror::Error;

/// Main error type for Veristore operations
#[derive(Error, Debug)]
pub enum VeristoreError {
    /// Input validation errors
    #[error("No files found under directory: {path}")]
    EmptyFileset { path: PathBuf },

    #[error("Fileset needs at least two files, found {count} under {path}")]
    FilesetTooSmall { count: usize, path: PathBuf },

    #[error("Invalid fileset id: {id}")]
    InvalidFilesetId { id: String },

    #[error("Invalid bucket id: {bucket_id}")]
    InvalidBucketId { bucket_id: String },

    #[error("Invalid file name: {file_name}")]
    InvalidFileName { file_name: String },

    #[error("Invalid chunk size: {size} (minimum {min})")]
    InvalidChunkSize { size: usize, min: usize },

    #[error("Invalid upload concurrency: {workers} (must be >= 1)")]
    InvalidConcurrency { workers: usize },

    #[error("Invalid file index: {index}")]
    InvalidFileIndex { index: i64 },

    #[error("Merkle tree needs at least two leaves, got {count}")]
    TooFewLeaves { count: usize },

    #[error("Merkle proof has no siblings")]
    EmptyProof,

    #[error("Leaf serialization failed: {reason}")]
    LeafSerialization { reason: String },

    #[error("Upload frame of {size} bytes exceeds the {max} byte limit")]
    FrameTooLarge { size: usize, max: usize },

    /// Not-found errors
    #[error("Bucket not found: {bucket_id}")]
    BucketNotFound { bucket_id: String },

    #[error("File index {index} out of range for bucket with {count} files")]
    FileIndexOutOfRange { index: usize, count: usize },

    #[error("Proof index {index} out of range for fileset with {count} proofs")]
    ProofIndexOutOfRange { index: usize, count: usize },

    #[error("No proofs recorded under key: {key}")]
    ProofsNotFound { key: String },

    /// Integrity errors
    #[error("Merkle roots differ: computed {computed}, client sent {submitted}")]
    RootMismatch { computed: String, submitted: String },

    #[error("Attestation rejected fileset '{fileset_id}': {message}")]
    AttestationMismatch { fileset_id: String, message: String },

    #[error("Downloaded file failed proof verification: {path}")]
    VerificationFailed { path: PathBuf },

    /// Data-loss errors
    #[error("Proof record under key {key} is undecodable: {reason}")]
    ProofRecordCorrupt { key: String, reason: String },

    /// Transport errors
    #[error("{operation} timed out")]
    DeadlineExceeded { operation: String },

    #[error("{operation} was canceled")]
    Canceled { operation: String },

    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("{operation} rejected with HTTP {status}: {message}")]
    RemoteRejected {
        operation: String,
        status: u16,
        message: String,
    },

    #[error("Unexpected attestation status {status}: {message}")]
    UnexpectedAttestStatus { status: i32, message: String },

    /// Internal errors
    #[error("Upload stream changed identity: started as {started}, then saw {seen}")]
    UploadIdentityChanged { started: String, seen: String },

    #[error("Hash function failed: {reason}")]
    HashFailure { reason: String },

    #[error("Merkle tree construction failed: {reason}")]
    MerkleTreeFailed { reason: String },

    #[error("Configuration error: {reason}")]
    ConfigurationError { reason: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] bincode::Error),

    #[error("JSON serialization error: {0}")]
    JsonSerialization(#[from] serde_json::Error),

    #[error("Hex encoding error: {0}")]
    HexError(#[from] hex::FromHexError),

    #[error("Internal error: {message}")]
    Internal { message: String },
}

/// Coarse taxonomy a variant belongs to; services map these onto status
/// codes uniformly
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    InvalidInput,
    NotFound,
    FailedPrecondition,
    Integrity,
    DataLoss,
    Transport,
    Internal,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::InvalidInput => "invalid_input",
            ErrorKind::NotFound => "not_found",
            ErrorKind::FailedPrecondition => "failed_precondition",
            ErrorKind::Integrity => "integrity",
            ErrorKind::DataLoss => "data_loss",
            ErrorKind::Transport => "transport",
            ErrorKind::Internal => "internal",
        }
    }
}

impl VeristoreError {
    /// Create a new internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Create a new invalid fileset id error
    pub fn invalid_fileset_id(id: impl Into<String>) -> Self {
        Self::InvalidFilesetId { id: id.into() }
    }

    /// Create a new bucket not found error
    pub fn bucket_not_found(bucket_id: impl Into<String>) -> Self {
        Self::BucketNotFound {
            bucket_id: bucket_id.into(),
        }
    }

    /// Create a new configuration error
    pub fn configuration(reason: impl Into<String>) -> Self {
        Self::ConfigurationError {
            reason: reason.into(),
        }
    }

    /// Create a new hash failure error
    pub fn hash_failure(reason: impl Into<String>) -> Self {
        Self::HashFailure {
            reason: reason.into(),
        }
    }

    /// Create a new merkle tree failure error
    pub fn merkle_tree_failed(reason: impl Into<String>) -> Self {
        Self::MerkleTreeFailed {
            reason: reason.into(),
        }
    }

    /// Wrap a reqwest error, surfacing deadline expiry as its own kind
    pub fn transport(operation: impl Into<String>, err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::DeadlineExceeded {
                operation: operation.into(),
            }
        } else {
            Self::Transport(err)
        }
    }

    /// The taxonomy bucket this error falls into
    pub fn kind(&self) -> ErrorKind {
        use VeristoreError::*;
        match self {
            EmptyFileset { .. }
            | FilesetTooSmall { .. }
            | InvalidFilesetId { .. }
            | InvalidBucketId { .. }
            | InvalidFileName { .. }
            | InvalidChunkSize { .. }
            | InvalidConcurrency { .. }
            | InvalidFileIndex { .. }
            | TooFewLeaves { .. }
            | EmptyProof
            | LeafSerialization { .. }
            | FrameTooLarge { .. }
            | ProofIndexOutOfRange { .. }
            | HexError(_)
            | ConfigurationError { .. } => ErrorKind::InvalidInput,

            BucketNotFound { .. } | FileIndexOutOfRange { .. } => ErrorKind::NotFound,

            ProofsNotFound { .. } => ErrorKind::FailedPrecondition,

            RootMismatch { .. } | AttestationMismatch { .. } | VerificationFailed { .. } => {
                ErrorKind::Integrity
            }

            ProofRecordCorrupt { .. } => ErrorKind::DataLoss,

            DeadlineExceeded { .. } | Canceled { .. } | Transport(_) => ErrorKind::Transport,

            RemoteRejected { status, .. } => match *status {
                400 => ErrorKind::InvalidInput,
                404 => ErrorKind::NotFound,
                412 => ErrorKind::FailedPrecondition,
                419 => ErrorKind::Integrity,
                _ => ErrorKind::Internal,
            },

            UnexpectedAttestStatus { .. }
            | UploadIdentityChanged { .. }
            | HashFailure { .. }
            | MerkleTreeFailed { .. }
            | Io(_)
            | Serialization(_)
            | JsonSerialization(_)
            | Internal { .. } => ErrorKind::Internal,
        }
    }

    fn status_code(&self) -> StatusCode {
        match self.kind() {
            ErrorKind::InvalidInput => StatusCode::BAD_REQUEST,
            ErrorKind::NotFound => StatusCode::NOT_FOUND,
            ErrorKind::FailedPrecondition => StatusCode::PRECONDITION_FAILED,
            ErrorKind::Integrity => {
                StatusCode::from_u16(419).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
            }
            ErrorKind::DataLoss | ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
            ErrorKind::Transport => StatusCode::BAD_GATEWAY,
        }
    }
}

impl IntoResponse for VeristoreError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = Json(json!({
            "kind": self.kind().as_str(),
            "error": self.to_string(),
        }));
        (status, body).into_response()
    }
}

/// Result type alias for Veristore operations
pub type Result<T> = std::result::Result<T, VeristoreError>;
