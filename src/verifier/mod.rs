//! Attestation service rooted on the Merkle engine

pub mod fsclient;
pub mod service;

pub use fsclient::{StorageApiClient, DEFAULT_LIST_TIMEOUT};
pub use service::{compute_bucket_id, router, VerifierState};
