//! Opaque key→bytes store with expiry, used to persist inclusion proofs
//!
//! Attestation is the only writer; downloads read. Single-key writes are
//! last-write-wins and keys never collide across tenants because the tenant
//! id is part of the key.

pub mod disk;
pub mod memory;

use crate::core::error::Result;
use std::time::Duration;

pub use disk::DiskProofStore;
pub use memory::MemoryProofStore;

/// Suffix of every proof record key
pub const PROOFS_KEY_SUFFIX: &str = "_mtproofs";

/// Compute the proof record key for a fileset
pub fn proofs_key(tenant_id: &str, fileset_id: &str) -> String {
    format!("{tenant_id}_{fileset_id}{PROOFS_KEY_SUFFIX}")
}

/// Opaque byte map with optional per-entry TTL
pub trait ProofStore: Send + Sync {
    /// Store a value under the key, overwriting any previous value.
    /// `ttl = None` means the entry never expires.
    fn set(&self, key: &str, value: Vec<u8>, ttl: Option<Duration>) -> Result<()>;

    /// Fetch the value under the key, `None` when absent or expired
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;

    /// Remove the entry under the key, if any
    fn remove(&self, key: &str) -> Result<()>;
}
