//! Veristore - verifiable remote file storage
//!
//! A client uploads a set of files (a *fileset*) to an untrusted storage
//! service and later downloads any single file with a cryptographic proof
//! that the returned bytes are identical to what was uploaded. Integrity is
//! rooted in a Merkle tree over the per-file content hashes: the client
//! keeps only the root (encoded in the fileset identifier) while the
//! verifier service keeps the per-leaf inclusion proofs.
//!
//! # Components
//!
//! - [`merkle`] — parallel tree builder, inclusion proofs, stateless
//!   verification
//! - [`fileset`] — deterministic directory enumeration and leaf derivation
//! - [`storage`] — bucket-addressed file service (streamed upload/download)
//! - [`verifier`] — attestation service persisting proofs on root match
//! - [`client`] — upload and download workflows gluing it all together
//!
//! # Example
//!
//! ```rust,no_run
//! use veristore::merkle::{MerkleTree, TreeConfig, TreeMode, RawBlock, verify};
//!
//! let config = TreeConfig::fileset(TreeMode::RootAndProofs);
//! let leaves: Vec<RawBlock> = (0u8..4)
//!     .map(|i| RawBlock::new(vec![i; 32]))
//!     .collect();
//!
//! let tree = MerkleTree::build(&config, &leaves)?;
//! let proof = tree.proof(2)?;
//! assert!(verify(&config, &leaves[2], &proof, tree.root())?);
//! # Ok::<(), veristore::VeristoreError>(())
//! ```

pub mod cli;
pub mod client;
pub mod config;
pub mod core;
pub mod fileset;
pub mod merkle;
pub mod proofstore;
pub mod storage;
pub mod verifier;
pub mod wire;

// Re-export commonly used types
pub use self::core::{
    error::{ErrorKind, Result, VeristoreError},
    types::{BucketId, Hash, LeafHash, RootHash, TenantId},
};

pub use merkle::{MerkleTree, Proof, TreeConfig, TreeMode};

pub use client::{ClientContext, FileTransferClient, VerifierApiClient};

/// Current version of Veristore
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
