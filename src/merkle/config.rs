//! Merkle tree construction configuration

use crate::core::hash::{default_hash_fn, HashFn};
use std::fmt;

/// What the builder retains beyond the root
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TreeMode {
    /// Root only, lowest memory
    RootOnly,
    /// Root plus one inclusion proof per leaf, in input order
    RootAndProofs,
    /// Root plus all internal node digests, proofs generated on demand
    FullTree,
}

/// Configuration shared by tree construction and proof verification.
///
/// Prover and verifier must agree on the hash function, the leaf-hashing
/// flag, and the sibling ordering mode; the two sibling modes are mutually
/// incompatible.
#[derive(Clone)]
pub struct TreeConfig {
    /// Digest function applied to leaves (when enabled) and node pairs
    pub hash_fn: HashFn,
    /// What to retain from the build
    pub mode: TreeMode,
    /// Hash leaf bytes before insertion; when disabled the serialized leaf
    /// bytes are used verbatim as the leaf digest
    pub hash_leaves: bool,
    /// Sort each sibling pair byte-lexicographically before combining,
    /// instead of positional left‖right concatenation
    pub sort_siblings: bool,
    /// Use the worker pool for leaf and level hashing
    pub parallel: bool,
    /// Worker count, 0 = number of hardware threads
    pub workers: usize,
}

impl TreeConfig {
    /// Generic configuration: SHA-256, leaf hashing on, positional siblings
    pub fn new(mode: TreeMode) -> Self {
        Self {
            hash_fn: default_hash_fn(),
            mode,
            hash_leaves: true,
            sort_siblings: false,
            parallel: true,
            workers: 0,
        }
    }

    /// The canonical fileset configuration used end-to-end by the upload and
    /// download protocols: SHA-256, leaf hashing disabled (leaves are
    /// already per-file digests), positional siblings, parallel build.
    pub fn fileset(mode: TreeMode) -> Self {
        Self {
            hash_fn: default_hash_fn(),
            mode,
            hash_leaves: false,
            sort_siblings: false,
            parallel: true,
            workers: 0,
        }
    }

    /// Effective worker count
    pub fn worker_count(&self) -> usize {
        if self.workers == 0 {
            num_cpus::get().max(1)
        } else {
            self.workers
        }
    }
}

impl Default for TreeConfig {
    fn default() -> Self {
        Self::new(TreeMode::RootAndProofs)
    }
}

impl fmt::Debug for TreeConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TreeConfig")
            .field("mode", &self.mode)
            .field("hash_leaves", &self.hash_leaves)
            .field("sort_siblings", &self.sort_siblings)
            .field("parallel", &self.parallel)
            .field("workers", &self.workers)
            .finish()
    }
}
