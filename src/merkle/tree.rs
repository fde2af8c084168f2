//! Balanced binary Merkle tree over an even-padded sequence of leaf digests
//!
//! Levels are stored as contiguous digest buffers, leaves first. When a
//! level has an odd length its last node is duplicated before combining;
//! the rule applies recursively at every level. The build is functional:
//! the root is a deterministic function of the leaf sequence and the
//! configuration, regardless of worker count.

use crate::core::error::{Result, VeristoreError};
use crate::core::hash::HashFn;
use crate::core::types::Hash;
use crate::merkle::block::DataBlock;
use crate::merkle::config::{TreeConfig, TreeMode};
use crate::merkle::pool::WorkerPool;
use crate::merkle::proof::Proof;
use crossbeam_channel::bounded;
use std::io;
use std::sync::Arc;

/// The proof path bitmask is 32 bits wide, bounding proof-generating trees
/// to 2^32 leaves.
const MAX_PROOF_DEPTH: usize = 32;

/// An in-memory Merkle tree
#[derive(Debug)]
pub struct MerkleTree {
    root: Vec<u8>,
    depth: usize,
    leaf_count: usize,
    /// One proof per leaf in input order (RootAndProofs mode)
    proofs: Vec<Proof>,
    /// Padded levels, leaves first, root last (FullTree mode)
    levels: Vec<Vec<Vec<u8>>>,
    mode: TreeMode,
}

impl MerkleTree {
    /// Build a tree from the ordered leaf blocks.
    ///
    /// Fails on fewer than two leaves; a fileset of one file is not a tree.
    pub fn build<B: DataBlock>(config: &TreeConfig, blocks: &[B]) -> Result<Self> {
        if blocks.len() < 2 {
            return Err(VeristoreError::TooFewLeaves {
                count: blocks.len(),
            });
        }

        let serialized: Vec<Vec<u8>> = blocks
            .iter()
            .map(|block| block.serialize())
            .collect::<Result<_>>()?;

        let pool = if config.parallel {
            Some(WorkerPool::new(config.worker_count()))
        } else {
            None
        };

        let leaves = if config.hash_leaves {
            hash_leaves(config, pool.as_ref(), serialized)?
        } else {
            serialized
        };
        let leaf_count = leaves.len();

        let mut proofs = if config.mode == TreeMode::RootAndProofs {
            vec![
                Proof {
                    siblings: Vec::new(),
                    path: 0,
                };
                leaf_count
            ]
        } else {
            Vec::new()
        };
        let mut levels: Vec<Vec<Vec<u8>>> = Vec::new();

        let mut current = leaves;
        let mut level_index = 0usize;

        while current.len() > 1 {
            if current.len() % 2 == 1 {
                let last = current[current.len() - 1].clone();
                current.push(last);
            }

            if config.mode == TreeMode::RootAndProofs {
                if level_index >= MAX_PROOF_DEPTH {
                    return Err(VeristoreError::merkle_tree_failed(
                        "proof path bitmask exhausted",
                    ));
                }
                for (i, proof) in proofs.iter_mut().enumerate() {
                    let idx = i >> level_index;
                    proof.siblings.push(current[idx ^ 1].clone());
                    proof.path |= ((idx & 1) as u32) << level_index;
                }
            }

            if config.mode == TreeMode::FullTree {
                levels.push(current.clone());
            }

            current = build_level(config, pool.as_ref(), current)?;
            level_index += 1;
        }

        let root = current
            .pop()
            .ok_or_else(|| VeristoreError::merkle_tree_failed("build produced no root"))?;
        if config.mode == TreeMode::FullTree {
            levels.push(vec![root.clone()]);
        }

        Ok(Self {
            root,
            depth: level_index,
            leaf_count,
            proofs,
            levels,
            mode: config.mode,
        })
    }

    /// Digest of the topmost node
    pub fn root(&self) -> &[u8] {
        &self.root
    }

    /// Root as a fixed-width `Hash`, when the hash function emits 32 bytes
    pub fn root_hash(&self) -> Option<Hash> {
        Hash::from_slice(&self.root)
    }

    /// ⌈log₂(leaf count)⌉
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Number of original (unpadded) leaves
    pub fn leaf_count(&self) -> usize {
        self.leaf_count
    }

    /// All proofs in input order (empty outside RootAndProofs mode)
    pub fn proofs(&self) -> &[Proof] {
        &self.proofs
    }

    /// Inclusion proof for one leaf index.
    ///
    /// In RootAndProofs mode this returns the precomputed proof; in FullTree
    /// mode the proof is assembled from the retained levels on demand.
    pub fn proof(&self, index: usize) -> Result<Proof> {
        if index >= self.leaf_count {
            return Err(VeristoreError::ProofIndexOutOfRange {
                index,
                count: self.leaf_count,
            });
        }

        match self.mode {
            TreeMode::RootAndProofs => Ok(self.proofs[index].clone()),
            TreeMode::FullTree => {
                let mut siblings = Vec::with_capacity(self.depth);
                let mut path = 0u32;
                for (level_index, level) in self.levels[..self.depth].iter().enumerate() {
                    let idx = index >> level_index;
                    siblings.push(level[idx ^ 1].clone());
                    path |= ((idx & 1) as u32) << level_index;
                }
                Ok(Proof { siblings, path })
            }
            TreeMode::RootOnly => Err(VeristoreError::merkle_tree_failed(
                "proofs are not retained in root-only mode",
            )),
        }
    }
}

/// Combine a sibling pair into the parent digest
fn combine(hash_fn: &HashFn, sort_siblings: bool, left: &[u8], right: &[u8]) -> io::Result<Vec<u8>> {
    let (l, r) = if sort_siblings && left > right {
        (right, left)
    } else {
        (left, right)
    };
    let mut concat = Vec::with_capacity(l.len() + r.len());
    concat.extend_from_slice(l);
    concat.extend_from_slice(r);
    hash_fn(&concat)
}

/// Hash all leaf byte sequences, fanning out over the pool when worthwhile
fn hash_leaves(
    config: &TreeConfig,
    pool: Option<&WorkerPool>,
    serialized: Vec<Vec<u8>>,
) -> Result<Vec<Vec<u8>>> {
    let n = serialized.len();
    let pool = match pool {
        Some(pool) if n >= pool.workers() * 2 => pool,
        _ => {
            return serialized
                .iter()
                .map(|leaf| {
                    (config.hash_fn)(leaf).map_err(|e| VeristoreError::hash_failure(e.to_string()))
                })
                .collect();
        }
    };

    let input = Arc::new(serialized);
    let chunk = n.div_ceil(pool.workers());
    let (tx, rx) = bounded(pool.workers());

    let mut tasks = 0usize;
    let mut start = 0usize;
    while start < n {
        let end = (start + chunk).min(n);
        let input = Arc::clone(&input);
        let hash_fn = Arc::clone(&config.hash_fn);
        let tx = tx.clone();
        pool.submit(move || {
            let digests: io::Result<Vec<Vec<u8>>> =
                input[start..end].iter().map(|leaf| hash_fn(leaf)).collect();
            let _ = tx.send((start, digests));
        });
        tasks += 1;
        start = end;
    }
    drop(tx);

    collect_ranges(&rx, tasks, n)
}

/// Compute the next level from the current (even-length) one
fn build_level(
    config: &TreeConfig,
    pool: Option<&WorkerPool>,
    level: Vec<Vec<u8>>,
) -> Result<Vec<Vec<u8>>> {
    let pairs = level.len() / 2;
    let pool = match pool {
        Some(pool) if pairs >= pool.workers() * 2 => pool,
        _ => {
            let mut next = Vec::with_capacity(pairs);
            for p in 0..pairs {
                let digest =
                    combine(&config.hash_fn, config.sort_siblings, &level[2 * p], &level[2 * p + 1])
                        .map_err(|e| VeristoreError::hash_failure(e.to_string()))?;
                next.push(digest);
            }
            return Ok(next);
        }
    };

    let level = Arc::new(level);
    let chunk = pairs.div_ceil(pool.workers());
    let (tx, rx) = bounded(pool.workers());

    let mut tasks = 0usize;
    let mut start = 0usize;
    while start < pairs {
        let end = (start + chunk).min(pairs);
        let level = Arc::clone(&level);
        let hash_fn = Arc::clone(&config.hash_fn);
        let sort_siblings = config.sort_siblings;
        let tx = tx.clone();
        pool.submit(move || {
            let digests: io::Result<Vec<Vec<u8>>> = (start..end)
                .map(|p| combine(&hash_fn, sort_siblings, &level[2 * p], &level[2 * p + 1]))
                .collect();
            let _ = tx.send((start, digests));
        });
        tasks += 1;
        start = end;
    }
    drop(tx);

    collect_ranges(&rx, tasks, pairs)
}

/// Drain one result per task (the level barrier) and reassemble the ranges
/// in positional order so the outcome is bit-identical to a sequential pass.
fn collect_ranges(
    rx: &crossbeam_channel::Receiver<(usize, io::Result<Vec<Vec<u8>>>)>,
    tasks: usize,
    capacity: usize,
) -> Result<Vec<Vec<u8>>> {
    let mut pieces = Vec::with_capacity(tasks);
    for _ in 0..tasks {
        let piece = rx
            .recv()
            .map_err(|_| VeristoreError::merkle_tree_failed("worker pool disconnected"))?;
        pieces.push(piece);
    }
    pieces.sort_by_key(|(start, _)| *start);

    let mut out = Vec::with_capacity(capacity);
    for (_, piece) in pieces {
        out.extend(piece.map_err(|e| VeristoreError::hash_failure(e.to_string()))?);
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::hash::{hash_pair, sha256};
    use crate::merkle::block::RawBlock;
    use crate::merkle::proof::verify;

    fn raw_leaves(count: usize) -> Vec<RawBlock> {
        (0..count)
            .map(|i| RawBlock::new(sha256(&(i as u64).to_le_bytes()).to_vec()))
            .collect()
    }

    #[test]
    fn test_single_leaf_rejected() {
        let config = TreeConfig::fileset(TreeMode::RootOnly);
        let err = MerkleTree::build(&config, &raw_leaves(1)).unwrap_err();
        assert!(matches!(err, VeristoreError::TooFewLeaves { count: 1 }));
        assert!(MerkleTree::build(&config, &raw_leaves(0)).is_err());
    }

    #[test]
    fn test_two_leaf_root() {
        let config = TreeConfig::fileset(TreeMode::RootOnly);
        let a = sha256(b"a");
        let b = sha256(b"b");
        let tree = MerkleTree::build(&config, &[a, b]).unwrap();
        assert_eq!(tree.root(), hash_pair(&a, &b).to_vec());
        assert_eq!(tree.depth(), 1);
    }

    #[test]
    fn test_odd_leaf_padding_duplicates_last() {
        // root == H( H(a‖b) ‖ H(c‖c) ) for three leaves
        let config = TreeConfig::fileset(TreeMode::RootOnly);
        let a = sha256(b"a");
        let b = sha256(b"b");
        let c = sha256(b"c");
        let tree = MerkleTree::build(&config, &[a, b, c]).unwrap();

        let expected = hash_pair(&hash_pair(&a, &b), &hash_pair(&c, &c));
        assert_eq!(tree.root(), expected.to_vec());
        assert_eq!(tree.depth(), 2);
    }

    #[test]
    fn test_proofs_verify_for_every_leaf() {
        let config = TreeConfig::fileset(TreeMode::RootAndProofs);
        let leaves = raw_leaves(7);
        let tree = MerkleTree::build(&config, &leaves).unwrap();
        assert_eq!(tree.proofs().len(), 7);

        for (i, leaf) in leaves.iter().enumerate() {
            let proof = tree.proof(i).unwrap();
            assert_eq!(proof.depth(), tree.depth());
            assert!(verify(&config, leaf, &proof, tree.root()).unwrap());
        }
    }

    #[test]
    fn test_tampered_leaf_fails_verification() {
        let config = TreeConfig::fileset(TreeMode::RootAndProofs);
        let leaves = raw_leaves(5);
        let tree = MerkleTree::build(&config, &leaves).unwrap();

        for (i, leaf) in leaves.iter().enumerate() {
            let mut tampered = leaf.clone();
            tampered.data[0] ^= 0x01;
            let proof = tree.proof(i).unwrap();
            assert!(!verify(&config, &tampered, &proof, tree.root()).unwrap());
        }
    }

    #[test]
    fn test_full_tree_proofs_match_precomputed() {
        let leaves = raw_leaves(9);

        let eager = TreeConfig::fileset(TreeMode::RootAndProofs);
        let lazy = TreeConfig::fileset(TreeMode::FullTree);
        let tree_eager = MerkleTree::build(&eager, &leaves).unwrap();
        let tree_lazy = MerkleTree::build(&lazy, &leaves).unwrap();

        assert_eq!(tree_eager.root(), tree_lazy.root());
        for i in 0..leaves.len() {
            assert_eq!(tree_eager.proof(i).unwrap(), tree_lazy.proof(i).unwrap());
        }
    }

    #[test]
    fn test_root_only_mode_has_no_proofs() {
        let config = TreeConfig::fileset(TreeMode::RootOnly);
        let tree = MerkleTree::build(&config, &raw_leaves(4)).unwrap();
        assert!(tree.proofs().is_empty());
        assert!(tree.proof(0).is_err());
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let leaves = raw_leaves(33);

        let mut sequential = TreeConfig::fileset(TreeMode::RootAndProofs);
        sequential.parallel = false;
        let mut parallel = TreeConfig::fileset(TreeMode::RootAndProofs);
        parallel.workers = 4;

        let tree_seq = MerkleTree::build(&sequential, &leaves).unwrap();
        let tree_par = MerkleTree::build(&parallel, &leaves).unwrap();

        assert_eq!(tree_seq.root(), tree_par.root());
        assert_eq!(tree_seq.proofs(), tree_par.proofs());
    }

    #[test]
    fn test_sorted_siblings_mode_verifies() {
        let mut config = TreeConfig::fileset(TreeMode::RootAndProofs);
        config.sort_siblings = true;
        let leaves = raw_leaves(6);
        let tree = MerkleTree::build(&config, &leaves).unwrap();

        for (i, leaf) in leaves.iter().enumerate() {
            let proof = tree.proof(i).unwrap();
            assert!(verify(&config, leaf, &proof, tree.root()).unwrap());
        }
    }

    #[test]
    fn test_sibling_modes_are_incompatible() {
        // With leaf digests in descending byte order, sorted pairing swaps
        // them while positional pairing does not, so the roots must differ.
        let high = RawBlock::new(vec![0xffu8; 32]);
        let low = RawBlock::new(vec![0x00u8; 32]);
        let leaves = [high.clone(), low];

        let positional = TreeConfig::fileset(TreeMode::RootAndProofs);
        let mut sorted = TreeConfig::fileset(TreeMode::RootAndProofs);
        sorted.sort_siblings = true;

        let tree_pos = MerkleTree::build(&positional, &leaves).unwrap();
        let tree_sorted = MerkleTree::build(&sorted, &leaves).unwrap();
        assert_ne!(tree_pos.root(), tree_sorted.root());

        let proof = tree_sorted.proof(0).unwrap();
        assert!(!verify(&positional, &high, &proof, tree_sorted.root()).unwrap());
    }

    #[test]
    fn test_leaf_hashing_enabled_hashes_blocks() {
        let mut config = TreeConfig::new(TreeMode::RootOnly);
        config.parallel = false;
        let blocks = [RawBlock::new(b"x".to_vec()), RawBlock::new(b"y".to_vec())];
        let tree = MerkleTree::build(&config, &blocks).unwrap();

        let expected = hash_pair(&sha256(b"x"), &sha256(b"y"));
        assert_eq!(tree.root(), expected.to_vec());
    }
}
