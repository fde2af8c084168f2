//! Merkle tree engine: construction, inclusion proofs, verification
//!
//! The engine is functional: `MerkleTree::build` and `verify` are pure with
//! respect to their configuration, and parallelism never changes the root
//! or any proof.

pub mod block;
pub mod config;
pub mod pool;
pub mod proof;
pub mod tree;

pub use block::{DataBlock, RawBlock};
pub use config::{TreeConfig, TreeMode};
pub use pool::WorkerPool;
pub use proof::{verify, Proof};
pub use tree::MerkleTree;
