//! Leaf data blocks
//!
//! The engine treats leaves as anything that can produce a byte sequence;
//! it never interprets the bytes themselves.

use crate::core::error::{Result, VeristoreError};
use crate::core::types::Hash;

/// Capability interface for input data blocks used to generate the tree
pub trait DataBlock {
    /// Convert the block into the byte sequence that is hashed (or, with
    /// leaf hashing disabled, used verbatim as the leaf digest)
    fn serialize(&self) -> Result<Vec<u8>>;
}

/// Trivial concrete leaf carrying raw bytes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawBlock {
    pub data: Vec<u8>,
}

impl RawBlock {
    pub fn new(data: impl Into<Vec<u8>>) -> Self {
        Self { data: data.into() }
    }
}

impl DataBlock for RawBlock {
    fn serialize(&self) -> Result<Vec<u8>> {
        Ok(self.data.clone())
    }
}

// Filesets feed per-file digests straight in as leaves.
impl DataBlock for Hash {
    fn serialize(&self) -> Result<Vec<u8>> {
        Ok(self.to_vec())
    }
}

impl DataBlock for Vec<u8> {
    fn serialize(&self) -> Result<Vec<u8>> {
        if self.is_empty() {
            return Err(VeristoreError::LeafSerialization {
                reason: "empty leaf bytes".to_string(),
            });
        }
        Ok(self.clone())
    }
}
