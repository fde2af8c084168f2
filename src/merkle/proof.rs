//! Inclusion proofs and stateless verification

use crate::core::error::{Result, VeristoreError};
use crate::merkle::block::DataBlock;
use crate::merkle::config::TreeConfig;
use serde::{Deserialize, Serialize};

/// Inclusion proof for one leaf.
///
/// `siblings` are ordered bottom-up; `path` bit *i* is 0 when the sibling at
/// level *i* sits on the right of the running digest (the current node is on
/// the left) and 1 otherwise. Proof length equals tree depth.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Proof {
    #[serde(with = "hex_siblings")]
    pub siblings: Vec<Vec<u8>>,
    pub path: u32,
}

impl Proof {
    /// Depth of the tree this proof was generated for
    pub fn depth(&self) -> usize {
        self.siblings.len()
    }
}

/// Verify a leaf block against a root using the same configuration the tree
/// was built with.
///
/// A mismatching root is not an error: the function returns `Ok(false)`.
/// Errors are reserved for unusable inputs: an empty proof, a leaf that
/// fails to serialize, or a hash function failure.
pub fn verify<B: DataBlock + ?Sized>(
    config: &TreeConfig,
    block: &B,
    proof: &Proof,
    root: &[u8],
) -> Result<bool> {
    if proof.siblings.is_empty() {
        return Err(VeristoreError::EmptyProof);
    }

    let leaf_bytes = block.serialize()?;
    let mut digest = if config.hash_leaves {
        (config.hash_fn)(&leaf_bytes)
            .map_err(|e| VeristoreError::hash_failure(e.to_string()))?
    } else {
        leaf_bytes
    };

    for (level, sibling) in proof.siblings.iter().enumerate() {
        let (left, right) = if config.sort_siblings {
            if digest.as_slice() <= sibling.as_slice() {
                (digest.as_slice(), sibling.as_slice())
            } else {
                (sibling.as_slice(), digest.as_slice())
            }
        } else if proof.path >> level & 1 == 0 {
            (digest.as_slice(), sibling.as_slice())
        } else {
            (sibling.as_slice(), digest.as_slice())
        };

        let mut concat = Vec::with_capacity(left.len() + right.len());
        concat.extend_from_slice(left);
        concat.extend_from_slice(right);
        digest = (config.hash_fn)(&concat)
            .map_err(|e| VeristoreError::hash_failure(e.to_string()))?;
    }

    Ok(digest.as_slice() == root)
}

mod hex_siblings {
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(
        siblings: &[Vec<u8>],
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(siblings.iter().map(hex::encode))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Vec<Vec<u8>>, D::Error> {
        let encoded: Vec<String> = Vec::deserialize(deserializer)?;
        encoded
            .into_iter()
            .map(|s| hex::decode(&s).map_err(|e| D::Error::custom(format!("invalid sibling hex: {e}"))))
            .collect()
    }
}
