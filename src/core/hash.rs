//! Hash utilities for Veristore

use crate::core::types::Hash;
use sha2::{Digest, Sha256};
use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::Path;
use std::sync::Arc;

/// Pluggable hash function for the Merkle engine.
///
/// Must be deterministic across threads: identical inputs produce identical
/// outputs with no per-thread salt.
pub type HashFn = Arc<dyn Fn(&[u8]) -> io::Result<Vec<u8>> + Send + Sync>;

/// Compute SHA-256 hash of data
pub fn sha256(data: &[u8]) -> Hash {
    let mut hasher = Sha256::new();
    hasher.update(data);
    Hash::from_bytes(hasher.finalize().into())
}

/// Compute SHA-256 hash of two digests (for merkle tree construction)
pub fn hash_pair(left: &Hash, right: &Hash) -> Hash {
    let mut hasher = Sha256::new();
    hasher.update(left.as_bytes());
    hasher.update(right.as_bytes());
    Hash::from_bytes(hasher.finalize().into())
}

/// The default engine hash function: SHA-256 over raw bytes
pub fn default_hash_fn() -> HashFn {
    Arc::new(|data: &[u8]| {
        let mut hasher = Sha256::new();
        hasher.update(data);
        Ok(hasher.finalize().to_vec())
    })
}

/// Compute the per-file leaf hash `H(content ‖ basename)`.
///
/// The basename is folded in after the content so that two files with equal
/// bytes but different names produce distinct leaves within a fileset.
pub fn file_leaf_hash(path: &Path) -> io::Result<Hash> {
    let file = File::open(path)?;
    let mut reader = BufReader::new(file);
    let mut hasher = StreamingHasher::new();
    let mut buffer = [0u8; 8192];

    loop {
        let bytes_read = reader.read(&mut buffer)?;
        if bytes_read == 0 {
            break;
        }
        hasher.update(&buffer[..bytes_read]);
    }

    let basename = path
        .file_name()
        .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "path has no basename"))?;
    hasher.update(basename.to_string_lossy().as_bytes());

    Ok(hasher.finalize())
}

/// Compute the leaf hash for already-loaded content and its file name
pub fn content_leaf_hash(content: &[u8], file_name: &str) -> Hash {
    let mut hasher = StreamingHasher::new();
    hasher.update(content);
    hasher.update(file_name.as_bytes());
    hasher.finalize()
}

/// Create a streaming hasher for incremental hashing
pub struct StreamingHasher {
    hasher: Sha256,
}

impl StreamingHasher {
    /// Create a new streaming hasher
    pub fn new() -> Self {
        Self {
            hasher: Sha256::new(),
        }
    }

    /// Update the hash with new data
    pub fn update(&mut self, data: &[u8]) {
        self.hasher.update(data);
    }

    /// Finalize the hash and return the result
    pub fn finalize(self) -> Hash {
        Hash::from_bytes(self.hasher.finalize().into())
    }
}

impl Default for StreamingHasher {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_sha256_deterministic() {
        let data = b"Hello, Veristore!";
        let hash = sha256(data);
        assert_ne!(hash, Hash::zero());
        assert_eq!(hash, sha256(data));
    }

    #[test]
    fn test_hash_pair_order_matters() {
        let hash1 = sha256(b"first");
        let hash2 = sha256(b"second");
        let combined = hash_pair(&hash1, &hash2);

        assert_ne!(combined, hash1);
        assert_ne!(combined, hash2);
        assert_eq!(combined, hash_pair(&hash1, &hash2));
        assert_ne!(combined, hash_pair(&hash2, &hash1));
    }

    #[test]
    fn test_default_hash_fn_matches_sha256() {
        let f = default_hash_fn();
        let digest = f(b"payload").unwrap();
        assert_eq!(digest, sha256(b"payload").to_vec());
    }

    #[test]
    fn test_file_leaf_hash_includes_basename() -> io::Result<()> {
        let dir = tempfile::tempdir()?;
        let path_a = dir.path().join("a.txt");
        let path_b = dir.path().join("b.txt");
        std::fs::write(&path_a, b"same content")?;
        std::fs::write(&path_b, b"same content")?;

        let leaf_a = file_leaf_hash(&path_a)?;
        let leaf_b = file_leaf_hash(&path_b)?;
        assert_ne!(leaf_a, leaf_b);

        // Matches the in-memory derivation used on download verification.
        assert_eq!(leaf_a, content_leaf_hash(b"same content", "a.txt"));
        Ok(())
    }

    #[test]
    fn test_streaming_hasher_matches_oneshot() {
        let mut hasher = StreamingHasher::new();
        hasher.update(b"Hello, ");
        hasher.update(b"World!");
        assert_eq!(hasher.finalize(), sha256(b"Hello, World!"));
    }

    #[test]
    fn test_file_leaf_hash_streams_large_file() -> io::Result<()> {
        let mut temp = NamedTempFile::new()?;
        let payload = vec![0x5au8; 64 * 1024];
        temp.write_all(&payload)?;
        temp.flush()?;

        let name = temp
            .path()
            .file_name()
            .unwrap()
            .to_string_lossy()
            .into_owned();
        let expected = content_leaf_hash(&payload, &name);
        assert_eq!(file_leaf_hash(temp.path())?, expected);
        Ok(())
    }
}
