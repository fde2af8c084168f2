//! Deterministic fileset view of a directory
//!
//! A fileset's leaf sequence is derived from the directory contents alone:
//! files are enumerated recursively in lexical full-path order, and each
//! contributes the leaf `H(content ‖ basename)`. Upload order never enters
//! the picture, so the root is insensitive to network interleaving.

use crate::core::error::{Result, VeristoreError};
use crate::core::hash::file_leaf_hash;
use crate::core::types::{Hash, LeafHash};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Prefix of every fileset identifier
pub const FILESET_PREFIX: &str = "fs-";

/// Walk a directory tree, collecting every file in lexical order of full
/// path. An existing but empty tree yields an empty list.
pub fn walk_files(root: &Path) -> Result<Vec<PathBuf>> {
    let mut paths: Vec<PathBuf> = Vec::new();
    for entry in WalkDir::new(root) {
        let entry = entry.map_err(|e| VeristoreError::internal(e.to_string()))?;
        if entry.file_type().is_file() {
            paths.push(entry.into_path());
        }
    }
    paths.sort();
    Ok(paths)
}

/// List all files under the directory and its subdirectories, in lexical
/// order of full path; a missing or empty directory is invalid input
pub fn list_dir_files(root: &Path) -> Result<Vec<PathBuf>> {
    if !root.is_dir() {
        return Err(VeristoreError::EmptyFileset {
            path: root.to_path_buf(),
        });
    }

    let paths = walk_files(root)?;
    if paths.is_empty() {
        return Err(VeristoreError::EmptyFileset {
            path: root.to_path_buf(),
        });
    }
    Ok(paths)
}

/// Compute the per-file leaf hash of every path, preserving order
pub fn compute_file_leaves(paths: &[PathBuf]) -> Result<Vec<LeafHash>> {
    paths
        .iter()
        .map(|path| file_leaf_hash(path).map_err(VeristoreError::Io))
        .collect()
}

/// Derive the fileset identifier from a Merkle root
pub fn fileset_id_from_root(root: &[u8]) -> String {
    format!("{FILESET_PREFIX}{}", hex::encode(root))
}

/// Extract the Merkle root from a fileset identifier, validating the prefix
/// and the digest width
pub fn root_from_fileset_id(fileset_id: &str) -> Result<Hash> {
    let hex_part = fileset_id
        .strip_prefix(FILESET_PREFIX)
        .ok_or_else(|| VeristoreError::invalid_fileset_id(fileset_id))?;
    Hash::from_hex(hex_part).map_err(|_| VeristoreError::invalid_fileset_id(fileset_id))
}

/// Check a client-supplied fileset identifier without decoding it
pub fn validate_fileset_id(fileset_id: &str) -> Result<()> {
    root_from_fileset_id(fileset_id).map(|_| ())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::hash::content_leaf_hash;
    use std::fs;

    #[test]
    fn test_list_dir_files_lexical_order() -> Result<()> {
        let dir = tempfile::tempdir()?;
        fs::create_dir(dir.path().join("sub"))?;
        fs::write(dir.path().join("b.txt"), b"b")?;
        fs::write(dir.path().join("a.txt"), b"a")?;
        fs::write(dir.path().join("sub").join("c.txt"), b"c")?;

        let paths = list_dir_files(dir.path())?;
        let names: Vec<String> = paths
            .iter()
            .map(|p| {
                p.strip_prefix(dir.path())
                    .unwrap()
                    .to_string_lossy()
                    .replace('\\', "/")
            })
            .collect();
        assert_eq!(names, vec!["a.txt", "b.txt", "sub/c.txt"]);
        Ok(())
    }

    #[test]
    fn test_list_dir_files_rejects_empty_dir() {
        let dir = tempfile::tempdir().unwrap();
        let err = list_dir_files(dir.path()).unwrap_err();
        assert!(matches!(err, VeristoreError::EmptyFileset { .. }));
    }

    #[test]
    fn test_leaves_fold_in_basename() -> Result<()> {
        let dir = tempfile::tempdir()?;
        fs::write(dir.path().join("a.txt"), b"same")?;
        fs::write(dir.path().join("b.txt"), b"same")?;

        let paths = list_dir_files(dir.path())?;
        let leaves = compute_file_leaves(&paths)?;
        assert_eq!(leaves.len(), 2);
        assert_ne!(leaves[0], leaves[1]);
        assert_eq!(leaves[0], content_leaf_hash(b"same", "a.txt"));
        Ok(())
    }

    #[test]
    fn test_fileset_id_codec() {
        let root = Hash::from_bytes([0x1fu8; 32]);
        let id = fileset_id_from_root(root.as_bytes());
        assert!(id.starts_with(FILESET_PREFIX));
        assert_eq!(id.len(), FILESET_PREFIX.len() + 64);

        let decoded = root_from_fileset_id(&id).unwrap();
        assert_eq!(decoded, root);
    }

    #[test]
    fn test_fileset_id_validation_rejects_garbage() {
        assert!(validate_fileset_id("fs-zz").is_err());
        assert!(validate_fileset_id("nope-0011").is_err());
        assert!(validate_fileset_id(&format!("fs{}", "00".repeat(32))).is_err());
        assert!(validate_fileset_id(&format!("fs-{}", "00".repeat(32))).is_ok());
    }
}
