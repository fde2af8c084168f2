//! On-disk bucket layout: `<storage_root>/<bucket_id>/<file_name>`
//!
//! No metadata sidecars; enumeration is lexical over the raw directory
//! contents, which is what ties the storage-side leaf order to the
//! client-side one.

use crate::core::error::{Result, VeristoreError};
use crate::core::types::LeafHash;
use crate::fileset;
use std::path::{Path, PathBuf};

/// Bucket-addressed file store rooted at one directory
#[derive(Debug, Clone)]
pub struct BucketStore {
    root: PathBuf,
}

impl BucketStore {
    /// Create a store rooted at `root`; the directory itself materializes
    /// on the first upload
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Storage root directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Absolute path of a bucket directory
    pub fn bucket_path(&self, bucket_id: &str) -> Result<PathBuf> {
        validate_component(bucket_id).map_err(|_| VeristoreError::InvalidBucketId {
            bucket_id: bucket_id.to_string(),
        })?;
        Ok(self.root.join(bucket_id))
    }

    /// Absolute path of a file inside a bucket
    pub fn file_path(&self, bucket_id: &str, file_name: &str) -> Result<PathBuf> {
        let bucket = self.bucket_path(bucket_id)?;
        validate_component(file_name).map_err(|_| VeristoreError::InvalidFileName {
            file_name: file_name.to_string(),
        })?;
        Ok(bucket.join(file_name))
    }

    /// Prepare the output path for an upload, creating the bucket directory
    /// on demand
    pub async fn prepare_upload(&self, bucket_id: &str, file_name: &str) -> Result<PathBuf> {
        let bucket = self.bucket_path(bucket_id)?;
        tokio::fs::create_dir_all(&bucket).await?;
        self.file_path(bucket_id, file_name)
    }

    /// All files in the bucket, in lexical order of full path
    pub fn list_files(&self, bucket_id: &str) -> Result<Vec<PathBuf>> {
        let bucket = self.bucket_path(bucket_id)?;
        if !bucket.is_dir() {
            return Err(VeristoreError::bucket_not_found(bucket_id));
        }
        fileset::walk_files(&bucket)
    }

    /// Per-file leaf hashes of the bucket contents, lexical order
    pub fn file_hashes(&self, bucket_id: &str) -> Result<Vec<LeafHash>> {
        let files = self.list_files(bucket_id)?;
        fileset::compute_file_leaves(&files)
    }
}

/// A bucket id or file name must stay a single path component
fn validate_component(component: &str) -> std::result::Result<(), ()> {
    if component.is_empty()
        || component == "."
        || component == ".."
        || component.contains('/')
        || component.contains('\\')
        || component.contains('\0')
    {
        return Err(());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_rejects_traversal_components() {
        let store = BucketStore::new("/tmp/veristore-test");
        assert!(store.bucket_path("ok_bucket").is_ok());
        assert!(store.bucket_path("../escape").is_err());
        assert!(store.bucket_path("a/b").is_err());
        assert!(store.bucket_path("").is_err());
        assert!(store.file_path("ok", "..").is_err());
        assert!(store.file_path("ok", "nested/name").is_err());
    }

    #[test]
    fn test_list_files_missing_bucket() {
        let dir = tempfile::tempdir().unwrap();
        let store = BucketStore::new(dir.path());
        let err = store.list_files("nope").unwrap_err();
        assert!(matches!(err, VeristoreError::BucketNotFound { .. }));
    }

    #[test]
    fn test_list_files_lexical() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let store = BucketStore::new(dir.path());
        let bucket = dir.path().join("t1_fs-aa");
        fs::create_dir_all(&bucket)?;
        fs::write(bucket.join("z.txt"), b"z")?;
        fs::write(bucket.join("a.txt"), b"a")?;

        let files = store.list_files("t1_fs-aa")?;
        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["a.txt", "z.txt"]);
        Ok(())
    }

    #[tokio::test]
    async fn test_prepare_upload_creates_bucket_dir() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let store = BucketStore::new(dir.path());
        let path = store.prepare_upload("t1_fs-bb", "data.bin").await?;
        assert!(path.parent().unwrap().is_dir());
        assert_eq!(path.file_name().unwrap(), "data.bin");
        Ok(())
    }
}
