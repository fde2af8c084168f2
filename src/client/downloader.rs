//! Verified download workflow
//!
//! proof retrieval → streamed transfer → local leaf recomputation → proof
//! verification against the root encoded in the fileset id. A file that
//! cannot be verified is never accepted.

use crate::client::transfer::DownloadedFile;
use crate::client::ClientContext;
use crate::core::error::{Result, VeristoreError};
use crate::fileset;
use crate::merkle::{verify, TreeConfig, TreeMode};
use std::path::Path;
use tracing::info;

/// Download file `file_index` of `fileset_id` into
/// `<dest_dir>/<fileset_id>/`, verifying it against the fileset root.
pub async fn download_file(
    ctx: &ClientContext,
    fileset_id: &str,
    file_index: usize,
    dest_dir: &Path,
) -> Result<DownloadedFile> {
    fileset::validate_fileset_id(fileset_id)?;

    // 1. Bucket id and this leaf's inclusion proof.
    let info = ctx
        .verifier
        .download_info(&ctx.tenant_id, fileset_id, file_index)
        .await?;
    info!(
        fileset = %fileset_id,
        index = file_index,
        siblings = info.proof.siblings.len(),
        "download info retrieved"
    );

    // 2. Stream the bytes to disk, hashing along the way.
    let fileset_dir = dest_dir.join(fileset_id);
    let downloaded = ctx
        .transfer
        .download_file(&info.bucket_id, file_index, &fileset_dir)
        .await?;

    // 3–5. Recompute the leaf, recover the root, verify. Fail closed.
    let root = fileset::root_from_fileset_id(fileset_id)?;
    let config = TreeConfig::fileset(TreeMode::RootOnly);
    let verified = verify(&config, &downloaded.leaf_hash, &info.proof, root.as_bytes())?;
    if !verified {
        return Err(VeristoreError::VerificationFailed {
            path: downloaded.path,
        });
    }

    info!(file = %downloaded.path.display(), size = downloaded.size, "download verified");
    Ok(downloaded)
}
