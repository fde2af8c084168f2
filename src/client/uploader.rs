//! Verified upload workflow
//!
//! hash → tree → allocate → stream files (bounded concurrency) → attest →
//! erase local source. The local directory is removed only once the remote
//! attestation confirms the roots match.

use crate::client::ClientContext;
use crate::core::error::{Result, VeristoreError};
use crate::core::types::RootHash;
use crate::fileset;
use crate::merkle::{MerkleTree, TreeConfig, TreeMode};
use crate::wire::{STATUS_MATCH, STATUS_MISMATCH};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{info, warn};

/// Outcome of a verified fileset upload
#[derive(Debug, Clone)]
pub struct UploadSummary {
    pub fileset_id: String,
    pub bucket_id: String,
    pub root: RootHash,
    pub file_count: usize,
    pub bytes_sent: u64,
}

/// Upload every file under `dir` as one fileset, with at most `workers`
/// transfers in flight, then attest and erase the local source.
pub async fn upload_fileset(
    ctx: &ClientContext,
    dir: &Path,
    workers: usize,
    show_progress: bool,
) -> Result<UploadSummary> {
    if workers < 1 {
        return Err(VeristoreError::InvalidConcurrency { workers });
    }

    // 1. Deterministic local view of the directory.
    let files = fileset::list_dir_files(dir)?;
    if files.len() < 2 {
        return Err(VeristoreError::FilesetTooSmall {
            count: files.len(),
            path: dir.to_path_buf(),
        });
    }
    info!(dir = %dir.display(), files = files.len(), "fileset enumerated");

    // 2–4. Leaves, root, fileset identity.
    let leaves = fileset::compute_file_leaves(&files)?;
    let config = TreeConfig::fileset(TreeMode::RootOnly);
    let tree = MerkleTree::build(&config, &leaves)?;
    let root = tree
        .root_hash()
        .ok_or_else(|| VeristoreError::merkle_tree_failed("unexpected root digest width"))?;
    let fileset_id = fileset::fileset_id_from_root(tree.root());
    info!(fileset = %fileset_id, "fileset root computed");

    // 5. Bucket allocation.
    let bucket_id = ctx
        .verifier
        .allocate_bucket(&ctx.tenant_id, &fileset_id)
        .await?;

    // 6. Bounded-concurrency streamed uploads.
    let bytes_sent = upload_files(ctx, &bucket_id, &files, workers, show_progress).await?;

    // 7. Attestation; anything but a match fails the workflow closed.
    let resp = ctx
        .verifier
        .attest_upload(&ctx.tenant_id, &fileset_id, root)
        .await?;
    match resp.status {
        STATUS_MATCH => {}
        STATUS_MISMATCH => {
            return Err(VeristoreError::AttestationMismatch {
                fileset_id,
                message: resp.message,
            });
        }
        status => {
            return Err(VeristoreError::UnexpectedAttestStatus {
                status,
                message: resp.message,
            });
        }
    }
    info!(fileset = %fileset_id, "attestation confirmed");

    // 8. The local source goes away only after remote verification.
    tokio::fs::remove_dir_all(dir).await?;
    info!(dir = %dir.display(), "local source removed");

    Ok(UploadSummary {
        fileset_id,
        bucket_id,
        root,
        file_count: files.len(),
        bytes_sent,
    })
}

/// Run the per-file uploads behind a semaphore of `workers` permits. The
/// first failure stops new transfers from starting; in-flight ones are left
/// to finish, and that first error is what gets reported.
async fn upload_files(
    ctx: &ClientContext,
    bucket_id: &str,
    files: &[PathBuf],
    workers: usize,
    show_progress: bool,
) -> Result<u64> {
    let semaphore = Arc::new(Semaphore::new(workers));
    let failed = Arc::new(AtomicBool::new(false));
    let progress = upload_progress(files.len() as u64, show_progress);

    let mut tasks: JoinSet<Result<u64>> = JoinSet::new();
    for path in files.iter().cloned() {
        let semaphore = Arc::clone(&semaphore);
        let failed = Arc::clone(&failed);
        let transfer = ctx.transfer.clone();
        let bucket_id = bucket_id.to_string();
        let progress = progress.clone();

        tasks.spawn(async move {
            let _permit = semaphore.acquire_owned().await.map_err(|_| {
                VeristoreError::Canceled {
                    operation: format!("upload of {}", path.display()),
                }
            })?;
            if failed.load(Ordering::SeqCst) {
                return Err(VeristoreError::Canceled {
                    operation: format!("upload of {}", path.display()),
                });
            }

            match transfer.upload_file(&bucket_id, &path).await {
                Ok(resp) => {
                    progress.inc(1);
                    Ok(resp.size)
                }
                Err(e) => {
                    warn!(file = %path.display(), error = %e, "file upload failed");
                    failed.store(true, Ordering::SeqCst);
                    Err(e)
                }
            }
        });
    }

    let mut bytes_sent: u64 = 0;
    let mut first_error: Option<VeristoreError> = None;
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok(Ok(size)) => bytes_sent += size,
            Ok(Err(e)) => {
                // Prefer the root cause over the cancellations it triggered.
                let is_cancel = matches!(e, VeristoreError::Canceled { .. });
                if first_error.is_none()
                    || (!is_cancel
                        && matches!(first_error, Some(VeristoreError::Canceled { .. })))
                {
                    first_error = Some(e);
                }
            }
            Err(join_err) => {
                if first_error.is_none() {
                    first_error = Some(VeristoreError::internal(format!(
                        "upload task panicked: {join_err}"
                    )));
                }
            }
        }
    }
    progress.finish_and_clear();

    match first_error {
        Some(e) => Err(e),
        None => Ok(bytes_sent),
    }
}

fn upload_progress(total: u64, show: bool) -> ProgressBar {
    if !show {
        return ProgressBar::hidden();
    }
    let bar = ProgressBar::new(total);
    if let Ok(style) =
        ProgressStyle::default_bar().template("{bar:40.cyan/blue} {pos}/{len} files | {msg}")
    {
        bar.set_style(style);
    }
    bar
}
