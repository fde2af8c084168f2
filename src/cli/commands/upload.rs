//! Upload command implementation

use crate::client::{self, ClientContext, FileTransferClient, VerifierApiClient};
use crate::config::AppConfig;
use anyhow::Result;
use colored::Colorize;
use std::path::PathBuf;

/// Execute the upload command
#[allow(clippy::too_many_arguments)]
pub async fn execute(
    config: AppConfig,
    dir: PathBuf,
    tenant: Option<String>,
    workers: Option<usize>,
    chunk_size: Option<usize>,
    verifier: Option<String>,
    storage: Option<String>,
    no_progress: bool,
) -> Result<()> {
    let tenant = tenant.unwrap_or(config.client.tenant_id.clone());
    let workers = workers.unwrap_or(config.client.upload_workers);
    let chunk_size = chunk_size.unwrap_or(config.client.chunk_size);
    let verifier_endpoint = verifier.unwrap_or(config.verifier_api.endpoint.clone());
    let storage_endpoint = storage.unwrap_or(config.storage_api.endpoint.clone());

    let ctx = ClientContext::new(
        VerifierApiClient::new(verifier_endpoint),
        FileTransferClient::new(storage_endpoint, chunk_size)?,
        tenant,
    );

    println!("Uploading fileset from {}", dir.display().to_string().bold());
    let summary = client::upload_fileset(&ctx, &dir, workers, !no_progress).await?;

    println!(
        "{} {} files ({} bytes) uploaded and attested",
        "✓".green(),
        summary.file_count,
        summary.bytes_sent
    );
    println!("  Fileset: {}", summary.fileset_id.bold());
    println!("  Bucket:  {}", summary.bucket_id);
    println!("  Root:    {}", summary.root);
    println!("  Local source removed after verification");

    Ok(())
}
