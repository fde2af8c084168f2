//! Download command implementation

use crate::client::{self, ClientContext, FileTransferClient, VerifierApiClient};
use crate::config::AppConfig;
use anyhow::Result;
use colored::Colorize;
use std::path::PathBuf;

/// Execute the download command
pub async fn execute(
    config: AppConfig,
    fileset_id: String,
    file_index: usize,
    output: Option<PathBuf>,
    tenant: Option<String>,
    verifier: Option<String>,
    storage: Option<String>,
) -> Result<()> {
    let tenant = tenant.unwrap_or(config.client.tenant_id.clone());
    let output = output.unwrap_or(config.client.download_dir.clone());
    let verifier_endpoint = verifier.unwrap_or(config.verifier_api.endpoint.clone());
    let storage_endpoint = storage.unwrap_or(config.storage_api.endpoint.clone());

    let ctx = ClientContext::new(
        VerifierApiClient::new(verifier_endpoint),
        FileTransferClient::new(storage_endpoint, config.client.chunk_size)?,
        tenant,
    );

    println!(
        "Downloading file #{} of fileset {}",
        file_index,
        fileset_id.bold()
    );
    let downloaded = client::download_file(&ctx, &fileset_id, file_index, &output).await?;

    println!(
        "{} {} ({} bytes) verified against the fileset root",
        "✓".green(),
        downloaded.path.display(),
        downloaded.size
    );

    Ok(())
}
