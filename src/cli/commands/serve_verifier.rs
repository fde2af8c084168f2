//! Serve-verifier command implementation

use crate::cli::commands::shutdown_signal;
use crate::config::{AppConfig, DEFAULT_VERIFIER_PORT};
use crate::proofstore::{DiskProofStore, MemoryProofStore, ProofStore};
use crate::verifier::{self, StorageApiClient, VerifierState};
use anyhow::Result;
use colored::Colorize;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;

/// Execute the serve-verifier command
pub async fn execute(
    config: AppConfig,
    port: Option<u16>,
    storage_endpoint: Option<String>,
    proof_store_path: Option<PathBuf>,
) -> Result<()> {
    let port = port.or(config.listen.port).unwrap_or(DEFAULT_VERIFIER_PORT);
    let storage_endpoint = storage_endpoint.unwrap_or(config.storage_api.endpoint.clone());
    let proof_store_path = proof_store_path.or(config.proof_store.path.clone());

    let store: Arc<dyn ProofStore> = match &proof_store_path {
        Some(path) => Arc::new(DiskProofStore::open(path.clone())?),
        None => Arc::new(MemoryProofStore::new()),
    };

    let mut state = VerifierState::new(store, StorageApiClient::new(&storage_endpoint));
    state.proof_ttl = config.proof_ttl();
    let app = verifier::router(Arc::new(state));

    let listener = TcpListener::bind(("0.0.0.0", port)).await?;
    let backing = match &proof_store_path {
        Some(path) => format!("disk proof store at {}", path.display()),
        None => "in-memory proof store".to_string(),
    };
    println!(
        "{} verifier service on port {} → storage at {} ({})",
        "✓".green(),
        port,
        storage_endpoint,
        backing
    );
    info!(port, storage = %storage_endpoint, "verifier service started");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}
