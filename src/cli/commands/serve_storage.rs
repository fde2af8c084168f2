//! Serve-storage command implementation

use crate::cli::commands::shutdown_signal;
use crate::config::{AppConfig, DEFAULT_STORAGE_PORT};
use crate::storage::{self, BucketStore, StorageState};
use anyhow::Result;
use colored::Colorize;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;

/// Execute the serve-storage command
pub async fn execute(config: AppConfig, port: Option<u16>, root: Option<PathBuf>) -> Result<()> {
    let port = port.or(config.listen.port).unwrap_or(DEFAULT_STORAGE_PORT);
    let root = root.unwrap_or(config.storage.location);

    let state = Arc::new(StorageState::new(BucketStore::new(root.clone())));
    let app = storage::router(state);

    let listener = TcpListener::bind(("0.0.0.0", port)).await?;
    println!(
        "{} storage service on port {} (root: {})",
        "✓".green(),
        port,
        root.display()
    );
    info!(port, root = %root.display(), "storage service started");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}
