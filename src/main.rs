//! Veristore CLI
//!
//! Entry point for the storage service, the verifier service, and the
//! client upload/download workflows.

use anyhow::Result;
use clap::Parser;
use veristore::cli::{commands, Cli, Commands};
use veristore::config::AppConfig;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = AppConfig::load(cli.config.as_deref())?;
    if let Some(level) = cli.log_level {
        config.log.level = level;
    }

    // Initialize logging; RUST_LOG wins over the configured level.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(config.log.level.clone())),
        )
        .init();

    match cli.command {
        Commands::ServeStorage { port, root } => {
            commands::serve_storage::execute(config, port, root).await
        }
        Commands::ServeVerifier {
            port,
            storage_endpoint,
            proof_store,
        } => commands::serve_verifier::execute(config, port, storage_endpoint, proof_store).await,
        Commands::Upload {
            dir,
            tenant,
            workers,
            chunk_size,
            verifier,
            storage,
            no_progress,
        } => {
            commands::upload::execute(
                config, dir, tenant, workers, chunk_size, verifier, storage, no_progress,
            )
            .await
        }
        Commands::Download {
            fileset_id,
            file_index,
            output,
            tenant,
            verifier,
            storage,
        } => {
            commands::download::execute(
                config, fileset_id, file_index, output, tenant, verifier, storage,
            )
            .await
        }
        Commands::Ping { name, verifier } => commands::ping::execute(config, name, verifier).await,
    }
}
