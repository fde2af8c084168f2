//! Command implementations

pub mod download;
pub mod ping;
pub mod serve_storage;
pub mod serve_verifier;
pub mod upload;

/// Resolve when the process receives an interrupt, so servers can drain
/// in-flight requests before exiting
pub async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_err() {
        tracing::error!("failed to install interrupt handler; running until killed");
        std::future::pending::<()>().await;
    }
    tracing::info!("interrupt received, shutting down");
}
