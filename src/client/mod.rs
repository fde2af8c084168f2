//! Client-side orchestration of the verified upload and download protocols

pub mod api;
pub mod downloader;
pub mod transfer;
pub mod uploader;

pub use api::{VerifierApiClient, DEFAULT_RPC_TIMEOUT};
pub use downloader::download_file;
pub use transfer::{DownloadedFile, FileTransferClient, DEFAULT_CHUNK_SIZE, MIN_CHUNK_SIZE};
pub use uploader::{upload_fileset, UploadSummary};

/// Grouped access to the remote services a client workflow talks to
#[derive(Debug, Clone)]
pub struct ClientContext {
    /// Verifier API client
    pub verifier: VerifierApiClient,
    /// File transfer client for the storage service
    pub transfer: FileTransferClient,
    /// Tenant identifier carried on every call
    pub tenant_id: String,
}

impl ClientContext {
    pub fn new(
        verifier: VerifierApiClient,
        transfer: FileTransferClient,
        tenant_id: impl Into<String>,
    ) -> Self {
        Self {
            verifier,
            transfer,
            tenant_id: tenant_id.into(),
        }
    }
}
