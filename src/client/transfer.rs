//! Streamed file transfer against the storage service

use crate::client::api::check_status;
use crate::core::error::{Result, VeristoreError};
use crate::core::hash::StreamingHasher;
use crate::core::types::Hash;
use crate::wire::{encode_frame, UploadFrame, UploadResponse, HEADER_FILE_NAME, HEADER_FILE_SIZE};
use bytes::Bytes;
use futures_util::{stream, StreamExt};
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio_util::io::ReaderStream;
use tracing::{debug, warn};

/// Default upload chunk size
pub const DEFAULT_CHUNK_SIZE: usize = 1024 * 1024;

/// Smallest accepted upload chunk size
pub const MIN_CHUNK_SIZE: usize = 1024;

/// Default deadline on a download stream
pub const DEFAULT_DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(2);

/// A file written locally by a download, with its recomputed leaf hash
#[derive(Debug, Clone)]
pub struct DownloadedFile {
    pub path: PathBuf,
    pub file_name: String,
    pub size: u64,
    /// `H(content ‖ basename)`, computed while the bytes streamed in
    pub leaf_hash: Hash,
}

/// Chunked transfer client for the storage service
#[derive(Debug, Clone)]
pub struct FileTransferClient {
    base_url: String,
    client: reqwest::Client,
    chunk_size: usize,
    download_timeout: Duration,
}

impl FileTransferClient {
    pub fn new(base_url: impl Into<String>, chunk_size: usize) -> Result<Self> {
        Self::with_timeout(base_url, chunk_size, DEFAULT_DOWNLOAD_TIMEOUT)
    }

    pub fn with_timeout(
        base_url: impl Into<String>,
        chunk_size: usize,
        download_timeout: Duration,
    ) -> Result<Self> {
        if chunk_size < MIN_CHUNK_SIZE {
            return Err(VeristoreError::InvalidChunkSize {
                size: chunk_size,
                min: MIN_CHUNK_SIZE,
            });
        }
        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
            chunk_size,
            download_timeout,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Upload one file as a stream of frames into the bucket.
    ///
    /// The stream opens with an identity-only frame so the server fixes
    /// `(bucket_id, file_name)` before any payload byte, and empty files
    /// still create their server-side entry.
    pub async fn upload_file(&self, bucket_id: &str, path: &Path) -> Result<UploadResponse> {
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or_else(|| VeristoreError::InvalidFileName {
                file_name: path.display().to_string(),
            })?;

        let header = encode_frame(&UploadFrame::header(bucket_id, &file_name))?;
        let file = tokio::fs::File::open(path).await?;

        let bucket_owned = bucket_id.to_string();
        let name_owned = file_name.clone();
        let frames = ReaderStream::with_capacity(file, self.chunk_size).map(move |chunk| {
            chunk.and_then(|bytes| {
                encode_frame(&UploadFrame {
                    bucket_id: bucket_owned.clone(),
                    file_name: name_owned.clone(),
                    chunk: bytes.to_vec(),
                })
                .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e.to_string()))
            })
        });
        let body = stream::once(async move { Ok::<Bytes, io::Error>(header) }).chain(frames);

        let url = format!("{}/v1/files/upload", self.base_url);
        let resp = self
            .client
            .post(&url)
            .body(reqwest::Body::wrap_stream(body))
            .send()
            .await
            .map_err(|e| VeristoreError::transport("file upload", e))?;
        let resp = check_status("file upload", resp).await?;

        let result: UploadResponse = resp
            .json()
            .await
            .map_err(|e| VeristoreError::transport("file upload", e))?;
        debug!(file = %result.file_name, size = result.size, "upload acknowledged");
        Ok(result)
    }

    /// Download one file by lexical index into `dest_dir`, hashing the
    /// content as it streams in
    pub async fn download_file(
        &self,
        bucket_id: &str,
        file_index: usize,
        dest_dir: &Path,
    ) -> Result<DownloadedFile> {
        let url = format!("{}/v1/buckets/{bucket_id}/files/{file_index}", self.base_url);
        let resp = self
            .client
            .get(&url)
            .timeout(self.download_timeout)
            .send()
            .await
            .map_err(|e| VeristoreError::transport("file download", e))?;
        let resp = check_status("file download", resp).await?;

        let file_name = header_value(&resp, HEADER_FILE_NAME)?;
        if file_name.is_empty()
            || file_name == "."
            || file_name == ".."
            || file_name.contains('/')
            || file_name.contains('\\')
        {
            return Err(VeristoreError::InvalidFileName { file_name });
        }
        let declared_size: Option<u64> = resp
            .headers()
            .get(HEADER_FILE_SIZE)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse().ok());

        tokio::fs::create_dir_all(dest_dir).await?;
        let path = dest_dir.join(&file_name);
        let mut file = tokio::fs::File::create(&path).await?;
        let mut hasher = StreamingHasher::new();

        let mut size: u64 = 0;
        let mut body = resp.bytes_stream();
        while let Some(chunk) = body.next().await {
            let chunk = chunk.map_err(|e| VeristoreError::transport("file download", e))?;
            file.write_all(&chunk).await?;
            hasher.update(&chunk);
            size += chunk.len() as u64;
        }
        file.flush().await?;

        if let Some(declared) = declared_size {
            if declared != size {
                warn!(declared, received = size, file = %file_name, "download size header mismatch");
            }
        }

        hasher.update(file_name.as_bytes());
        Ok(DownloadedFile {
            path,
            file_name,
            size,
            leaf_hash: hasher.finalize(),
        })
    }
}

fn header_value(resp: &reqwest::Response, name: &str) -> Result<String> {
    resp.headers()
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.to_string())
        .ok_or_else(|| VeristoreError::internal(format!("download response missing {name} header")))
}
