//! File storage service: streamed uploads, hash listing, streamed downloads
//!
//! The service is stateless between requests; everything lives on the
//! filesystem under the bucket store root.

use crate::core::error::{Result, VeristoreError};
use crate::storage::bucket::BucketStore;
use crate::wire::{
    FrameDecoder, ListHashesResponse, UploadResponse, HEADER_FILE_NAME, HEADER_FILE_SIZE,
    HEADER_FILE_TYPE,
};
use axum::body::Body;
use axum::extract::{Path, State};
use axum::response::Response;
use axum::routing::{get, post};
use axum::{Json, Router};
use futures_util::StreamExt;
use std::sync::Arc;
use tokio::io::AsyncWriteExt;
use tokio_util::io::ReaderStream;
use tracing::{debug, info, warn};

/// Download chunk size; anything from 3 KiB up satisfies the protocol
const DOWNLOAD_CHUNK_SIZE: usize = 64 * 1024;

/// Shared state of the storage service
pub struct StorageState {
    pub store: BucketStore,
}

impl StorageState {
    pub fn new(store: BucketStore) -> Self {
        Self { store }
    }
}

/// Build the storage API router
pub fn router(state: Arc<StorageState>) -> Router {
    Router::new()
        .route("/v1/files/upload", post(upload))
        .route("/v1/buckets/:bucket_id/hashes", get(list_hashes))
        .route("/v1/buckets/:bucket_id/files/:file_index", get(download))
        .with_state(state)
}

/// Client-streamed upload of one file.
///
/// The first frame establishes `(bucket_id, file_name)`; later frames must
/// carry the same identity and their chunks are appended in arrival order.
async fn upload(
    State(state): State<Arc<StorageState>>,
    body: Body,
) -> Result<Json<UploadResponse>> {
    let mut stream = body.into_data_stream();
    let mut decoder = FrameDecoder::new();

    let mut output: Option<(tokio::fs::File, String, String)> = None;
    let mut size: u64 = 0;

    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(|e| VeristoreError::internal(format!("upload stream: {e}")))?;
        decoder.push(&chunk);

        while let Some(frame) = decoder.next_frame()? {
            match &output {
                None => {
                    let path = state
                        .store
                        .prepare_upload(&frame.bucket_id, &frame.file_name)
                        .await?;
                    debug!(bucket = %frame.bucket_id, file = %frame.file_name, "upload opened");
                    let file = tokio::fs::File::create(&path).await?;
                    output = Some((file, frame.bucket_id.clone(), frame.file_name.clone()));
                }
                Some((_, bucket_id, file_name))
                    if *bucket_id != frame.bucket_id || *file_name != frame.file_name =>
                {
                    warn!(
                        started = %format!("{bucket_id}/{file_name}"),
                        seen = %format!("{}/{}", frame.bucket_id, frame.file_name),
                        "upload stream changed identity"
                    );
                    return Err(VeristoreError::UploadIdentityChanged {
                        started: format!("{bucket_id}/{file_name}"),
                        seen: format!("{}/{}", frame.bucket_id, frame.file_name),
                    });
                }
                Some(_) => {}
            }

            if !frame.chunk.is_empty() {
                if let Some((file, _, _)) = output.as_mut() {
                    file.write_all(&frame.chunk).await?;
                    size += frame.chunk.len() as u64;
                }
            }
        }
    }

    if !decoder.is_drained() {
        return Err(VeristoreError::internal("upload body ended mid-frame"));
    }

    match output {
        Some((mut file, bucket_id, file_name)) => {
            file.flush().await?;
            info!(bucket = %bucket_id, file = %file_name, size, "upload stored");
            Ok(Json(UploadResponse { file_name, size }))
        }
        None => Err(VeristoreError::internal("upload body carried no frames")),
    }
}

/// Leaf hashes of every file in the bucket, lexical order
async fn list_hashes(
    State(state): State<Arc<StorageState>>,
    Path(bucket_id): Path<String>,
) -> Result<Json<ListHashesResponse>> {
    info!(bucket = %bucket_id, "listing bucket file hashes");
    let file_hashes = state.store.file_hashes(&bucket_id)?;
    debug!(bucket = %bucket_id, count = file_hashes.len(), "hashes computed");
    Ok(Json(ListHashesResponse { file_hashes }))
}

/// Server-streamed download of one file, selected by lexical index
async fn download(
    State(state): State<Arc<StorageState>>,
    Path((bucket_id, file_index)): Path<(String, i64)>,
) -> Result<Response> {
    info!(bucket = %bucket_id, index = file_index, "download requested");
    if file_index < 0 {
        return Err(VeristoreError::InvalidFileIndex { index: file_index });
    }

    let files = state.store.list_files(&bucket_id)?;
    let index = file_index as usize;
    if index >= files.len() {
        return Err(VeristoreError::FileIndexOutOfRange {
            index,
            count: files.len(),
        });
    }

    let path = &files[index];
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .ok_or_else(|| VeristoreError::internal("bucket entry has no file name"))?;
    let extension = path
        .extension()
        .map(|e| e.to_string_lossy().into_owned())
        .unwrap_or_default();

    let file = tokio::fs::File::open(path).await?;
    let file_size = file.metadata().await?.len();
    let stream = ReaderStream::with_capacity(file, DOWNLOAD_CHUNK_SIZE);

    Response::builder()
        .header(HEADER_FILE_NAME, file_name.as_str())
        .header(HEADER_FILE_TYPE, extension.as_str())
        .header(HEADER_FILE_SIZE, file_size)
        .body(Body::from_stream(stream))
        .map_err(|e| VeristoreError::internal(format!("download response: {e}")))
}
