//! Wire-level payloads and codecs for the storage and verifier APIs

pub mod frame;
pub mod messages;

pub use frame::{encode_frame, FrameDecoder, UploadFrame, MAX_FRAME_LEN};
pub use messages::{
    AttestRequest, AttestResponse, BucketRequest, BucketResponse, DownloadInfoQuery,
    DownloadInfoResponse, ListHashesResponse, PingQuery, PingResponse, UploadResponse,
    HEADER_FILE_NAME, HEADER_FILE_SIZE, HEADER_FILE_TYPE, STATUS_INTERNAL, STATUS_MATCH,
    STATUS_MISMATCH,
};
