//! Length-prefixed frame codec for the client-streamed upload body
//!
//! Each frame is a u32-LE byte length followed by a bincode-encoded
//! `UploadFrame`. The decoder is incremental: it accepts body bytes as they
//! arrive and yields frames once complete.

use crate::core::error::{Result, VeristoreError};
use byteorder::{ByteOrder, LittleEndian};
use bytes::{Bytes, BytesMut};
use serde::{Deserialize, Serialize};

/// Upper bound on one encoded frame; anything larger is a protocol error
pub const MAX_FRAME_LEN: usize = 16 * 1024 * 1024;

const LEN_PREFIX: usize = 4;

/// One message of the upload stream. The first frame of a stream fixes the
/// `(bucket_id, file_name)` identity; every later frame must repeat it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadFrame {
    pub bucket_id: String,
    pub file_name: String,
    pub chunk: Vec<u8>,
}

impl UploadFrame {
    /// Identity-only frame carrying no payload bytes
    pub fn header(bucket_id: impl Into<String>, file_name: impl Into<String>) -> Self {
        Self {
            bucket_id: bucket_id.into(),
            file_name: file_name.into(),
            chunk: Vec::new(),
        }
    }
}

/// Encode one frame with its length prefix
pub fn encode_frame(frame: &UploadFrame) -> Result<Bytes> {
    let body = bincode::serialize(frame)?;
    if body.len() > MAX_FRAME_LEN {
        return Err(VeristoreError::FrameTooLarge {
            size: body.len(),
            max: MAX_FRAME_LEN,
        });
    }

    let mut out = BytesMut::with_capacity(LEN_PREFIX + body.len());
    let mut prefix = [0u8; LEN_PREFIX];
    LittleEndian::write_u32(&mut prefix, body.len() as u32);
    out.extend_from_slice(&prefix);
    out.extend_from_slice(&body);
    Ok(out.freeze())
}

/// Incremental frame decoder fed from a byte stream
#[derive(Default)]
pub struct FrameDecoder {
    buf: BytesMut,
}

impl FrameDecoder {
    pub fn new() -> Self {
        Self {
            buf: BytesMut::new(),
        }
    }

    /// Append newly received body bytes
    pub fn push(&mut self, data: &[u8]) {
        self.buf.extend_from_slice(data);
    }

    /// Pop the next complete frame, if one is buffered
    pub fn next_frame(&mut self) -> Result<Option<UploadFrame>> {
        if self.buf.len() < LEN_PREFIX {
            return Ok(None);
        }
        let body_len = LittleEndian::read_u32(&self.buf[..LEN_PREFIX]) as usize;
        if body_len > MAX_FRAME_LEN {
            return Err(VeristoreError::FrameTooLarge {
                size: body_len,
                max: MAX_FRAME_LEN,
            });
        }
        if self.buf.len() < LEN_PREFIX + body_len {
            return Ok(None);
        }

        let _ = self.buf.split_to(LEN_PREFIX);
        let body = self.buf.split_to(body_len);
        let frame = bincode::deserialize(&body)?;
        Ok(Some(frame))
    }

    /// True when no partial frame is left buffered
    pub fn is_drained(&self) -> bool {
        self.buf.is_empty()
    }
}
