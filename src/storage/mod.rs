//! Bucket-addressed file storage service

pub mod bucket;
pub mod service;

pub use bucket::BucketStore;
pub use service::{router, StorageState};
