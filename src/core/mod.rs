//! Core types, hashing, and error handling

pub mod error;
pub mod hash;
pub mod types;

pub use error::{ErrorKind, Result, VeristoreError};
pub use types::{BucketId, Hash, LeafHash, RootHash, TenantId};
