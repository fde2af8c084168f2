//! Disk-backed proof store: one record file per key
//!
//! Lets proof records survive verifier restarts. Each record carries its own
//! absolute expiry stamp so TTLs hold across processes.

use crate::core::error::{Result, VeristoreError};
use crate::proofstore::ProofStore;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

#[derive(Serialize, Deserialize)]
struct Record {
    expires_at_unix: Option<u64>,
    value: Vec<u8>,
}

impl Record {
    fn expired(&self) -> bool {
        match self.expires_at_unix {
            None => false,
            Some(at) => now_unix() >= at,
        }
    }
}

fn now_unix() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

/// Store rooted at a directory, one bincode file per key
pub struct DiskProofStore {
    root: PathBuf,
}

impl DiskProofStore {
    /// Open (creating if needed) a store rooted at `root`
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    fn record_path(&self, key: &str) -> PathBuf {
        // Keys are built from tenant and fileset ids; anything outside the
        // filename-safe set is flattened so a key can never escape the root.
        let sanitized: String = key
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        self.root.join(format!("{sanitized}.rec"))
    }

    fn read_record(path: &Path) -> Result<Option<Record>> {
        let bytes = match fs::read(path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let record = bincode::deserialize(&bytes)?;
        Ok(Some(record))
    }
}

impl ProofStore for DiskProofStore {
    fn set(&self, key: &str, value: Vec<u8>, ttl: Option<Duration>) -> Result<()> {
        let record = Record {
            expires_at_unix: ttl.map(|d| now_unix() + d.as_secs()),
            value,
        };
        let bytes = bincode::serialize(&record)?;

        // Write-then-rename so readers never observe a torn record.
        let path = self.record_path(key);
        let tmp = path.with_extension("rec.tmp");
        fs::write(&tmp, bytes)?;
        fs::rename(&tmp, &path)?;
        Ok(())
    }

    fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let path = self.record_path(key);
        match Self::read_record(&path)? {
            None => Ok(None),
            Some(record) if record.expired() => {
                let _ = fs::remove_file(&path);
                Ok(None)
            }
            Some(record) => Ok(Some(record.value)),
        }
    }

    fn remove(&self, key: &str) -> Result<()> {
        match fs::remove_file(self.record_path(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(VeristoreError::Io(e)),
        }
    }
}
