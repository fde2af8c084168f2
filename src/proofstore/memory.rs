//! In-memory proof store backed by a concurrent map

use crate::core::error::Result;
use crate::proofstore::ProofStore;
use dashmap::DashMap;
use std::time::{Duration, Instant};

struct Entry {
    value: Vec<u8>,
    expires_at: Option<Instant>,
}

impl Entry {
    fn expired(&self) -> bool {
        self.expires_at.is_some_and(|at| Instant::now() >= at)
    }
}

/// Process-local store; entries are evicted lazily on read
#[derive(Default)]
pub struct MemoryProofStore {
    entries: DashMap<String, Entry>,
}

impl MemoryProofStore {
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
        }
    }

    /// Number of live (unexpired) entries
    pub fn len(&self) -> usize {
        self.entries.iter().filter(|e| !e.value().expired()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ProofStore for MemoryProofStore {
    fn set(&self, key: &str, value: Vec<u8>, ttl: Option<Duration>) -> Result<()> {
        let expires_at = ttl.map(|d| Instant::now() + d);
        self.entries
            .insert(key.to_string(), Entry { value, expires_at });
        Ok(())
    }

    fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        if let Some(entry) = self.entries.get(key) {
            if !entry.expired() {
                return Ok(Some(entry.value.clone()));
            }
        } else {
            return Ok(None);
        }
        // Entry existed but expired; drop it.
        self.entries.remove(key);
        Ok(None)
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.entries.remove(key);
        Ok(())
    }
}
