//! Layered configuration: TOML file, then environment overrides
//!
//! Values resolve in order: built-in defaults, then the config file, then
//! `VERISTORE_*` environment variables. Environment values always win.

use crate::core::error::{Result, VeristoreError};
use directories::UserDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default verifier API port
pub const DEFAULT_VERIFIER_PORT: u16 = 50051;

/// Default storage API port
pub const DEFAULT_STORAGE_PORT: u16 = 9000;

/// Application configuration shared by the services and the client CLI
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub app: AppSection,
    pub log: LogSection,
    pub listen: ListenSection,
    pub storage: StorageSection,
    pub proof_store: ProofStoreSection,
    pub storage_api: StorageApiSection,
    pub verifier_api: VerifierApiSection,
    pub client: ClientSection,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppSection {
    pub name: String,
    pub version: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LogSection {
    /// error | warn | info | debug | trace
    pub level: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ListenSection {
    /// Port a service binds; which service is decided by the subcommand
    pub port: Option<u16>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageSection {
    /// Root directory of the bucket store
    pub location: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProofStoreSection {
    /// Directory of the disk-backed proof store; unset = in-memory
    pub path: Option<PathBuf>,
    /// TTL of persisted proof records in seconds; unset = unbounded
    pub ttl_secs: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageApiSection {
    /// Storage service endpoint, as seen by the verifier and the client
    pub endpoint: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VerifierApiSection {
    /// Verifier service endpoint, as seen by the client
    pub endpoint: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientSection {
    pub tenant_id: String,
    /// Max concurrent file uploads
    pub upload_workers: usize,
    /// Upload chunk size in bytes
    pub chunk_size: usize,
    /// Local directory downloads land in
    pub download_dir: PathBuf,
}

impl Default for AppSection {
    fn default() -> Self {
        Self {
            name: "veristore".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

impl Default for LogSection {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl Default for ListenSection {
    fn default() -> Self {
        Self { port: None }
    }
}

impl Default for StorageSection {
    fn default() -> Self {
        Self {
            location: PathBuf::from("./veristore-data"),
        }
    }
}

impl Default for ProofStoreSection {
    fn default() -> Self {
        Self {
            path: None,
            ttl_secs: None,
        }
    }
}

impl Default for StorageApiSection {
    fn default() -> Self {
        Self {
            endpoint: format!("http://localhost:{DEFAULT_STORAGE_PORT}"),
        }
    }
}

impl Default for VerifierApiSection {
    fn default() -> Self {
        Self {
            endpoint: format!("http://localhost:{DEFAULT_VERIFIER_PORT}"),
        }
    }
}

impl Default for ClientSection {
    fn default() -> Self {
        Self {
            tenant_id: "tenant-local".to_string(),
            upload_workers: 8,
            chunk_size: crate::client::DEFAULT_CHUNK_SIZE,
            download_dir: PathBuf::from("./downloads"),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            app: AppSection::default(),
            log: LogSection::default(),
            listen: ListenSection::default(),
            storage: StorageSection::default(),
            proof_store: ProofStoreSection::default(),
            storage_api: StorageApiSection::default(),
            verifier_api: VerifierApiSection::default(),
            client: ClientSection::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration: explicit file if given, otherwise the default
    /// location if present, otherwise built-in defaults. Environment
    /// overrides are applied last in every case.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => match Self::default_path() {
                Some(default) if default.is_file() => Self::from_file(&default)?,
                _ => Self::default(),
            },
        };
        config.apply_env();
        Ok(config)
    }

    /// Parse a TOML config file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| {
            VeristoreError::configuration(format!("{}: {e}", path.display()))
        })
    }

    /// `~/.veristore/config.toml`
    pub fn default_path() -> Option<PathBuf> {
        UserDirs::new().map(|dirs| dirs.home_dir().join(".veristore").join("config.toml"))
    }

    /// Overlay `VERISTORE_*` environment variables
    pub fn apply_env(&mut self) {
        if let Ok(level) = std::env::var("VERISTORE_LOG_LEVEL") {
            self.log.level = level;
        }
        if let Ok(port) = std::env::var("VERISTORE_PORT") {
            if let Ok(port) = port.parse() {
                self.listen.port = Some(port);
            }
        }
        if let Ok(location) = std::env::var("VERISTORE_STORAGE_LOCATION") {
            self.storage.location = PathBuf::from(location);
        }
        if let Ok(path) = std::env::var("VERISTORE_PROOF_STORE_PATH") {
            self.proof_store.path = Some(PathBuf::from(path));
        }
        if let Ok(ttl) = std::env::var("VERISTORE_PROOF_TTL_SECS") {
            if let Ok(ttl) = ttl.parse() {
                self.proof_store.ttl_secs = Some(ttl);
            }
        }
        if let Ok(endpoint) = std::env::var("VERISTORE_STORAGE_ENDPOINT") {
            self.storage_api.endpoint = endpoint;
        }
        if let Ok(endpoint) = std::env::var("VERISTORE_VERIFIER_ENDPOINT") {
            self.verifier_api.endpoint = endpoint;
        }
        if let Ok(tenant) = std::env::var("VERISTORE_TENANT") {
            self.client.tenant_id = tenant;
        }
    }

    /// Proof record TTL as a duration
    pub fn proof_ttl(&self) -> Option<Duration> {
        self.proof_store.ttl_secs.map(Duration::from_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.log.level, "info");
        assert!(config.storage_api.endpoint.ends_with(":9000"));
        assert!(config.verifier_api.endpoint.ends_with(":50051"));
        assert!(config.proof_store.path.is_none());
        assert_eq!(config.client.upload_workers, 8);
    }

    #[test]
    fn test_from_file_partial_sections() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
[log]
level = "debug"

[storage]
location = "/srv/buckets"

[proof_store]
ttl_secs = 3600
"#,
        )?;

        let config = AppConfig::from_file(&path)?;
        assert_eq!(config.log.level, "debug");
        assert_eq!(config.storage.location, PathBuf::from("/srv/buckets"));
        assert_eq!(config.proof_ttl(), Some(Duration::from_secs(3600)));
        // Untouched sections keep their defaults.
        assert!(config.verifier_api.endpoint.ends_with(":50051"));
        Ok(())
    }

    #[test]
    fn test_env_overrides_file() {
        std::env::set_var("VERISTORE_LOG_LEVEL", "trace");
        let mut config = AppConfig::default();
        config.apply_env();
        assert_eq!(config.log.level, "trace");
        std::env::remove_var("VERISTORE_LOG_LEVEL");
    }

    #[test]
    fn test_malformed_file_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "log = 'not a table'").unwrap();
        assert!(AppConfig::from_file(&path).is_err());
    }
}
