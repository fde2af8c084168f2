//! Command-line interface for Veristore

use clap::{Parser, Subcommand};
use std::path::PathBuf;

pub mod commands;

/// Veristore - verifiable remote file storage
#[derive(Parser)]
#[command(
    name = "veristore",
    version,
    about = "Verifiable remote file storage backed by Merkle-tree attestation",
    long_about = "Upload filesets to an untrusted storage service and download any file \
with a cryptographic proof that the bytes are exactly what was uploaded."
)]
pub struct Cli {
    /// Path to a TOML config file (default: ~/.veristore/config.toml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Log level: error, warn, info, debug, trace
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the file storage service
    ServeStorage {
        /// Listen port (default: 9000)
        #[arg(long)]
        port: Option<u16>,

        /// Root directory of the bucket store
        #[arg(long)]
        root: Option<PathBuf>,
    },

    /// Run the verifier service
    ServeVerifier {
        /// Listen port (default: 50051)
        #[arg(long)]
        port: Option<u16>,

        /// Downstream storage service endpoint
        #[arg(long)]
        storage_endpoint: Option<String>,

        /// Directory of the disk-backed proof store (default: in-memory)
        #[arg(long)]
        proof_store: Option<PathBuf>,
    },

    /// Upload a local directory as a verified fileset
    Upload {
        /// Directory holding the files to upload
        dir: PathBuf,

        /// Tenant identifier
        #[arg(long)]
        tenant: Option<String>,

        /// Max concurrent file uploads
        #[arg(short, long)]
        workers: Option<usize>,

        /// Upload chunk size in bytes
        #[arg(long)]
        chunk_size: Option<usize>,

        /// Verifier service endpoint
        #[arg(long)]
        verifier: Option<String>,

        /// Storage service endpoint
        #[arg(long)]
        storage: Option<String>,

        /// Disable the progress bar
        #[arg(long)]
        no_progress: bool,
    },

    /// Download one file of a fileset and verify it
    Download {
        /// Fileset identifier (fs-…)
        fileset_id: String,

        /// File index in lexical order
        file_index: usize,

        /// Local download directory
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Tenant identifier
        #[arg(long)]
        tenant: Option<String>,

        /// Verifier service endpoint
        #[arg(long)]
        verifier: Option<String>,

        /// Storage service endpoint
        #[arg(long)]
        storage: Option<String>,
    },

    /// Ping the verifier service
    Ping {
        /// Name to greet
        #[arg(long)]
        name: Option<String>,

        /// Verifier service endpoint
        #[arg(long)]
        verifier: Option<String>,
    },
}
