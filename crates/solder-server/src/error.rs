//! Error types for the modpack server.
//!
//! All errors use thiserror for consistent error handling across the codebase.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while probing the server directory.
#[derive(Debug, Error)]
pub enum ProbeError {
    /// Failed to read a file or directory
    #[error("Failed to read {path}: {source}")]
    Io {
        /// Path that could not be read
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Invalid JSON in the mod manifest
    #[error("Invalid manifest {path}: {source}")]
    InvalidManifest {
        /// Path to the manifest
        path: PathBuf,
        /// Underlying parse error
        #[source]
        source: serde_json::Error,
    },

    /// Manifest key is not of the form `namespace:id`
    #[error("Invalid mod identifier in manifest: {0}")]
    InvalidModId(String),

    /// No installed forge jar in the server directory
    #[error("No forge installation found in {0}")]
    RuntimeNotFound(PathBuf),
}

/// Errors raised while building an archive.
#[derive(Debug, Error)]
pub enum ArchiveError {
    /// I/O failure inside the scoped workspace or on an input file
    #[error("Archive I/O error on {path}: {source}")]
    Io {
        /// File being processed
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Zip reader or writer failure
    #[error("Zip error: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// Directory traversal failure
    #[error("Failed to walk directory: {0}")]
    Walk(#[from] walkdir::Error),

    /// The runtime jar has no embedded `version.json`
    #[error("Runtime jar has no {0} entry")]
    DescriptorMissing(&'static str),

    /// The embedded descriptor could not be patched
    #[error("Invalid runtime descriptor: {0}")]
    InvalidDescriptor(String),
}

impl ArchiveError {
    pub(crate) fn io(path: impl Into<PathBuf>) -> impl FnOnce(std::io::Error) -> Self {
        let path = path.into();
        move |source| Self::Io { path, source }
    }
}

/// Errors that abort a bundle rebuild.
#[derive(Debug, Error)]
pub enum UpdateError {
    /// Source probe failed
    #[error("Probe failed: {0}")]
    Probe(#[from] ProbeError),

    /// Archive construction failed
    #[error("Archive build failed: {0}")]
    Archive(#[from] ArchiveError),

    /// An entry references a blob that was never stored
    #[error("Bundle references a blob missing from its cache")]
    DanglingEntry,

    /// The rebuild task panicked or was aborted
    #[error("Rebuild task failed: {0}")]
    Task(String),
}

/// Configuration-related errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// TLS configuration error
    #[error("TLS configuration error: {0}")]
    TlsConfig(String),

    /// Missing required configuration value
    #[error("Missing required configuration: {0}")]
    MissingRequired(String),
}

/// Server runtime errors.
#[derive(Debug, Error)]
pub enum ServerError {
    /// Failed to bind HTTP server
    #[error("Failed to bind HTTP server to {addr}: {source}")]
    HttpBindFailed {
        /// Address that failed to bind
        addr: std::net::SocketAddr,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// Initial bundle build failed
    #[error("Initial bundle build failed: {0}")]
    InitialBuild(#[source] std::sync::Arc<UpdateError>),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Server shutdown error
    #[error("Server shutdown error: {0}")]
    Shutdown(String),
}
