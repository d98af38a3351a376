//! Technic Solder compatible modpack server.
//!
//! This crate serves one Minecraft modpack to the Technic Launcher. The
//! modpack is published as a bundle of zip archives (one per mod, one for the
//! forge runtime, one for the client config), each addressed by the SHA-256
//! of its bytes. The bundle is rebuilt when the server's mod manifest
//! changes, reusing archives whose inputs did not.
//!
//! # Architecture
//!
//! - `source`: Read-only probes over the server directory (manifest, forge)
//! - `archive`: Deterministic zip construction in scoped workspaces
//! - `hash`: Content hashes and version ids
//! - `bundle`: Immutable bundle snapshots and their blob cache
//! - `pipeline`: The rebuild procedure
//! - `coordinator`: Staleness detection and single-flight rebuilds
//! - `http`, `responses`: The Solder API surface
//! - `server`, `config`: Orchestration and configuration
//!
//! # Example
//!
//! ```no_run
//! use solder_server::{Server, ServerConfig};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     tracing_subscriber::fmt::init();
//!
//!     let config = ServerConfig::from_args();
//!     config.validate()?;
//!
//!     Server::new(config).run().await?;
//!     Ok(())
//! }
//! ```

#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod archive;
pub mod bundle;
pub mod config;
pub mod coordinator;
pub mod error;
pub mod hash;
pub mod http;
pub mod pipeline;
pub mod responses;
pub mod server;
pub mod source;

// Re-exports for public API
pub use bundle::{BlobCache, Bundle, BundleEntry};
pub use config::ServerConfig;
pub use coordinator::{BundleSource, UpdateCoordinator, UpdateResult};
pub use error::{ArchiveError, ConfigError, ProbeError, ServerError, UpdateError};
pub use hash::{ContentHash, VersionId};
pub use pipeline::{ModpackSource, build_bundle};
pub use server::{AppState, ModpackInfo, Server};
pub use source::SourceLayout;
