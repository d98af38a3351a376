//! Server configuration management.
//!
//! Configuration comes from positional CLI arguments (modpack identity and
//! server directory) plus optional flags, each of which can also be set
//! through a `SOLDER_*` environment variable.
//!
//! # Example
//!
//! ```no_run
//! use solder_server::ServerConfig;
//!
//! let config = ServerConfig::from_args();
//! config.validate().expect("Invalid configuration");
//!
//! println!("Serving {} at {}", config.modpack_id, config.base_url());
//! println!("Listening on {}", config.listen_addr());
//! ```

use clap::Parser;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;

/// Port used without TLS when `--port` is not given.
pub const DEFAULT_HTTP_PORT: u16 = 80;
/// Port used with TLS when `--port` is not given.
pub const DEFAULT_HTTPS_PORT: u16 = 443;

/// Server configuration loaded from CLI args and environment variables.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "solder-server",
    about = "Technic Solder compatible server for a single Minecraft modpack",
    version
)]
pub struct ServerConfig {
    /// Modpack slug used in API paths
    pub modpack_id: String,

    /// Modpack name shown in the launcher
    pub modpack_name: String,

    /// Public URL this server is reachable at
    pub base_url: String,

    /// Minecraft server directory holding the manifest, mods and config
    pub server_dir: PathBuf,

    /// Listening port (default 80, or 443 with TLS)
    #[arg(long, env = "SOLDER_PORT")]
    pub port: Option<u16>,

    /// Address to bind
    #[arg(long, env = "SOLDER_BIND_ADDRESS", default_value_t = IpAddr::V4(Ipv4Addr::UNSPECIFIED))]
    pub bind_address: IpAddr,

    /// Directory served under /resources (icon, logo, background)
    #[arg(long, env = "SOLDER_RESOURCES", default_value = "./resources")]
    pub resources: PathBuf,

    /// TLS private key file path (enables HTTPS together with `--cert`)
    #[arg(long, env = "SOLDER_TLS_KEY")]
    pub key: Option<PathBuf>,

    /// TLS certificate file path (required if `--key` is set)
    #[arg(long, env = "SOLDER_TLS_CERT")]
    pub cert: Option<PathBuf>,
}

impl ServerConfig {
    /// Parse configuration from command-line arguments.
    #[must_use]
    pub fn from_args() -> Self {
        Self::parse()
    }

    /// Base URL, always ending with `/`.
    #[must_use]
    pub fn base_url(&self) -> String {
        if self.base_url.ends_with('/') {
            self.base_url.clone()
        } else {
            format!("{}/", self.base_url)
        }
    }

    /// Check if TLS is configured.
    #[must_use]
    pub const fn has_tls(&self) -> bool {
        self.key.is_some() && self.cert.is_some()
    }

    /// Configured port, or the protocol default.
    #[must_use]
    pub fn effective_port(&self) -> u16 {
        self.port.unwrap_or(if self.has_tls() {
            DEFAULT_HTTPS_PORT
        } else {
            DEFAULT_HTTP_PORT
        })
    }

    #[must_use]
    pub fn listen_addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind_address, self.effective_port())
    }

    /// Validate configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if:
    /// - The modpack id is empty
    /// - The server directory doesn't exist
    /// - A TLS key is provided without a certificate (or vice versa)
    /// - TLS key/cert files don't exist
    pub fn validate(&self) -> Result<(), crate::error::ConfigError> {
        use crate::error::ConfigError;

        if self.modpack_id.is_empty() {
            return Err(ConfigError::MissingRequired("modpack id".to_string()));
        }

        if !self.server_dir.is_dir() {
            return Err(ConfigError::MissingRequired(format!(
                "server directory not found: {}",
                self.server_dir.display()
            )));
        }

        match (&self.key, &self.cert) {
            (Some(_key), None) => {
                return Err(ConfigError::TlsConfig(
                    "TLS private key provided without certificate".to_string(),
                ));
            }
            (None, Some(_cert)) => {
                return Err(ConfigError::TlsConfig(
                    "TLS certificate provided without private key".to_string(),
                ));
            }
            (Some(key), Some(cert)) => {
                if !key.exists() {
                    return Err(ConfigError::TlsConfig(format!(
                        "TLS private key file not found: {}",
                        key.display()
                    )));
                }
                if !cert.exists() {
                    return Err(ConfigError::TlsConfig(format!(
                        "TLS certificate file not found: {}",
                        cert.display()
                    )));
                }
                if !cfg!(feature = "tls") {
                    return Err(ConfigError::TlsConfig(
                        "built without the tls feature".to_string(),
                    ));
                }
            }
            (None, None) => {
                // Plain HTTP
            }
        }

        Ok(())
    }
}
