//! Solder server binary entry point.
//!
//! Parses command-line arguments, initializes logging, builds the first
//! bundle and serves the Solder API. For library usage, see the
//! solder-server crate documentation.

use anyhow::Result;
use solder_server::{Server, ServerConfig};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = ServerConfig::from_args();

    tracing::info!(
        "Configuration loaded: modpack={}, base_url={}, server_dir={:?}, listen={}",
        config.modpack_id,
        config.base_url(),
        config.server_dir,
        config.listen_addr()
    );

    config.validate()?;

    Server::new(config).run().await?;

    Ok(())
}
