//! Server state management and orchestration.

use crate::config::ServerConfig;
use crate::coordinator::{BundleSource, UpdateCoordinator};
use crate::error::ServerError;
use crate::pipeline::ModpackSource;
use crate::source::SourceLayout;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::task::JoinHandle;

/// Static identity of the served modpack.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModpackInfo {
    /// Slug used in API paths
    pub id: String,
    /// Name shown in the launcher
    pub name: String,
    /// Public base URL, ending with `/`
    pub base_url: String,
}

/// Shared application state for HTTP handlers.
#[derive(Debug, Clone)]
pub struct AppState {
    modpack: ModpackInfo,
    coordinator: UpdateCoordinator,
    resources: PathBuf,
}

impl AppState {
    /// Create application state backed by the server directory in `config`.
    pub fn new(config: &ServerConfig) -> Self {
        let modpack = ModpackInfo {
            id: config.modpack_id.clone(),
            name: config.modpack_name.clone(),
            base_url: config.base_url(),
        };
        let source = ModpackSource::new(
            SourceLayout::new(&config.server_dir),
            modpack.base_url.clone(),
        );
        Self::with_source(modpack, Arc::new(source), config.resources.clone())
    }

    /// Create application state with an arbitrary bundle source.
    pub fn with_source(
        modpack: ModpackInfo,
        source: Arc<dyn BundleSource>,
        resources: PathBuf,
    ) -> Self {
        Self {
            modpack,
            coordinator: UpdateCoordinator::new(source),
            resources,
        }
    }

    #[must_use]
    pub const fn modpack(&self) -> &ModpackInfo {
        &self.modpack
    }

    #[must_use]
    pub const fn coordinator(&self) -> &UpdateCoordinator {
        &self.coordinator
    }

    /// Directory served under `/resources`.
    #[must_use]
    pub fn resources(&self) -> &std::path::Path {
        &self.resources
    }
}

/// Server orchestration.
pub struct Server {
    /// Shared application state
    state: Arc<AppState>,
    /// Server configuration
    config: ServerConfig,
}

impl Server {
    /// Create new server with configuration.
    pub fn new(config: ServerConfig) -> Self {
        let state = AppState::new(&config);
        tracing::info!(
            "Serving modpack '{}' ({}) from {}",
            state.modpack().name,
            state.modpack().id,
            config.server_dir.display()
        );

        Self {
            state: Arc::new(state),
            config,
        }
    }

    /// Build the initial bundle, then serve until interrupted.
    ///
    /// # Errors
    ///
    /// Returns `ServerError` if the initial build fails or the listener
    /// cannot be bound.
    pub async fn run(self) -> Result<(), ServerError> {
        tracing::info!("Starting Solder server");

        let bundle = self
            .state
            .coordinator()
            .ensure_fresh()
            .await
            .map_err(ServerError::InitialBuild)?;
        tracing::info!("Initial build {} ready", bundle.version_id());

        let addr = self.config.listen_addr();
        let state = Arc::clone(&self.state);

        let http_server = if self.config.has_tls() {
            self.spawn_tls(addr, state).await?
        } else {
            tracing::info!("Listening on port {} (http) ...", addr.port());
            tokio::spawn(async move {
                if let Err(e) = crate::http::start_server(addr, state).await {
                    tracing::error!("HTTP server failed: {e}");
                }
            })
        };

        tokio::signal::ctrl_c().await.map_err(|e| {
            ServerError::Shutdown(format!("Failed to listen for shutdown signal: {e}"))
        })?;

        tracing::info!("Shutdown signal received, stopping server");
        http_server.abort();

        Ok(())
    }

    #[cfg(feature = "tls")]
    async fn spawn_tls(
        &self,
        addr: SocketAddr,
        state: Arc<AppState>,
    ) -> Result<JoinHandle<()>, ServerError> {
        let tls = crate::http::load_tls_config(&self.config).await?;
        tracing::info!("Listening on port {} (https) ...", addr.port());
        Ok(tokio::spawn(async move {
            if let Err(e) = crate::http::start_tls_server(addr, tls, state).await {
                tracing::error!("HTTPS server failed: {e}");
            }
        }))
    }

    #[cfg(not(feature = "tls"))]
    async fn spawn_tls(
        &self,
        _addr: SocketAddr,
        _state: Arc<AppState>,
    ) -> Result<JoinHandle<()>, ServerError> {
        Err(crate::error::ConfigError::TlsConfig("built without the tls feature".to_string()).into())
    }

    /// Get shared application state (for testing).
    #[cfg(test)]
    #[must_use]
    pub const fn state(&self) -> &Arc<AppState> {
        &self.state
    }
}
