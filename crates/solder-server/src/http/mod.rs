//! HTTP/HTTPS server implementation using axum.

use crate::error::ServerError;
use crate::server::AppState;
use axum::Router;
use axum::routing::get;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::compression::CompressionLayer;
use tower_http::compression::predicate::{DefaultPredicate, NotForContentType, Predicate};
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer};
use tracing::Level;

pub mod handlers;

/// Create HTTP router with all endpoints.
pub fn create_router(state: Arc<AppState>) -> Router {
    // Blobs are zip archives already
    let compression = CompressionLayer::new()
        .compress_when(DefaultPredicate::new().and(NotForContentType::new("application/zip")));

    Router::new()
        .route("/api", get(handlers::handle_api_info))
        .route("/api/", get(handlers::handle_api_info))
        .route("/api/verify/{key}", get(handlers::handle_verify))
        .route("/api/modpack", get(handlers::handle_list_modpacks))
        .route("/api/modpack/", get(handlers::handle_list_modpacks))
        .route("/api/modpack/{id}", get(handlers::handle_describe_modpack))
        .route("/api/modpack/{id}/", get(handlers::handle_describe_modpack))
        .route(
            "/api/modpack/{id}/{version}",
            get(handlers::handle_describe_build),
        )
        .route("/download/{file}", get(handlers::handle_download))
        .nest_service("/resources", ServeDir::new(state.resources()))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(compression)
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Start HTTP server.
///
/// # Errors
///
/// Returns `ServerError` if the server fails to bind or encounters a runtime error.
pub async fn start_server(bind_addr: SocketAddr, state: Arc<AppState>) -> Result<(), ServerError> {
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(bind_addr)
        .await
        .map_err(|source| ServerError::HttpBindFailed {
            addr: bind_addr,
            source,
        })?;

    tracing::info!("HTTP server listening on {}", bind_addr);

    axum::serve(listener, app)
        .await
        .map_err(|e| ServerError::Shutdown(format!("HTTP server error: {e}")))?;

    Ok(())
}

/// Load the PEM key/certificate pair named in the configuration.
///
/// # Errors
///
/// Returns `ServerError::Config` if the files cannot be read or parsed.
#[cfg(feature = "tls")]
pub async fn load_tls_config(
    config: &crate::config::ServerConfig,
) -> Result<axum_server::tls_rustls::RustlsConfig, ServerError> {
    use crate::error::ConfigError;

    let (Some(cert), Some(key)) = (&config.cert, &config.key) else {
        return Err(ConfigError::TlsConfig("certificate and key are both required".to_string()).into());
    };

    // Idempotent; fails only if another provider was installed first
    let _ = rustls::crypto::ring::default_provider().install_default();

    axum_server::tls_rustls::RustlsConfig::from_pem_file(cert, key)
        .await
        .map_err(|e| ConfigError::TlsConfig(format!("failed to load key pair: {e}")).into())
}

/// Start HTTPS server.
///
/// # Errors
///
/// Returns `ServerError` if the server fails to bind or encounters a runtime error.
#[cfg(feature = "tls")]
pub async fn start_tls_server(
    bind_addr: SocketAddr,
    tls: axum_server::tls_rustls::RustlsConfig,
    state: Arc<AppState>,
) -> Result<(), ServerError> {
    let app = create_router(state);

    tracing::info!("HTTPS server listening on {}", bind_addr);

    axum_server::bind_rustls(bind_addr, tls)
        .serve(app.into_make_service())
        .await
        .map_err(|source| ServerError::HttpBindFailed {
            addr: bind_addr,
            source,
        })
}
