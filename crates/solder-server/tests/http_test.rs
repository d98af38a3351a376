//! Integration tests for the Solder HTTP API.
//!
//! These tests build bundles from a real server directory, start a real HTTP
//! server and make actual requests.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

mod common;

use axum::http::StatusCode;
use common::Fixture;
use solder_server::{AppState, ContentHash, ModpackInfo, ModpackSource};
use std::net::SocketAddr;
use std::sync::Arc;
use tempfile::TempDir;

const MODPACK_ID: &str = "testpack";

/// Log sink shared between the subscriber and the test.
#[derive(Clone, Default)]
struct CapturedLog(Arc<parking_lot::Mutex<Vec<u8>>>);

impl CapturedLog {
    fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock()).into_owned()
    }
}

impl std::io::Write for CapturedLog {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

struct TestServer {
    addr: SocketAddr,
    state: Arc<AppState>,
    fixture: Fixture,
    _resources: TempDir,
}

impl TestServer {
    fn url(&self, path: &str) -> String {
        format!("http://{}{path}", self.addr)
    }

    async fn get_json(&self, path: &str) -> serde_json::Value {
        let response = reqwest::get(self.url(path))
            .await
            .expect("Failed to send GET request to test server");
        assert_eq!(response.status(), StatusCode::OK, "GET {path}");
        let body = response.text().await.expect("Failed to read response body");
        serde_json::from_str(&body).expect("Response should be JSON")
    }

    async fn status(&self, path: &str) -> StatusCode {
        reqwest::get(self.url(path))
            .await
            .expect("Failed to send GET request to test server")
            .status()
    }
}

/// Start test HTTP server on random port.
async fn start_test_server() -> TestServer {
    // Install ring crypto provider for reqwest (idempotent)
    let _ = rustls::crypto::ring::default_provider().install_default();

    let fixture = Fixture::new();
    let resources = tempfile::tempdir().expect("Failed to create resources directory");
    std::fs::write(resources.path().join("icon.png"), b"\x89PNG icon").unwrap();

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind HTTP listener");
    let addr = listener
        .local_addr()
        .expect("Failed to get listener address");

    let info = ModpackInfo {
        id: MODPACK_ID.to_string(),
        name: "Test Pack".to_string(),
        base_url: format!("http://{addr}/"),
    };
    let source = ModpackSource::new(fixture.layout(), info.base_url.clone());
    let state = Arc::new(AppState::with_source(
        info,
        Arc::new(source),
        resources.path().to_path_buf(),
    ));
    let app = solder_server::http::create_router(state.clone());

    tokio::spawn(async move {
        axum::serve(listener, app)
            .await
            .expect("HTTP server failed to run");
    });

    // Give server time to start
    tokio::time::sleep(tokio::time::Duration::from_millis(100)).await;

    TestServer {
        addr,
        state,
        fixture,
        _resources: resources,
    }
}

#[tokio::test]
async fn test_api_info() {
    let server = start_test_server().await;

    for path in ["/api", "/api/"] {
        let json = server.get_json(path).await;
        assert_eq!(json["api"], "TechnicSolder");
        assert_eq!(json["version"], "v0.7.4.0");
        assert_eq!(json["stream"], "DEV");
    }
}

#[tokio::test]
async fn test_api_info_is_pretty_printed() {
    let server = start_test_server().await;

    let response = reqwest::get(server.url("/api/")).await.unwrap();
    let content_type = response
        .headers()
        .get("content-type")
        .expect("Response should have content-type header")
        .to_str()
        .unwrap()
        .to_string();
    assert!(content_type.starts_with("application/json"));

    let body = response.text().await.unwrap();
    assert!(body.contains("\n    \"api\": \"TechnicSolder\""));
}

#[tokio::test]
async fn test_verify_key() {
    let server = start_test_server().await;

    let json = server.get_json("/api/verify/0123abcdEF").await;
    assert_eq!(json["valid"], "Key validated.");

    assert_eq!(server.status("/api/verify/not-hex").await, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_list_modpacks() {
    let server = start_test_server().await;

    let json = server.get_json("/api/modpack/").await;
    assert_eq!(json["modpacks"][MODPACK_ID], "Test Pack");
    assert_eq!(json["mirror_url"], server.url("/"));
    assert!(server.state.coordinator().current().is_none());

    let json = server.get_json("/api/modpack/?include=full").await;
    let summary = &json["modpacks"][MODPACK_ID];
    assert_eq!(summary["display_name"], "Test Pack");
    assert_eq!(summary["builds"].as_array().unwrap().len(), 1);
    assert!(server.state.coordinator().current().is_some());
}

#[tokio::test]
async fn test_describe_modpack() {
    let server = start_test_server().await;

    let json = server.get_json(&format!("/api/modpack/{MODPACK_ID}/")).await;
    assert_eq!(json["name"], MODPACK_ID);
    assert_eq!(json["display_name"], "Test Pack");
    assert_eq!(json["icon"], server.url("/resources/icon.png"));
    assert!(json["url"].is_null());

    let version = server.state.coordinator().current().unwrap().version_id().to_string();
    assert_eq!(json["recommended"], version.as_str());
    assert_eq!(json["latest"], version.as_str());
    assert_eq!(json["builds"][0], version.as_str());

    assert_eq!(
        server.status("/api/modpack/otherpack/").await,
        StatusCode::NOT_FOUND
    );
}

#[tokio::test]
async fn test_describe_build() {
    let server = start_test_server().await;
    let summary = server.get_json(&format!("/api/modpack/{MODPACK_ID}")).await;
    let version = summary["latest"].as_str().unwrap().to_string();

    let json = server
        .get_json(&format!("/api/modpack/{MODPACK_ID}/{version}"))
        .await;
    assert_eq!(json["minecraft"], "1.12.2");
    assert_eq!(json["java"], "1.8");
    assert_eq!(json["memory"], "0");
    assert!(json["forge"].is_null());

    let mods = json["mods"].as_array().unwrap();
    assert_eq!(mods.len(), 5);
    assert_eq!(mods[0]["name"], "curseforge_jei");
    assert_eq!(mods[3]["name"], "_forge");
    assert_eq!(mods[4]["name"], "_config");
    for entry in mods {
        assert!(entry["filesize"].is_string());
        assert_eq!(entry["md5"].as_str().unwrap().len(), 32);
        assert_eq!(entry["version"].as_str().unwrap().len(), 16);
    }

    assert_eq!(
        server
            .status(&format!("/api/modpack/{MODPACK_ID}/not-a-version"))
            .await,
        StatusCode::NOT_FOUND
    );
}

#[tokio::test]
async fn test_outdated_build_names_current() {
    let mut server = start_test_server().await;
    let summary = server.get_json(&format!("/api/modpack/{MODPACK_ID}/")).await;
    let old_version = summary["latest"].as_str().unwrap().to_string();

    server
        .fixture
        .set_mod("curseforge:jei", "jei_1.12.2-4.16.1.303.jar", b"newer jei");
    server.state.coordinator().invalidate();

    let json = server
        .get_json(&format!("/api/modpack/{MODPACK_ID}/{old_version}"))
        .await;
    let new_version = server.state.coordinator().current().unwrap().version_id().to_string();
    assert_ne!(old_version, new_version);

    let error = json["error"].as_str().expect("Outdated reply carries an error");
    assert!(error.contains("This build is out of date"));
    assert!(error.contains(&format!("select build {new_version}")));
    assert!(!error.contains(&old_version));
}

#[tokio::test]
async fn test_download_blob() {
    let server = start_test_server().await;
    let summary = server.get_json(&format!("/api/modpack/{MODPACK_ID}/")).await;
    let version = summary["latest"].as_str().unwrap().to_string();
    let build = server
        .get_json(&format!("/api/modpack/{MODPACK_ID}/{version}"))
        .await;

    for entry in build["mods"].as_array().unwrap() {
        let url = entry["url"].as_str().unwrap();
        let response = reqwest::get(url).await.expect("Failed to download blob");
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get("content-type").unwrap(),
            "application/zip"
        );

        let body = response.bytes().await.unwrap();
        assert_eq!(body.len().to_string(), entry["filesize"].as_str().unwrap());
        let hash = ContentHash::of(&body);
        assert!(url.ends_with(&format!("/download/{hash}.zip")));
        assert!(hash.to_hex().starts_with(entry["version"].as_str().unwrap()));
    }
}

#[tokio::test]
async fn test_download_unknown_blob() {
    let server = start_test_server().await;
    server.get_json(&format!("/api/modpack/{MODPACK_ID}/")).await;

    let unknown = ContentHash::of(b"not in the bundle");
    assert_eq!(
        server.status(&format!("/download/{unknown}.zip")).await,
        StatusCode::NOT_FOUND
    );
    assert_eq!(server.status("/download/zzzz.zip").await, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_resources_are_served() {
    let server = start_test_server().await;

    let response = reqwest::get(server.url("/resources/icon.png")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(&response.bytes().await.unwrap()[..], b"\x89PNG icon");

    assert_eq!(
        server.status("/resources/logo.png").await,
        StatusCode::NOT_FOUND
    );
}

#[tokio::test]
async fn test_failed_build_returns_server_error() {
    let server = start_test_server().await;
    server.fixture.remove_forge();

    assert_eq!(
        server.status(&format!("/api/modpack/{MODPACK_ID}/")).await,
        StatusCode::INTERNAL_SERVER_ERROR
    );
    assert!(server.state.coordinator().current().is_none());
}

#[tokio::test]
async fn test_requests_logged_at_info() {
    let log = CapturedLog::default();
    let writer = log.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .with_ansi(false)
        .with_writer(move || writer.clone())
        .finish();
    let _guard = tracing::subscriber::set_default(subscriber);

    let server = start_test_server().await;
    server.get_json("/api/verify/abcdef").await;
    tokio::time::sleep(tokio::time::Duration::from_millis(50)).await;

    let output = log.contents();
    assert!(output.contains("started processing request"), "{output}");
    assert!(output.contains("/api/verify/abcdef"), "{output}");
    assert!(output.contains("GET"), "{output}");
}
