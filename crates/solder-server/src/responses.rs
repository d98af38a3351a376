//! JSON payloads of the Solder API.
//!
//! Field names follow the Technic Solder API consumed by the Technic
//! Launcher. Bodies are pretty-printed with four-space indentation, which
//! existing clients have always received.

use crate::bundle::{Bundle, BundleEntry};
use crate::server::ModpackInfo;
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use std::collections::BTreeMap;

/// API identity reported at `/api/`.
pub const API_NAME: &str = "TechnicSolder";
/// Solder version the responses are modelled on.
pub const API_VERSION: &str = "v0.7.4.0";
/// Release stream reported at `/api/`.
pub const API_STREAM: &str = "DEV";

/// Java version required by every build.
pub const JAVA_VERSION: &str = "1.8";

/// JSON response pretty-printed with four-space indentation.
#[derive(Debug, Clone)]
pub struct PrettyJson<T>(pub T);

impl<T: Serialize> IntoResponse for PrettyJson<T> {
    fn into_response(self) -> Response {
        let mut body = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut serializer = serde_json::Serializer::with_formatter(&mut body, formatter);

        match self.0.serialize(&mut serializer) {
            Ok(()) => (
                StatusCode::OK,
                [(header::CONTENT_TYPE, "application/json; charset=utf-8")],
                body,
            )
                .into_response(),
            Err(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response(),
        }
    }
}

/// `GET /api/`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApiInfo {
    pub api: &'static str,
    pub version: &'static str,
    pub stream: &'static str,
}

impl Default for ApiInfo {
    fn default() -> Self {
        Self {
            api: API_NAME,
            version: API_VERSION,
            stream: API_STREAM,
        }
    }
}

/// `GET /api/verify/{key}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KeyValidation {
    pub valid: &'static str,
}

impl KeyValidation {
    pub const fn accepted() -> Self {
        Self {
            valid: "Key validated.",
        }
    }
}

/// Bundle summary served at `GET /api/modpack/{id}/`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModpackSummary {
    pub name: String,
    pub display_name: String,
    pub url: Option<String>,
    pub icon: String,
    pub icon_md5: Option<String>,
    pub logo: String,
    pub logo_md5: Option<String>,
    pub background: String,
    pub background_md5: Option<String>,
    pub recommended: String,
    pub latest: String,
    pub builds: Vec<String>,
}

impl ModpackSummary {
    pub fn new(info: &ModpackInfo, bundle: &Bundle) -> Self {
        let version = bundle.version_id().to_string();
        let resource = |name: &str| format!("{}resources/{name}", info.base_url);
        Self {
            name: info.id.clone(),
            display_name: info.name.clone(),
            url: None,
            icon: resource("icon.png"),
            icon_md5: None,
            logo: resource("logo.png"),
            logo_md5: None,
            background: resource("background.png"),
            background_md5: None,
            recommended: version.clone(),
            latest: version.clone(),
            builds: vec![version],
        }
    }
}

/// Modpack listing at `GET /api/modpack/`: full summaries or display names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModpackList<T> {
    pub modpacks: BTreeMap<String, T>,
    pub mirror_url: String,
}

impl<T> ModpackList<T> {
    pub fn single(info: &ModpackInfo, item: T) -> Self {
        Self {
            modpacks: BTreeMap::from([(info.id.clone(), item)]),
            mirror_url: info.base_url.clone(),
        }
    }
}

/// Build descriptor at `GET /api/modpack/{id}/{version}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BuildDescriptor<'a> {
    pub minecraft: Option<&'a str>,
    pub java: &'static str,
    pub memory: &'static str,
    pub forge: Option<&'a str>,
    pub mods: &'a [BundleEntry],
}

impl<'a> BuildDescriptor<'a> {
    pub fn new(bundle: &'a Bundle) -> Self {
        Self {
            minecraft: bundle.minecraft_version(),
            java: JAVA_VERSION,
            memory: "0",
            forge: None,
            mods: bundle.entries(),
        }
    }
}

/// Reply to a request for a build other than the current one. Sent with
/// status 200; the launcher shows `error` to the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutdatedBuild {
    pub error: String,
}

impl OutdatedBuild {
    pub fn new(current: &str) -> Self {
        Self {
            error: format!(
                "\n\nThis build is out of date. Please go to Modpack Options and select build {current}.\nIf build {current} does not appear, try restarting the Technic Launcher."
            ),
        }
    }
}
