//! Mod manifest reader.
//!
//! The manifest maps `namespace:id` keys to the installed file name and its
//! SHA-256. Entries are returned in document order.

use crate::error::ProbeError;
use serde::Deserialize;
use std::path::Path;

/// One mod listed in the manifest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestEntry {
    pub namespace: String,
    pub id: String,
    /// File name under the `mods/` directory
    pub file_name: String,
    /// SHA-256 of the mod file as recorded by the manifest
    pub sha256: String,
}

#[derive(Debug, Deserialize)]
struct RawManifest {
    #[serde(default)]
    mods: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawEntry {
    file_name: String,
    sha256: String,
}

/// Parsed mod manifest.
#[derive(Debug, Clone, Default)]
pub struct ModManifest {
    mods: Vec<ManifestEntry>,
}

impl ModManifest {
    /// Load a manifest from disk.
    pub fn from_file(path: &Path) -> Result<Self, ProbeError> {
        let data = std::fs::read(path).map_err(|source| ProbeError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_slice(&data).map_err(|e| match e {
            ManifestParseError::Json(source) => ProbeError::InvalidManifest {
                path: path.to_path_buf(),
                source,
            },
            ManifestParseError::Probe(e) => e,
        })
    }

    fn from_slice(data: &[u8]) -> Result<Self, ManifestParseError> {
        let raw: RawManifest = serde_json::from_slice(data).map_err(ManifestParseError::Json)?;

        let mut mods = Vec::with_capacity(raw.mods.len());
        for (key, value) in raw.mods {
            let (namespace, id) = key
                .split_once(':')
                .ok_or_else(|| ManifestParseError::Probe(ProbeError::InvalidModId(key.clone())))?;
            let entry: RawEntry = serde_json::from_value(value).map_err(ManifestParseError::Json)?;
            mods.push(ManifestEntry {
                namespace: namespace.to_string(),
                id: id.to_string(),
                file_name: entry.file_name,
                sha256: entry.sha256.to_ascii_lowercase(),
            });
        }

        Ok(Self { mods })
    }

    /// Mods in manifest order.
    pub fn mods(&self) -> &[ManifestEntry] {
        &self.mods
    }
}

#[derive(Debug)]
enum ManifestParseError {
    Json(serde_json::Error),
    Probe(ProbeError),
}
