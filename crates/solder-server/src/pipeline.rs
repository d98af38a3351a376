//! Bundle rebuild procedure.
//!
//! Produces a complete [`Bundle`] from the server directory. Mods are listed
//! in manifest order, followed by `_forge` and, when a config directory exists,
//! `_config`. Mod blobs whose manifest digest is unchanged are taken from the
//! previous bundle instead of being re-archived.

use crate::archive::{build_config_archive, build_mod_archive, build_runtime_archive};
use crate::bundle::{BlobCache, Bundle, BundleEntry};
use crate::coordinator::BundleSource;
use crate::error::UpdateError;
use crate::hash::ContentHash;
use crate::source::{SourceLayout, installed_forge_file, installed_minecraft_version};
use async_trait::async_trait;
use bytes::Bytes;
use std::sync::Arc;
use std::time::SystemTime;

/// Entry name of the forge runtime archive.
pub const RUNTIME_ENTRY: &str = "_forge";
/// Entry name of the config archive.
pub const CONFIG_ENTRY: &str = "_config";

/// Bundle source backed by a Minecraft server directory.
#[derive(Debug, Clone)]
pub struct ModpackSource {
    layout: SourceLayout,
    base_url: String,
}

impl ModpackSource {
    /// `base_url` must end with `/`.
    pub fn new(layout: SourceLayout, base_url: impl Into<String>) -> Self {
        Self {
            layout,
            base_url: base_url.into(),
        }
    }

    pub const fn layout(&self) -> &SourceLayout {
        &self.layout
    }
}

#[async_trait]
impl BundleSource for ModpackSource {
    async fn staleness_marker(&self) -> Result<SystemTime, UpdateError> {
        let layout = self.layout.clone();
        tokio::task::spawn_blocking(move || layout.manifest_modified())
            .await
            .map_err(|e| UpdateError::Task(e.to_string()))?
            .map_err(UpdateError::from)
    }

    async fn build(&self, previous: Option<Arc<Bundle>>) -> Result<Bundle, UpdateError> {
        let layout = self.layout.clone();
        let base_url = self.base_url.clone();
        tokio::task::spawn_blocking(move || build_bundle(&layout, &base_url, previous.as_deref()))
            .await
            .map_err(|e| UpdateError::Task(e.to_string()))?
    }
}

/// Build a bundle from `layout`, reusing blobs from `previous` where possible.
///
/// `base_url` must end with `/`. Blocking; run it off the async executor.
pub fn build_bundle(
    layout: &SourceLayout,
    base_url: &str,
    previous: Option<&Bundle>,
) -> Result<Bundle, UpdateError> {
    let previous_blobs = previous.map(Bundle::blobs);
    let minecraft_version = installed_minecraft_version(layout.server_dir())?;
    let manifest = layout.read_manifest()?;

    let mut blobs = BlobCache::new();
    let mut entries = Vec::with_capacity(manifest.mods().len() + 2);

    for module in manifest.mods() {
        let reused = previous_blobs
            .and_then(|cache| cache.lookup_derived(&module.sha256))
            .map(|(hash, blob)| (hash, blob.clone()));

        let (hash, blob) = match reused {
            Some(found) => {
                tracing::debug!("Reusing archive for {}:{}", module.namespace, module.id);
                found
            }
            None => {
                tracing::debug!("Archiving {}:{}", module.namespace, module.id);
                let blob = build_mod_archive(&layout.mod_path(&module.file_name), &module.file_name)?;
                (ContentHash::of(&blob), blob)
            }
        };

        let name = format!("{}_{}", module.namespace, sanitize_name(&module.id));
        entries.push(BundleEntry::new(name, hash, &blob, base_url));
        blobs.insert_derived(module.sha256.clone(), hash, blob);
    }

    let forge = installed_forge_file(layout.server_dir())?;
    let runtime = build_runtime_archive(&forge)?;
    entries.push(store(&mut blobs, previous_blobs, RUNTIME_ENTRY, runtime, base_url));

    if let Some(config) = build_config_archive(&layout.config_dir(), Some(&layout.servers_dat()))? {
        entries.push(store(&mut blobs, previous_blobs, CONFIG_ENTRY, config, base_url));
    }

    Bundle::new(minecraft_version, entries, blobs).ok_or(UpdateError::DanglingEntry)
}

/// Insert a freshly built blob, sharing the previous allocation when the
/// content is unchanged.
fn store(
    blobs: &mut BlobCache,
    previous: Option<&BlobCache>,
    name: &str,
    blob: Bytes,
    base_url: &str,
) -> BundleEntry {
    let hash = ContentHash::of(&blob);
    let blob = previous
        .and_then(|cache| cache.lookup(&hash))
        .cloned()
        .unwrap_or(blob);
    let entry = BundleEntry::new(name, hash, &blob, base_url);
    blobs.insert(blob);
    entry
}

/// Restrict a mod id to characters safe in launcher file names.
pub fn sanitize_name(id: &str) -> String {
    id.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.') {
                c
            } else {
                '_'
            }
        })
        .collect()
}
