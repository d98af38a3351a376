//! Read-only probes over the Minecraft server directory.
//!
//! Nothing here caches; every call reflects the file system as it is now.

pub mod forge;
pub mod manifest;

pub use forge::{installed_forge_file, installed_minecraft_version};
pub use manifest::{ManifestEntry, ModManifest};

use crate::error::ProbeError;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

/// Manifest file name inside the server directory.
pub const MANIFEST_FILE: &str = "glua-minecraft-tools-manifest.json";

/// Well-known paths inside a server directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceLayout {
    server_dir: PathBuf,
}

impl SourceLayout {
    pub fn new(server_dir: impl Into<PathBuf>) -> Self {
        Self {
            server_dir: server_dir.into(),
        }
    }

    pub fn server_dir(&self) -> &Path {
        &self.server_dir
    }

    pub fn manifest_path(&self) -> PathBuf {
        self.server_dir.join(MANIFEST_FILE)
    }

    pub fn mod_path(&self, file_name: &str) -> PathBuf {
        self.server_dir.join("mods").join(file_name)
    }

    pub fn config_dir(&self) -> PathBuf {
        self.server_dir.join("config")
    }

    pub fn servers_dat(&self) -> PathBuf {
        self.server_dir.join("servers.dat")
    }

    /// Last modification time of the manifest.
    pub fn manifest_modified(&self) -> Result<SystemTime, ProbeError> {
        let path = self.manifest_path();
        std::fs::metadata(&path)
            .and_then(|meta| meta.modified())
            .map_err(|source| ProbeError::Io { path, source })
    }

    pub fn read_manifest(&self) -> Result<ModManifest, ProbeError> {
        ModManifest::from_file(&self.manifest_path())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_paths() {
        let layout = SourceLayout::new("/srv/mc");
        assert_eq!(
            layout.manifest_path(),
            PathBuf::from("/srv/mc/glua-minecraft-tools-manifest.json")
        );
        assert_eq!(layout.mod_path("jei.jar"), PathBuf::from("/srv/mc/mods/jei.jar"));
        assert_eq!(layout.config_dir(), PathBuf::from("/srv/mc/config"));
        assert_eq!(layout.servers_dat(), PathBuf::from("/srv/mc/servers.dat"));
    }

    #[test]
    fn test_manifest_modified_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let layout = SourceLayout::new(dir.path());
        assert!(layout.manifest_modified().is_err());

        std::fs::write(layout.manifest_path(), b"{}").unwrap();
        assert!(layout.manifest_modified().is_ok());
    }
}
