//! Deterministic zip archive construction.
//!
//! Each distributable unit of a bundle is one zip blob. Archives must be
//! byte-identical when their inputs are, so every entry is written with
//! [`normalized_options`]: a fixed modification time and fixed permissions,
//! regardless of what the file system reports. Directory walks are sorted by
//! file name.
//!
//! Procedures that need to stage files do so inside a [`Workspace`], a unique
//! temporary directory removed on every exit path.

pub mod config;
pub mod descriptor;
pub mod mod_archive;
pub mod runtime;

pub use config::build_config_archive;
pub use descriptor::inject_runtime_options;
pub use mod_archive::build_mod_archive;
pub use runtime::build_runtime_archive;

use crate::error::ArchiveError;
use bytes::Bytes;
use std::fs::File;
use std::io::{Cursor, Seek, Write};
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use walkdir::WalkDir;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, DateTime, ZipWriter};

const WORKSPACE_PREFIX: &str = "solder_";

/// Scoped temporary directory, removed recursively when dropped.
#[derive(Debug)]
pub struct Workspace {
    dir: TempDir,
}

impl Workspace {
    pub fn new() -> Result<Self, ArchiveError> {
        Self::new_in(std::env::temp_dir())
    }

    /// Create the workspace below `parent` instead of the system temp dir.
    pub fn new_in(parent: impl AsRef<Path>) -> Result<Self, ArchiveError> {
        let parent = parent.as_ref();
        let dir = tempfile::Builder::new()
            .prefix(WORKSPACE_PREFIX)
            .tempdir_in(parent)
            .map_err(ArchiveError::io(parent))?;
        Ok(Self { dir })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn join(&self, relative: impl AsRef<Path>) -> PathBuf {
        self.dir.path().join(relative)
    }
}

/// Entry options with modification times normalized to the zip epoch
/// (1980-01-01 00:00). Required for hash stability across rebuilds.
pub fn normalized_options() -> SimpleFileOptions {
    SimpleFileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .last_modified_time(DateTime::default())
        .unix_permissions(0o644)
}

/// Same as [`normalized_options`], but traversable once extracted.
pub fn directory_options() -> SimpleFileOptions {
    normalized_options().unix_permissions(0o755)
}

pub(crate) fn memory_writer() -> ZipWriter<Cursor<Vec<u8>>> {
    ZipWriter::new(Cursor::new(Vec::new()))
}

pub(crate) fn finish(zip: ZipWriter<Cursor<Vec<u8>>>) -> Result<Bytes, ArchiveError> {
    Ok(Bytes::from(zip.finish()?.into_inner()))
}

/// Add `base/relative` and everything below it, named relative to `base`.
pub(crate) fn pack_tree<W: Write + Seek>(
    zip: &mut ZipWriter<W>,
    base: &Path,
    relative: &str,
) -> Result<(), ArchiveError> {
    let options = normalized_options();
    let dir_options = directory_options();

    for entry in WalkDir::new(base.join(relative)).sort_by_file_name() {
        let entry = entry?;
        let path = entry.path();
        let name = path
            .strip_prefix(base)
            .map_err(|e| ArchiveError::io(path)(std::io::Error::other(e)))?
            .to_string_lossy()
            .replace('\\', "/");

        if entry.file_type().is_dir() {
            zip.add_directory(format!("{name}/"), dir_options)?;
        } else {
            zip.start_file(name, options)?;
            let mut file = File::open(path).map_err(ArchiveError::io(path))?;
            std::io::copy(&mut file, zip).map_err(ArchiveError::io(path))?;
        }
    }

    Ok(())
}

/// Add a single file at the archive root under `name`.
pub(crate) fn pack_file<W: Write + Seek>(
    zip: &mut ZipWriter<W>,
    path: &Path,
    name: &str,
) -> Result<(), ArchiveError> {
    let data = std::fs::read(path).map_err(ArchiveError::io(path))?;
    zip.start_file(name, normalized_options())?;
    zip.write_all(&data).map_err(ArchiveError::io(path))?;
    Ok(())
}
