//! Client configuration archive.

use super::{Workspace, finish, memory_writer, pack_file, pack_tree};
use crate::error::ArchiveError;
use bytes::Bytes;
use std::path::Path;
use walkdir::WalkDir;

const CONFIG_DIR: &str = "config";

/// Paths under `config/` never shipped to clients: forge's per-machine mod
/// state, Ender IO's read-only recipe dump and DiscordChat credentials.
pub const EXCLUDED_PATHS: &[&str] = &[
    "fmlModState.properties",
    "enderio/recipes",
    "shadowfacts/DiscordChat",
];

/// Archive `config_dir` as `config/`, plus `extra_file` at the root if it
/// exists. Returns `None` when there is no config directory.
pub fn build_config_archive(
    config_dir: &Path,
    extra_file: Option<&Path>,
) -> Result<Option<Bytes>, ArchiveError> {
    if !config_dir.is_dir() {
        return Ok(None);
    }
    build_in(Workspace::new()?, config_dir, extra_file).map(Some)
}

/// Stage inside `workspace`, which is removed when this returns.
fn build_in(
    workspace: Workspace,
    config_dir: &Path,
    extra_file: Option<&Path>,
) -> Result<Bytes, ArchiveError> {
    let staged = workspace.join(CONFIG_DIR);
    copy_tree(config_dir, &staged)?;
    prune(&staged)?;

    let mut zip = memory_writer();
    pack_tree(&mut zip, workspace.path(), CONFIG_DIR)?;

    if let Some(extra) = extra_file.filter(|p| p.is_file()) {
        let name = extra
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        pack_file(&mut zip, extra, &name)?;
    }

    finish(zip)
}

fn copy_tree(from: &Path, to: &Path) -> Result<(), ArchiveError> {
    for entry in WalkDir::new(from) {
        let entry = entry?;
        let relative = entry
            .path()
            .strip_prefix(from)
            .map_err(|e| ArchiveError::io(entry.path())(std::io::Error::other(e)))?;
        let target = to.join(relative);

        if entry.file_type().is_dir() {
            std::fs::create_dir_all(&target).map_err(ArchiveError::io(&target))?;
        } else {
            std::fs::copy(entry.path(), &target).map_err(ArchiveError::io(entry.path()))?;
        }
    }
    Ok(())
}

fn prune(staged: &Path) -> Result<(), ArchiveError> {
    for excluded in EXCLUDED_PATHS {
        let path = staged.join(excluded);
        if path.is_dir() {
            std::fs::remove_dir_all(&path).map_err(ArchiveError::io(&path))?;
        } else if path.exists() {
            std::fs::remove_file(&path).map_err(ArchiveError::io(&path))?;
        }
    }
    Ok(())
}
