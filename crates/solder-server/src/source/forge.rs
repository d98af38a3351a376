//! Installed forge (runtime patcher) detection.

use crate::error::ProbeError;
use std::path::{Path, PathBuf};

/// Locate the installed forge jar in the root of `server_dir`.
///
/// Universal jars win over installer leftovers; ties are broken by name so
/// the choice does not depend on directory iteration order.
pub fn installed_forge_file(server_dir: &Path) -> Result<PathBuf, ProbeError> {
    let entries = std::fs::read_dir(server_dir).map_err(|source| ProbeError::Io {
        path: server_dir.to_path_buf(),
        source,
    })?;

    let mut candidates = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|source| ProbeError::Io {
            path: server_dir.to_path_buf(),
            source,
        })?;
        let name = entry.file_name().to_string_lossy().into_owned();
        if is_forge_jar(&name) && entry.path().is_file() {
            candidates.push(name);
        }
    }

    candidates.sort_by(|a, b| {
        let a_universal = a.contains("universal");
        let b_universal = b.contains("universal");
        b_universal.cmp(&a_universal).then_with(|| a.cmp(b))
    });

    candidates
        .into_iter()
        .next()
        .map(|name| server_dir.join(name))
        .ok_or_else(|| ProbeError::RuntimeNotFound(server_dir.to_path_buf()))
}

/// Minecraft version the installed forge targets, if it can be determined.
pub fn installed_minecraft_version(server_dir: &Path) -> Result<Option<String>, ProbeError> {
    let forge = installed_forge_file(server_dir)?;
    Ok(forge
        .file_name()
        .and_then(|n| n.to_str())
        .and_then(minecraft_version_from_file_name))
}

fn is_forge_jar(name: &str) -> bool {
    name.starts_with("forge-") && name.ends_with(".jar") && !name.contains("installer")
}

/// `forge-1.12.2-14.23.5.2847-universal.jar` yields `1.12.2`.
fn minecraft_version_from_file_name(name: &str) -> Option<String> {
    let rest = name.strip_prefix("forge-")?.strip_suffix(".jar")?;
    let version = rest.split('-').next()?;
    let looks_like_version = !version.is_empty()
        && version.contains('.')
        && version.chars().all(|c| c.is_ascii_digit() || c == '.');
    looks_like_version.then(|| version.to_string())
}
