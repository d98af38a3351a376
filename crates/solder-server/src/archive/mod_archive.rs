//! Single-mod archives.

use super::{finish, memory_writer, pack_file};
use crate::error::ArchiveError;
use bytes::Bytes;
use std::path::Path;

/// Wrap one mod file as `mods/<file_name>`.
pub fn build_mod_archive(mod_path: &Path, file_name: &str) -> Result<Bytes, ArchiveError> {
    let mut zip = memory_writer();
    pack_file(&mut zip, mod_path, &format!("mods/{file_name}"))?;
    finish(zip)
}
