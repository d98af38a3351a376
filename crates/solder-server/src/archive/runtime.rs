//! Forge runtime archive.
//!
//! The launcher expects `bin/modpack.jar` and `bin/version.json`. The jar is
//! the installed forge jar with its signature (`META-INF/`) stripped and the
//! launch profile replaced by the patched one, which is also shipped next to
//! it.

use super::descriptor::{DESCRIPTOR_NAME, inject_runtime_options};
use super::{Workspace, finish, memory_writer, normalized_options, pack_tree};
use crate::error::ArchiveError;
use bytes::Bytes;
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;
use zip::result::ZipError;
use zip::{ZipArchive, ZipWriter};

const BIN_DIR: &str = "bin";
const JAR_NAME: &str = "modpack.jar";
const SIGNATURE_PREFIX: &str = "META-INF/";

/// Build the runtime archive from the installed forge jar.
pub fn build_runtime_archive(forge_jar: &Path) -> Result<Bytes, ArchiveError> {
    build_in(Workspace::new()?, forge_jar)
}

/// Stage inside `workspace`, which is removed when this returns.
fn build_in(workspace: Workspace, forge_jar: &Path) -> Result<Bytes, ArchiveError> {
    let bin = workspace.join(BIN_DIR);
    std::fs::create_dir_all(&bin).map_err(ArchiveError::io(&bin))?;

    let jar = bin.join(JAR_NAME);
    std::fs::copy(forge_jar, &jar).map_err(ArchiveError::io(forge_jar))?;

    let descriptor = read_descriptor(&jar)?;
    let patched = inject_runtime_options(&descriptor)?;

    let descriptor_path = bin.join(DESCRIPTOR_NAME);
    std::fs::write(&descriptor_path, &patched).map_err(ArchiveError::io(&descriptor_path))?;

    rewrite_jar(&jar, &patched)?;

    let mut zip = memory_writer();
    pack_tree(&mut zip, workspace.path(), BIN_DIR)?;
    finish(zip)
}

fn read_descriptor(jar: &Path) -> Result<Vec<u8>, ArchiveError> {
    let file = File::open(jar).map_err(ArchiveError::io(jar))?;
    let mut archive = ZipArchive::new(file)?;
    let mut entry = archive.by_name(DESCRIPTOR_NAME).map_err(|e| match e {
        ZipError::FileNotFound => ArchiveError::DescriptorMissing(DESCRIPTOR_NAME),
        other => other.into(),
    })?;

    let mut data = Vec::new();
    entry.read_to_end(&mut data).map_err(ArchiveError::io(jar))?;
    Ok(data)
}

/// Drop the signature and the old profile, then append `descriptor`.
///
/// Kept entries are copied raw so their compressed bytes and timestamps come
/// through unchanged.
fn rewrite_jar(jar: &Path, descriptor: &[u8]) -> Result<(), ArchiveError> {
    let staged = jar.with_extension("jar.tmp");
    {
        let source = File::open(jar).map_err(ArchiveError::io(jar))?;
        let mut archive = ZipArchive::new(source)?;
        let target = File::create(&staged).map_err(ArchiveError::io(&staged))?;
        let mut writer = ZipWriter::new(target);

        for i in 0..archive.len() {
            let entry = archive.by_index_raw(i)?;
            let name = entry.name();
            if name == DESCRIPTOR_NAME || name.starts_with(SIGNATURE_PREFIX) {
                continue;
            }
            writer.raw_copy_file(entry)?;
        }

        writer.start_file(DESCRIPTOR_NAME, normalized_options())?;
        writer
            .write_all(descriptor)
            .map_err(ArchiveError::io(&staged))?;
        writer.finish()?;
    }

    std::fs::rename(&staged, jar).map_err(ArchiveError::io(jar))
}
