//! Committed bundle snapshots and the blob cache they own.
//!
//! A [`Bundle`] is immutable once built. Rebuilds read the previous bundle's
//! [`BlobCache`] and fill a fresh one; the old cache is dropped with the old
//! bundle, so only blobs referenced by the current bundle stay in memory.

use crate::hash::{ContentHash, VersionId, md5_hex, version_id};
use bytes::Bytes;
use serde::Serialize;
use std::collections::HashMap;

/// Content-addressed blob storage for one bundle.
#[derive(Debug, Clone, Default)]
pub struct BlobCache {
    blobs: HashMap<ContentHash, Bytes>,
    /// Input digest (manifest sha256 of a mod file) to the blob built from it
    derived: HashMap<String, ContentHash>,
}

impl BlobCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lookup(&self, hash: &ContentHash) -> Option<&Bytes> {
        self.blobs.get(hash)
    }

    /// Blob previously built from the input with digest `source`.
    pub fn lookup_derived(&self, source: &str) -> Option<(ContentHash, &Bytes)> {
        let hash = self.derived.get(source)?;
        self.blobs.get(hash).map(|blob| (*hash, blob))
    }

    /// Store a blob under its own content hash.
    pub fn insert(&mut self, blob: Bytes) -> ContentHash {
        let hash = ContentHash::of(&blob);
        self.blobs.entry(hash).or_insert(blob);
        hash
    }

    /// Store a blob and remember which input it was built from.
    pub fn insert_derived(&mut self, source: impl Into<String>, hash: ContentHash, blob: Bytes) {
        self.blobs.entry(hash).or_insert(blob);
        self.derived.insert(source.into(), hash);
    }

    pub fn contains(&self, hash: &ContentHash) -> bool {
        self.blobs.contains_key(hash)
    }

    pub fn len(&self) -> usize {
        self.blobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blobs.is_empty()
    }

    /// Total bytes held.
    pub fn total_size(&self) -> usize {
        self.blobs.values().map(Bytes::len).sum()
    }
}

/// One distributable unit as listed to the launcher.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BundleEntry {
    pub name: String,
    /// Short prefix of the content hash
    #[serde(rename = "version")]
    pub version_tag: String,
    #[serde(skip)]
    pub content_hash: ContentHash,
    pub md5: String,
    /// Byte length, serialized as a string
    #[serde(rename = "filesize", serialize_with = "serialize_size")]
    pub size: u64,
    #[serde(rename = "url")]
    pub download_url: String,
}

fn serialize_size<S: serde::Serializer>(size: &u64, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(size)
}

impl BundleEntry {
    /// Describe `blob`, whose hash is `content_hash`, for download from `base_url`.
    pub fn new(
        name: impl Into<String>,
        content_hash: ContentHash,
        blob: &Bytes,
        base_url: &str,
    ) -> Self {
        Self {
            name: name.into(),
            version_tag: content_hash.short_tag(),
            content_hash,
            md5: md5_hex(blob),
            size: blob.len() as u64,
            download_url: download_url(base_url, &content_hash),
        }
    }
}

/// `<base>download/<hash>.zip`; `base_url` must end with `/`.
pub fn download_url(base_url: &str, hash: &ContentHash) -> String {
    format!("{base_url}download/{hash}.zip")
}

/// Immutable snapshot of everything served for one modpack version.
#[derive(Debug, Clone)]
pub struct Bundle {
    version_id: VersionId,
    minecraft_version: Option<String>,
    entries: Vec<BundleEntry>,
    blobs: BlobCache,
}

impl Bundle {
    /// Assemble a bundle. The version id is derived from the entries in order.
    ///
    /// Returns `None` if an entry references a blob missing from `blobs`.
    pub fn new(
        minecraft_version: Option<String>,
        entries: Vec<BundleEntry>,
        blobs: BlobCache,
    ) -> Option<Self> {
        if !entries.iter().all(|e| blobs.contains(&e.content_hash)) {
            return None;
        }
        let version_id = version_id(entries.iter().map(|e| &e.content_hash));
        Some(Self {
            version_id,
            minecraft_version,
            entries,
            blobs,
        })
    }

    pub const fn version_id(&self) -> &VersionId {
        &self.version_id
    }

    pub fn minecraft_version(&self) -> Option<&str> {
        self.minecraft_version.as_deref()
    }

    pub fn entries(&self) -> &[BundleEntry] {
        &self.entries
    }

    pub fn entry(&self, name: &str) -> Option<&BundleEntry> {
        self.entries.iter().find(|e| e.name == name)
    }

    pub const fn blobs(&self) -> &BlobCache {
        &self.blobs
    }

    /// Blob bytes by content hash (cheap clone).
    pub fn blob(&self, hash: &ContentHash) -> Option<Bytes> {
        self.blobs.lookup(hash).cloned()
    }
}
