//! Content hashing and version identifiers.
//!
//! Every blob is addressed by the SHA-256 of its bytes. The bundle version is
//! a SHA-256 accumulated over the hex digests of all entries, in entry order,
//! truncated to [`SHORT_LEN`] hex characters.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha2::{Digest, Sha256};
use std::fmt;
use std::str::FromStr;

/// Length of public version tags and version ids, in hex characters.
pub const SHORT_LEN: usize = 16;

/// SHA-256 digest of a blob.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ContentHash([u8; 32]);

impl ContentHash {
    /// Hash a byte sequence.
    pub fn of(data: &[u8]) -> Self {
        Self(Sha256::digest(data).into())
    }

    /// Parse from a 64 character hex string (either case).
    pub fn from_hex(hex: &str) -> Result<Self, hex::FromHexError> {
        let mut bytes = [0u8; 32];
        hex::decode_to_slice(hex, &mut bytes)?;
        Ok(Self(bytes))
    }

    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Lowercase hex encoding.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Human-facing tag: the first [`SHORT_LEN`] hex characters.
    pub fn short_tag(&self) -> String {
        short_tag(&self.to_hex()).to_string()
    }
}

impl fmt::Display for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl FromStr for ContentHash {
    type Err = hex::FromHexError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

impl Serialize for ContentHash {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for ContentHash {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

/// Truncate a hex digest to [`SHORT_LEN`] characters.
pub fn short_tag(digest: &str) -> &str {
    digest.get(..SHORT_LEN).unwrap_or(digest)
}

/// Public identifier of a bundle (16 lowercase hex characters).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VersionId(String);

impl VersionId {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Compare against a client supplied version, ignoring hex case.
    pub fn matches(&self, requested: &str) -> bool {
        self.0.eq_ignore_ascii_case(requested)
    }
}

impl fmt::Display for VersionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Accumulates entry digests into a [`VersionId`].
///
/// The hex text of each digest is fed, not the raw bytes. Order matters:
/// the same digests in a different order produce a different id.
#[derive(Debug, Clone, Default)]
pub struct VersionHasher {
    hasher: Sha256,
}

impl VersionHasher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn update(&mut self, digest: &ContentHash) {
        self.hasher.update(digest.to_hex().as_bytes());
    }

    pub fn finish(self) -> VersionId {
        let full = hex::encode(self.hasher.finalize());
        VersionId(short_tag(&full).to_string())
    }
}

/// Version id over an ordered sequence of digests.
pub fn version_id<'a>(digests: impl IntoIterator<Item = &'a ContentHash>) -> VersionId {
    let mut hasher = VersionHasher::new();
    for digest in digests {
        hasher.update(digest);
    }
    hasher.finish()
}

/// MD5 of a blob as lowercase hex, as expected by the launcher.
pub fn md5_hex(data: &[u8]) -> String {
    format!("{:x}", md5::compute(data))
}

/// True for a non-empty string of hex digits.
pub fn is_hex(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_hexdigit())
}
