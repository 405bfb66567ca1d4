//! Content digests for serialized scene state

use sha2::{Digest, Sha256};
use std::fmt;
use std::path::Path;

/// SHA-256 digest of a serialized scene.
///
/// The scene controller records the digest of every play snapshot it writes,
/// which makes "did stop restore exactly what play captured" a cheap equality
/// check instead of a file diff.
#[derive(Clone, Copy, Hash, Eq, PartialEq)]
pub struct SnapshotDigest([u8; 32]);

impl SnapshotDigest {
    /// Compute a digest from bytes
    pub fn from_bytes(data: &[u8]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(data);
        Self(hasher.finalize().into())
    }

    /// Compute a digest from a file's contents
    pub fn from_file<P: AsRef<Path>>(path: P) -> std::io::Result<Self> {
        let data = std::fs::read(path)?;
        Ok(Self::from_bytes(&data))
    }

    /// Get the digest as a hex string
    pub fn to_hex(&self) -> String {
        self.0.iter().map(|b| format!("{:02x}", b)).collect()
    }
}

impl fmt::Debug for SnapshotDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SnapshotDigest({})", &self.to_hex()[..16])
    }
}

impl fmt::Display for SnapshotDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", &self.to_hex()[..16])
    }
}
