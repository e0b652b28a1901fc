//! Fingerprint Module
//!
//! Maps request paths to fixed-size cache keys.

use std::fmt;

use sha2::{Digest, Sha256};

// == Fingerprint ==
/// Fixed-size SHA-256 digest used as a response cache key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Fingerprint([u8; 32]);

impl Fingerprint {
    /// Fingerprint scoped to a tenant: the domain and the path are hashed
    /// together so equal paths under different hosts never share a key.
    pub fn scoped(domain: &str, path: &str) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(domain.as_bytes());
        // Domains never contain NUL, so the split point is unambiguous.
        hasher.update([0u8]);
        hasher.update(path.as_bytes());
        Self::from_digest(&hasher.finalize())
    }

    fn from_digest(digest: &[u8]) -> Self {
        let mut bytes = [0u8; 32];
        bytes.copy_from_slice(digest);
        Self(bytes)
    }

    /// Lowercase hex rendering, the stable textual form of the key.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

// == Path Fingerprint ==
/// Computes the path-only fingerprint of a request path.
pub fn fingerprint(path: &str) -> Fingerprint {
    Fingerprint::from_digest(&Sha256::digest(path.as_bytes()))
}
