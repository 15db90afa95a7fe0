//! Provenance descriptors recorded alongside run reports.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Identifies the exact input a run consumed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct InputProvenance {
    /// Path the input was read from, as given by the caller.
    pub path: String,
    /// Hex encoded SHA-256 of the input bytes.
    pub sha256: String,
    /// Size of the input in bytes.
    pub bytes: u64,
}

impl InputProvenance {
    /// Builds a descriptor for `bytes` read from `path`.
    pub fn from_bytes(path: impl Into<String>, bytes: &[u8]) -> Self {
        Self {
            path: path.into(),
            sha256: hex::encode(Sha256::digest(bytes)),
            bytes: bytes.len() as u64,
        }
    }
}
