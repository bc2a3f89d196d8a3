use std::fmt;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use super::chunk::ChunkingParams;

/// Bumped whenever chunking or the persisted index layout changes shape.
const INDEX_FORMAT_VERSION: u32 = 1;

/// Content key for a built index: SHA-256 over the document bytes, the
/// chunking parameters and the embedding provider identity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Fingerprint(String);

impl Fingerprint {
    pub fn compute(document: &[u8], params: ChunkingParams, provider_identity: &str) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(INDEX_FORMAT_VERSION.to_le_bytes());
        hasher.update((document.len() as u64).to_le_bytes());
        hasher.update(document);
        hasher.update((params.max_size as u64).to_le_bytes());
        hasher.update((params.overlap as u64).to_le_bytes());
        hasher.update(provider_identity.as_bytes());
        Self(format!("{:x}", hasher.finalize()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// First 16 hex characters, for names with length limits.
    pub fn short(&self) -> &str {
        &self.0[..16]
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_inputs_same_fingerprint() {
        let params = ChunkingParams::default();
        let a = Fingerprint::compute(b"notes", params, "text-embedding-004:768");
        let b = Fingerprint::compute(b"notes", params, "text-embedding-004:768");
        assert_eq!(a, b);
        assert_eq!(a.as_str().len(), 64);
        assert_eq!(a.short().len(), 16);
    }

    #[test]
    fn test_any_input_change_changes_fingerprint() {
        let params = ChunkingParams::default();
        let base = Fingerprint::compute(b"notes", params, "m:768");

        assert_ne!(base, Fingerprint::compute(b"notes!", params, "m:768"));
        assert_ne!(
            base,
            Fingerprint::compute(b"notes", ChunkingParams::new(1000, 100).unwrap(), "m:768")
        );
        assert_ne!(base, Fingerprint::compute(b"notes", params, "other:768"));
    }
}
