use sha2::{Digest, Sha256};

/// SHA-256 hex digest of content for deduplication.
#[must_use]
pub fn compute_content_hash(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    hex::encode(hasher.finalize())
}
