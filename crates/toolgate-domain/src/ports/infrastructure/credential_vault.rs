//! Transient credential envelope vault (C12).
//!
//! Lets the index worker pool make caller-scoped embedding calls without ever
//! persisting the caller's API key: the dispatch path stores a short-TTL,
//! encrypted envelope keyed by a job-scoped reference; the worker resolves
//! and immediately wipes it after use.

use async_trait::async_trait;

use crate::error::Result;

/// An opaque reference to a stashed credential envelope, safe to carry inside
/// an [`crate::entities::IndexJob`] row.
#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct CredentialRef(pub String);

/// Port for stashing and resolving transient caller credentials.
#[async_trait]
pub trait CredentialVault: Send + Sync {
    /// Encrypt and stash `api_key`, returning a reference valid for `ttl_secs`.
    async fn stash(&self, api_key: &str, ttl_secs: u64) -> Result<CredentialRef>;

    /// Decrypt and return the credential, then immediately evict it so a
    /// second resolution (retry or bug) fails closed rather than reusing it.
    async fn resolve_and_evict(&self, reference: &CredentialRef) -> Result<String>;
}
