//! Vector store provider port (C5): the semantic half of hybrid search.
//!
//! Scoped by `(tenant, project)` rather than an opaque collection id — the
//! gateway has exactly one implicit collection per project, not an
//! admin-managed namespace.

use async_trait::async_trait;

use crate::error::Result;
use crate::value_objects::{ChunkId, TenantFingerprint};

/// One candidate returned by a similarity search.
#[derive(Debug, Clone, PartialEq)]
pub struct VectorMatch {
    pub chunk_id: ChunkId,
    /// Cosine similarity in `[-1.0, 1.0]`, or provider-native score.
    pub score: f32,
}

/// Port for storing and searching chunk embeddings.
#[async_trait]
pub trait VectorStoreProvider: Send + Sync {
    /// Upsert one chunk's vector, replacing any prior vector for the same id.
    async fn upsert(
        &self,
        tenant: &TenantFingerprint,
        project: &str,
        chunk_id: ChunkId,
        vector: &[f32],
    ) -> Result<()>;

    /// Remove vectors for the given chunk ids.
    async fn delete(
        &self,
        tenant: &TenantFingerprint,
        project: &str,
        chunk_ids: &[ChunkId],
    ) -> Result<()>;

    /// Return the `limit` nearest neighbors to `query_vector` within scope.
    async fn search(
        &self,
        tenant: &TenantFingerprint,
        project: &str,
        query_vector: &[f32],
        limit: usize,
    ) -> Result<Vec<VectorMatch>>;
}
