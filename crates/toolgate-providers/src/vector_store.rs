//! In-process vector store provider (C5 dense-vector side), registered into
//! [`toolgate_domain::registry::vector_store`].
//!
//! Reference implementation: cosine similarity over an in-memory map, scoped
//! per `(tenant, project)`. A production deployment registers a real ANN
//! backend (Milvus, Qdrant, pgvector) behind the same
//! [`VectorStoreProvider`] port; SQLite carries no native vector index, so
//! this crate does not pretend to offer one.

use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;

use toolgate_domain::error::Result;
use toolgate_domain::ports::providers::{VectorMatch, VectorStoreProvider};
use toolgate_domain::registry::vector_store::{VectorStoreProviderConfig, VectorStoreProviderEntry, VECTOR_STORE_PROVIDERS};
use toolgate_domain::value_objects::{ChunkId, TenantFingerprint};

type ScopeKey = (String, String);

fn scope_key(tenant: &TenantFingerprint, project: &str) -> ScopeKey {
    (tenant.as_str().to_owned(), project.to_owned())
}

fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a <= f32::EPSILON || norm_b <= f32::EPSILON {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}

/// In-memory cosine-similarity vector store, scoped by `(tenant, project)`.
pub struct InMemoryVectorStore {
    scopes: DashMap<ScopeKey, DashMap<ChunkId, Vec<f32>>>,
}

impl InMemoryVectorStore {
    #[must_use]
    pub fn new() -> Self {
        Self { scopes: DashMap::new() }
    }
}

impl Default for InMemoryVectorStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl VectorStoreProvider for InMemoryVectorStore {
    async fn upsert(&self, tenant: &TenantFingerprint, project: &str, chunk_id: ChunkId, vector: &[f32]) -> Result<()> {
        let scope = self.scopes.entry(scope_key(tenant, project)).or_default();
        scope.insert(chunk_id, vector.to_vec());
        Ok(())
    }

    async fn delete(&self, tenant: &TenantFingerprint, project: &str, chunk_ids: &[ChunkId]) -> Result<()> {
        if let Some(scope) = self.scopes.get(&scope_key(tenant, project)) {
            for id in chunk_ids {
                scope.remove(id);
            }
        }
        Ok(())
    }

    async fn search(&self, tenant: &TenantFingerprint, project: &str, query_vector: &[f32], limit: usize) -> Result<Vec<VectorMatch>> {
        let Some(scope) = self.scopes.get(&scope_key(tenant, project)) else {
            return Ok(Vec::new());
        };
        let mut matches: Vec<VectorMatch> = scope
            .iter()
            .map(|entry| VectorMatch { chunk_id: *entry.key(), score: cosine_similarity(query_vector, entry.value()) })
            .collect();
        matches.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        matches.truncate(limit);
        Ok(matches)
    }
}

fn build(_config: &VectorStoreProviderConfig) -> std::result::Result<Arc<dyn VectorStoreProvider>, String> {
    Ok(Arc::new(InMemoryVectorStore::new()))
}

#[linkme::distributed_slice(VECTOR_STORE_PROVIDERS)]
static IN_MEMORY_ENTRY: VectorStoreProviderEntry = VectorStoreProviderEntry {
    name: "in_memory",
    description: "Cosine-similarity vector store held in process memory",
    build,
};

#[cfg(test)]
mod tests {
    use super::*;

    fn tenant() -> TenantFingerprint {
        TenantFingerprint::from_api_key("sk-test-key")
    }

    #[tokio::test]
    async fn search_ranks_the_closest_vector_first() {
        let store = InMemoryVectorStore::new();
        let t = tenant();
        let a = ChunkId::new();
        let b = ChunkId::new();
        store.upsert(&t, "proj", a, &[1.0, 0.0]).await.unwrap();
        store.upsert(&t, "proj", b, &[0.0, 1.0]).await.unwrap();

        let results = store.search(&t, "proj", &[1.0, 0.0], 2).await.unwrap();
        assert_eq!(results[0].chunk_id, a);
    }

    #[tokio::test]
    async fn delete_removes_a_chunk_from_future_searches() {
        let store = InMemoryVectorStore::new();
        let t = tenant();
        let a = ChunkId::new();
        store.upsert(&t, "proj", a, &[1.0, 0.0]).await.unwrap();
        store.delete(&t, "proj", &[a]).await.unwrap();

        let results = store.search(&t, "proj", &[1.0, 0.0], 10).await.unwrap();
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn scopes_are_isolated_by_tenant_and_project() {
        let store = InMemoryVectorStore::new();
        let t = tenant();
        let a = ChunkId::new();
        store.upsert(&t, "proj-a", a, &[1.0, 0.0]).await.unwrap();

        let results = store.search(&t, "proj-b", &[1.0, 0.0], 10).await.unwrap();
        assert!(results.is_empty());
    }
}
