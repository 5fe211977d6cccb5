//! Hybrid Search use case (C5): semantic + lexical candidate retrieval,
//! merged by chunk id, optionally reranked, with min-max normalized weighted
//! fusion as the fallback scorer per §4.5.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;

use toolgate_domain::entities::Chunk;
use toolgate_domain::error::{Error, Result};
use toolgate_domain::ports::providers::{EmbeddingProvider, LexicalSearchProvider, RerankCandidate, RerankProvider, VectorStoreProvider};
use toolgate_domain::ports::repositories::IndexOutboxRepository;
use toolgate_domain::ports::services::{HybridSearchService, SearchHit};
use toolgate_domain::value_objects::TenantFingerprint;

use crate::config::SearchConfig;

/// Coordinates the embedding, vector-store, lexical-search, and optional
/// rerank calls behind one `search` entrypoint.
pub struct HybridSearch {
    embedder: Arc<dyn EmbeddingProvider>,
    vector_store: Arc<dyn VectorStoreProvider>,
    lexical: Arc<dyn LexicalSearchProvider>,
    rerank: Option<Arc<dyn RerankProvider>>,
    chunks: Arc<dyn IndexOutboxRepository>,
    config: SearchConfig,
}

impl HybridSearch {
    pub fn new(
        embedder: Arc<dyn EmbeddingProvider>,
        vector_store: Arc<dyn VectorStoreProvider>,
        lexical: Arc<dyn LexicalSearchProvider>,
        rerank: Option<Arc<dyn RerankProvider>>,
        chunks: Arc<dyn IndexOutboxRepository>,
        config: SearchConfig,
    ) -> Self {
        Self { embedder, vector_store, lexical, rerank, chunks, config }
    }
}

fn min_max_normalize(scores: &HashMap<toolgate_domain::value_objects::ChunkId, f32>) -> HashMap<toolgate_domain::value_objects::ChunkId, f32> {
    if scores.is_empty() {
        return HashMap::new();
    }
    let min = scores.values().copied().fold(f32::INFINITY, f32::min);
    let max = scores.values().copied().fold(f32::NEG_INFINITY, f32::max);
    let range = max - min;
    scores
        .iter()
        .map(|(id, score)| {
            let normalized = if range > f32::EPSILON { (score - min) / range } else { 1.0 };
            (*id, normalized)
        })
        .collect()
}

#[async_trait]
impl HybridSearchService for HybridSearch {
    async fn search(
        &self,
        tenant: &TenantFingerprint,
        project: &str,
        query: &str,
        path_prefix: &str,
        limit: usize,
        api_key: Option<&str>,
    ) -> Result<Vec<SearchHit>> {
        if query.trim().is_empty() {
            return Err(Error::InvalidQuery { message: "query must not be empty".to_owned() });
        }
        let limit = limit.min(self.config.limit_max).max(1);

        let query_vector = self.embedder.embed_batch(&[query.to_owned()], api_key).await;
        let semantic: HashMap<_, _> = match query_vector {
            Ok(vectors) => match vectors.into_iter().next() {
                Some(vector) => self
                    .vector_store
                    .search(tenant, project, &vector, self.config.vector_candidates)
                    .await
                    .unwrap_or_default()
                    .into_iter()
                    .map(|m| (m.chunk_id, m.score))
                    .collect(),
                None => HashMap::new(),
            },
            Err(_) => HashMap::new(),
        };

        let lexical: HashMap<_, _> = self
            .lexical
            .search(tenant, project, query, self.config.lexical_candidates)
            .await
            .unwrap_or_default()
            .into_iter()
            .map(|m| (m.chunk_id, m.score))
            .collect();

        if semantic.is_empty() && lexical.is_empty() {
            return Err(Error::search_backend("both semantic and lexical candidate retrieval failed"));
        }

        let mut candidate_ids: Vec<_> = semantic.keys().chain(lexical.keys()).copied().collect();
        candidate_ids.sort();
        candidate_ids.dedup();

        let mut chunks = self.chunks.find_chunks_by_ids(tenant, project, &candidate_ids).await?;
        if !path_prefix.is_empty() {
            chunks.retain(|c| c.file_path.starts_with(path_prefix));
        }
        let chunk_by_id: HashMap<_, _> = chunks.into_iter().map(|c| (c.id, c)).collect();

        let mut scored: Vec<(Chunk, f32)> = if let Some(rerank) = &self.rerank {
            let candidates: Vec<RerankCandidate> = chunk_by_id
                .values()
                .map(|c| RerankCandidate {
                    chunk_id: c.id,
                    text: c.text.clone(),
                    semantic_score: semantic.get(&c.id).copied(),
                    lexical_score: lexical.get(&c.id).copied(),
                })
                .collect();
            match rerank.rerank(query, &candidates).await {
                Ok(scores) if scores.len() == candidates.len() => candidates
                    .iter()
                    .zip(scores)
                    .filter_map(|(c, score)| chunk_by_id.get(&c.chunk_id).map(|chunk| (chunk.clone(), score)))
                    .collect(),
                _ => self.fallback_fusion(&chunk_by_id, &semantic, &lexical),
            }
        } else {
            self.fallback_fusion(&chunk_by_id, &semantic, &lexical)
        };

        scored.sort_by(|a, b| {
            b.1.partial_cmp(&a.1)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.0.text.len().cmp(&b.0.text.len()))
        });
        scored.truncate(limit);

        let served_at = Utc::now();
        let served_ids: Vec<_> = scored.iter().map(|(c, _)| c.id).collect();
        if !served_ids.is_empty() {
            let _ = self.chunks.mark_served(&served_ids, served_at).await;
        }

        Ok(scored.into_iter().map(|(chunk, score)| SearchHit { chunk, score }).collect())
    }
}

impl HybridSearch {
    fn fallback_fusion(
        &self,
        chunk_by_id: &HashMap<toolgate_domain::value_objects::ChunkId, Chunk>,
        semantic: &HashMap<toolgate_domain::value_objects::ChunkId, f32>,
        lexical: &HashMap<toolgate_domain::value_objects::ChunkId, f32>,
    ) -> Vec<(Chunk, f32)> {
        let semantic_norm = min_max_normalize(semantic);
        let lexical_norm = min_max_normalize(lexical);
        chunk_by_id
            .values()
            .map(|chunk| {
                let s = semantic_norm.get(&chunk.id).copied().unwrap_or(0.0);
                let l = lexical_norm.get(&chunk.id).copied().unwrap_or(0.0);
                let score = self.config.fallback_semantic_weight * s + self.config.fallback_lexical_weight * l;
                (chunk.clone(), score)
            })
            .collect()
    }
}
