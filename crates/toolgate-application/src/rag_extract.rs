//! RAG Extract use case (C10): a materials-scoped sibling of C5 that reuses
//! the File Store (C3) write/outbox pipeline for ingestion, and scores
//! retrieval candidates with its own semantic + token-overlap blend per
//! §4.10 step 5 rather than Hybrid Search's fusion/rerank.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;

use toolgate_domain::entities::Chunk;
use toolgate_domain::error::{Error, Result};
use toolgate_domain::ports::providers::{EmbeddingProvider, VectorStoreProvider};
use toolgate_domain::ports::repositories::IndexOutboxRepository;
use toolgate_domain::ports::services::{ExtractedPassage, RagExtractService};
use toolgate_domain::utils::compute_content_hash;
use toolgate_domain::value_objects::TenantFingerprint;

use crate::config::RagConfig;
use crate::file_store::FileStoreService;
use crate::path_algebra::WriteMode;

const RAG_PROJECT: &str = "__rag_extract__";

/// Chunks materials into paragraph-bounded fragments capped at
/// `max_chunk_chars`, per §4.10 step 3.
fn chunk_materials(materials: &str, max_chunk_chars: usize) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut current = String::new();
    for paragraph in materials.split("\n\n") {
        if current.len() + paragraph.len() + 2 > max_chunk_chars && !current.is_empty() {
            chunks.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push_str("\n\n");
        }
        current.push_str(paragraph);
        while current.len() > max_chunk_chars {
            let split_at = current.char_indices().nth(max_chunk_chars).map_or(current.len(), |(i, _)| i);
            chunks.push(current[..split_at].to_owned());
            current = current[split_at..].to_owned();
        }
    }
    if !current.is_empty() {
        chunks.push(current);
    }
    chunks
}

/// Stable hash of the normalized concatenation, per §4.10 step 3.
fn normalized_hash(materials: &str) -> String {
    let normalized: String = materials.split_whitespace().collect::<Vec<_>>().join(" ");
    compute_content_hash(&normalized)
}

fn tokenize(text: &str) -> HashSet<String> {
    text.split(|c: char| !c.is_alphanumeric()).filter(|t| !t.is_empty()).map(str::to_lowercase).collect()
}

/// Jaccard overlap between the query's and a candidate's token sets — the
/// `token_overlap` term of §4.10 step 5's scorer, distinct from Hybrid
/// Search's BM25 lexical score.
fn token_overlap(query: &str, text: &str) -> f32 {
    let query_tokens = tokenize(query);
    if query_tokens.is_empty() {
        return 0.0;
    }
    let text_tokens = tokenize(text);
    let union = query_tokens.union(&text_tokens).count();
    if union == 0 {
        return 0.0;
    }
    query_tokens.intersection(&text_tokens).count() as f32 / union as f32
}

/// Ingests materials under a per-task virtual path on first sight, then
/// extracts the top matching passages via a dedicated semantic + lexical
/// overlap score (§4.10).
pub struct RagExtract {
    files: Arc<FileStoreService>,
    embedder: Arc<dyn EmbeddingProvider>,
    vector_store: Arc<dyn VectorStoreProvider>,
    chunks: Arc<dyn IndexOutboxRepository>,
    config: RagConfig,
    max_chunk_chars: usize,
}

impl RagExtract {
    pub fn new(
        files: Arc<FileStoreService>,
        embedder: Arc<dyn EmbeddingProvider>,
        vector_store: Arc<dyn VectorStoreProvider>,
        chunks: Arc<dyn IndexOutboxRepository>,
        config: RagConfig,
        max_chunk_chars: usize,
    ) -> Self {
        Self { files, embedder, vector_store, chunks, config, max_chunk_chars }
    }

    fn task_prefix(user_id: &str, task_id: &str) -> String {
        format!("/rag/{user_id}/{task_id}/")
    }

    /// Pre-namespacing fingerprint form: a single hash over `user_id:task_id`
    /// with no separate path segments, kept for backward compatibility.
    fn legacy_task_prefix(user_id: &str, task_id: &str) -> String {
        format!("/rag/{}/", compute_content_hash(&format!("{user_id}:{task_id}")))
    }

    fn task_marker_path(prefix: &str) -> String {
        format!("{prefix}.task")
    }

    /// §4.10 step 2: resolves an existing task row for `(user_id, task_id)`,
    /// falling back to the legacy fingerprint path before creating a fresh
    /// namespaced one.
    async fn resolve_task_prefix(&self, tenant: &TenantFingerprint, user_id: &str, task_id: &str, api_key: Option<&str>) -> Result<String> {
        let prefix = Self::task_prefix(user_id, task_id);
        if self.files.read(tenant, RAG_PROJECT, &Self::task_marker_path(&prefix)).await.is_ok() {
            return Ok(prefix);
        }
        let legacy_prefix = Self::legacy_task_prefix(user_id, task_id);
        if self.files.read(tenant, RAG_PROJECT, &Self::task_marker_path(&legacy_prefix)).await.is_ok() {
            return Ok(legacy_prefix);
        }
        self.files
            .write(tenant, RAG_PROJECT, &Self::task_marker_path(&prefix), WriteMode::Truncate, 0, &format!("{user_id}\t{task_id}"), api_key)
            .await?;
        Ok(prefix)
    }

    /// §4.10 steps 3-4: ingests `materials` if its normalized hash has not
    /// been seen for this task before, writing each fragment as an ordinary
    /// file so the existing write/outbox/index-worker pipeline chunks,
    /// embeds, and stores lexical rows for it — no bespoke ingestion path.
    async fn ingest_materials(&self, tenant: &TenantFingerprint, prefix: &str, materials: &str, api_key: Option<&str>) -> Result<()> {
        let hash_path = format!("{prefix}.hash");
        let hash = normalized_hash(materials);
        if let Ok(existing) = self.files.read(tenant, RAG_PROJECT, &hash_path).await {
            if existing.content == hash {
                return Ok(());
            }
        }

        for (i, fragment) in chunk_materials(materials, self.max_chunk_chars).iter().enumerate() {
            let path = format!("{prefix}fragment_{i:04}.md");
            self.files.write(tenant, RAG_PROJECT, &path, WriteMode::Truncate, 0, fragment, api_key).await?;
        }
        self.files.write(tenant, RAG_PROJECT, &hash_path, WriteMode::Truncate, 0, &hash, None).await?;
        Ok(())
    }
}

#[async_trait]
impl RagExtractService for RagExtract {
    async fn extract_key_info(
        &self,
        tenant: &TenantFingerprint,
        user_id: &str,
        task_id: &str,
        query: &str,
        materials: &str,
        top_k: usize,
        api_key: Option<&str>,
    ) -> Result<Vec<ExtractedPassage>> {
        if user_id.trim().is_empty() || task_id.trim().is_empty() {
            return Err(Error::invalid_argument("user_id and task_id must not be empty"));
        }
        if query.trim().is_empty() {
            return Err(Error::InvalidQuery { message: "query must not be empty".to_owned() });
        }
        if materials.trim().is_empty() || materials.len() > self.config.max_materials_size {
            return Err(Error::invalid_argument(format!("materials must be non-empty and at most {} bytes", self.config.max_materials_size)));
        }
        if top_k == 0 || top_k > self.config.top_k_limit {
            return Err(Error::invalid_argument(format!("top_k must be in [1, {}]", self.config.top_k_limit)));
        }

        let prefix = self.resolve_task_prefix(tenant, user_id, task_id, api_key).await?;
        self.ingest_materials(tenant, &prefix, materials, api_key).await?;

        let candidate_limit = (top_k * 4).max(16);
        let query_vector = self
            .embedder
            .embed_batch(&[query.to_owned()], api_key)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| Error::search_backend("embedding provider returned no vector for the query"))?;

        let matches = self.vector_store.search(tenant, RAG_PROJECT, &query_vector, candidate_limit).await?;
        if matches.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<_> = matches.iter().map(|m| m.chunk_id).collect();
        let cosine_by_id: HashMap<_, _> = matches.into_iter().map(|m| (m.chunk_id, m.score)).collect();

        let mut chunks = self.chunks.find_chunks_by_ids(tenant, RAG_PROJECT, &ids).await?;
        chunks.retain(|c| c.file_path.starts_with(prefix.as_str()));

        let mut scored: Vec<(Chunk, f32)> = chunks
            .into_iter()
            .map(|chunk| {
                let cosine = cosine_by_id.get(&chunk.id).copied().unwrap_or(0.0);
                let overlap = token_overlap(query, &chunk.text);
                let score = self.config.semantic_weight * cosine + self.config.lexical_weight * overlap;
                (chunk, score)
            })
            .collect();

        scored.sort_by(|a, b| {
            b.1.partial_cmp(&a.1)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.0.text.len().cmp(&b.0.text.len()))
        });
        scored.truncate(top_k);

        let served_ids: Vec<_> = scored.iter().map(|(c, _)| c.id).collect();
        if !served_ids.is_empty() {
            let _ = self.chunks.mark_served(&served_ids, Utc::now()).await;
        }

        Ok(scored.into_iter().map(|(chunk, score)| ExtractedPassage { file_path: chunk.file_path, text: chunk.text, score }).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chunking_respects_paragraph_boundaries_under_the_cap() {
        let materials = "first paragraph.\n\nsecond paragraph.\n\nthird paragraph.";
        let chunks = chunk_materials(materials, 40);
        assert!(chunks.iter().all(|c| c.len() <= 40 || !c.contains("\n\n")));
        assert!(chunks.len() >= 2);
    }

    #[test]
    fn hash_ignores_whitespace_differences() {
        let a = normalized_hash("hello   world");
        let b = normalized_hash("hello world");
        assert_eq!(a, b);
    }

    #[test]
    fn token_overlap_is_jaccard_similarity() {
        let overlap = token_overlap("rust tokio", "rust tokio async");
        assert!((overlap - 2.0 / 3.0).abs() < f32::EPSILON);
        assert_eq!(token_overlap("quasar", "rust tokio"), 0.0);
    }

    #[test]
    fn token_overlap_of_empty_query_is_zero() {
        assert_eq!(token_overlap("", "rust tokio"), 0.0);
    }

    #[test]
    fn legacy_prefix_differs_from_namespaced_prefix() {
        let namespaced = RagExtract::task_prefix("alice", "t1");
        let legacy = RagExtract::legacy_task_prefix("alice", "t1");
        assert_ne!(namespaced, legacy);
    }
}
