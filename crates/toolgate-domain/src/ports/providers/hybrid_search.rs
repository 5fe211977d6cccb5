//! Lexical search and reranking ports: the other two legs of hybrid search.

use async_trait::async_trait;

use crate::error::Result;
use crate::value_objects::{ChunkId, TenantFingerprint};

/// One candidate returned by a lexical (BM25/FTS) search.
#[derive(Debug, Clone, PartialEq)]
pub struct LexicalMatch {
    pub chunk_id: ChunkId,
    /// BM25 rank score, higher is more relevant.
    pub score: f32,
}

/// Port for full-text search over chunk content.
#[async_trait]
pub trait LexicalSearchProvider: Send + Sync {
    /// Index (or re-index) one chunk's normalized text.
    async fn index(
        &self,
        tenant: &TenantFingerprint,
        project: &str,
        chunk_id: ChunkId,
        normalized_text: &str,
    ) -> Result<()>;

    /// Remove indexed text for the given chunk ids.
    async fn delete(
        &self,
        tenant: &TenantFingerprint,
        project: &str,
        chunk_ids: &[ChunkId],
    ) -> Result<()>;

    /// Return the `limit` best-matching chunks for `query` within scope.
    async fn search(
        &self,
        tenant: &TenantFingerprint,
        project: &str,
        query: &str,
        limit: usize,
    ) -> Result<Vec<LexicalMatch>>;
}

/// A merged semantic+lexical candidate, ready for the optional rerank pass.
#[derive(Debug, Clone, PartialEq)]
pub struct RerankCandidate {
    pub chunk_id: ChunkId,
    pub text: String,
    pub semantic_score: Option<f32>,
    pub lexical_score: Option<f32>,
}

/// Port for an external cross-encoder rerank call.
///
/// Consulted after semantic and lexical candidates are merged; on timeout or
/// provider failure the caller falls back to the min-max normalized weighted
/// fusion described in §4.5.
#[async_trait]
pub trait RerankProvider: Send + Sync {
    /// Rerank `candidates` against `query`, returning scores in the same order.
    async fn rerank(&self, query: &str, candidates: &[RerankCandidate]) -> Result<Vec<f32>>;
}
