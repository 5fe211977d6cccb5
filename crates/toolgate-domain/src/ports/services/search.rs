//! Hybrid Search service port (C5), implemented by the application layer and
//! consumed by tool dispatch (C9) and the RAG extract service (C10).

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::entities::Chunk;
use crate::error::Result;
use crate::value_objects::TenantFingerprint;

/// One ranked search hit returned to a caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    pub chunk: Chunk,
    /// Final score after merge/rerank/fallback-fusion, in `[0.0, 1.0]`.
    pub score: f32,
}

/// Port for the merged semantic + lexical retrieval pipeline.
#[async_trait]
pub trait HybridSearchService: Send + Sync {
    /// Run a hybrid search scoped to one tenant/project and return the top
    /// `limit` chunks, ties broken by shorter chunk text per §4.5.
    ///
    /// `path_prefix`, when non-empty, matches `chunk.file_path` by raw string
    /// prefix rather than directory boundary.
    ///
    /// `api_key` is the caller's own credential, used to embed the query per
    /// §4.5 step 2; `None` embeds with the embedder's platform-default
    /// credential (service-internal callers, e.g. maintenance sweeps).
    async fn search(
        &self,
        tenant: &TenantFingerprint,
        project: &str,
        query: &str,
        path_prefix: &str,
        limit: usize,
        api_key: Option<&str>,
    ) -> Result<Vec<SearchHit>>;
}
