//! RAG Extract service port (C10): a materials-scoped sibling of C5.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::value_objects::TenantFingerprint;

/// One extracted passage, carrying provenance back to its source file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractedPassage {
    pub file_path: String,
    pub text: String,
    pub score: f32,
}

/// Port for extracting key information from a `(user_id, task_id)`-scoped
/// materials set, per §4.10's `extract_key_info` call shape.
#[async_trait]
pub trait RagExtractService: Send + Sync {
    /// Ingests `materials` for `(user_id, task_id)` on first sight, then
    /// returns the top `top_k` passages matching `query`.
    async fn extract_key_info(
        &self,
        tenant: &TenantFingerprint,
        user_id: &str,
        task_id: &str,
        query: &str,
        materials: &str,
        top_k: usize,
        api_key: Option<&str>,
    ) -> Result<Vec<ExtractedPassage>>;
}
