//! Embedding provider port (C4/C5): turns chunk text into dense vectors.

use async_trait::async_trait;

use crate::error::Result;

/// Port for computing dense vector embeddings.
///
/// Implementations call out to a concrete provider (OpenAI, a local
/// `fastembed` model, ...). The index worker resolves the caller's own API
/// key via the credential vault before calling this port, per §4.4.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Embed a batch of texts, preserving input order in the output.
    async fn embed_batch(&self, texts: &[String], api_key: Option<&str>) -> Result<Vec<Vec<f32>>>;

    /// Output vector dimension for this provider's configured model.
    fn dimensions(&self) -> usize;

    /// Model identifier, stored alongside each embedding for staleness checks.
    fn model_name(&self) -> &str;
}
