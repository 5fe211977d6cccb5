//! Embedding providers (C4/C5 dense-vector side), registered into
//! [`toolgate_domain::registry::embedding`].

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use toolgate_domain::error::{Error, Result};
use toolgate_domain::ports::providers::EmbeddingProvider;
use toolgate_domain::registry::embedding::{EmbeddingProviderConfig, EmbeddingProviderEntry, EMBEDDING_PROVIDERS};

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
const DEFAULT_MODEL: &str = "text-embedding-3-small";
const DEFAULT_DIMENSIONS: usize = 1536;

/// Calls an OpenAI-compatible `/embeddings` endpoint over HTTP.
///
/// The caller's own API key (§4.4.1) is passed per-call and takes priority
/// over any key configured at startup; a provider with neither sends no
/// `Authorization` header, which is only valid against self-hosted endpoints
/// that don't require one.
pub struct HttpEmbeddingProvider {
    client: reqwest::Client,
    base_url: String,
    model: String,
    dimensions: usize,
    default_api_key: Option<String>,
}

impl HttpEmbeddingProvider {
    pub fn new(base_url: impl Into<String>, model: impl Into<String>, dimensions: usize, default_api_key: Option<String>) -> Self {
        Self {
            client: reqwest::Client::builder().timeout(Duration::from_secs(30)).build().unwrap_or_default(),
            base_url: base_url.into(),
            model: model.into(),
            dimensions,
            default_api_key,
        }
    }
}

#[derive(Serialize)]
struct EmbeddingsRequest<'a> {
    model: &'a str,
    input: &'a [String],
}

#[derive(Deserialize)]
struct EmbeddingsResponse {
    data: Vec<EmbeddingsDatum>,
}

#[derive(Deserialize)]
struct EmbeddingsDatum {
    embedding: Vec<f32>,
    index: usize,
}

#[async_trait]
impl EmbeddingProvider for HttpEmbeddingProvider {
    async fn embed_batch(&self, texts: &[String], api_key: Option<&str>) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        let key = api_key.map(str::to_owned).or_else(|| self.default_api_key.clone());

        let mut request = self.client.post(format!("{}/embeddings", self.base_url)).json(&EmbeddingsRequest { model: &self.model, input: texts });
        if let Some(key) = key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await.map_err(|e| Error::search_backend(format!("embedding request failed: {e}")))?;
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::search_backend(format!("embedding provider returned {status}: {body}")));
        }

        let mut parsed: EmbeddingsResponse = response.json().await.map_err(|e| Error::search_backend(format!("malformed embedding response: {e}")))?;
        parsed.data.sort_by_key(|d| d.index);
        if parsed.data.len() != texts.len() {
            return Err(Error::search_backend("embedding response size does not match request"));
        }
        Ok(parsed.data.into_iter().map(|d| d.embedding).collect())
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

fn build_http(config: &EmbeddingProviderConfig) -> std::result::Result<Arc<dyn EmbeddingProvider>, String> {
    Ok(Arc::new(HttpEmbeddingProvider::new(
        config.base_url.clone().unwrap_or_else(|| DEFAULT_BASE_URL.to_owned()),
        config.model.clone().unwrap_or_else(|| DEFAULT_MODEL.to_owned()),
        config.dimensions.unwrap_or(DEFAULT_DIMENSIONS),
        config.api_key.clone(),
    )))
}

#[linkme::distributed_slice(EMBEDDING_PROVIDERS)]
static HTTP_ENTRY: EmbeddingProviderEntry = EmbeddingProviderEntry {
    name: "openai-compatible",
    description: "Calls an OpenAI-compatible /embeddings HTTP endpoint",
    build: build_http,
};

/// Deterministic, network-free embedder: hashes each text into a fixed-size
/// vector. Registered for local development and integration tests that don't
/// want a real network dependency, not for production search quality.
pub struct DeterministicEmbeddingProvider {
    dimensions: usize,
}

impl DeterministicEmbeddingProvider {
    #[must_use]
    pub fn new(dimensions: usize) -> Self {
        Self { dimensions }
    }

    fn embed_one(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0.0f32; self.dimensions];
        for (i, byte) in text.bytes().enumerate() {
            let slot = i % self.dimensions;
            vector[slot] += f32::from(byte) / 255.0;
        }
        let norm = vector.iter().map(|v| v * v).sum::<f32>().sqrt();
        if norm > f32::EPSILON {
            for v in &mut vector {
                *v /= norm;
            }
        }
        vector
    }
}

#[async_trait]
impl EmbeddingProvider for DeterministicEmbeddingProvider {
    async fn embed_batch(&self, texts: &[String], _api_key: Option<&str>) -> Result<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|t| self.embed_one(t)).collect())
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn model_name(&self) -> &str {
        "deterministic-hash-v1"
    }
}

fn build_deterministic(config: &EmbeddingProviderConfig) -> std::result::Result<Arc<dyn EmbeddingProvider>, String> {
    Ok(Arc::new(DeterministicEmbeddingProvider::new(config.dimensions.unwrap_or(DEFAULT_DIMENSIONS))))
}

#[linkme::distributed_slice(EMBEDDING_PROVIDERS)]
static DETERMINISTIC_ENTRY: EmbeddingProviderEntry = EmbeddingProviderEntry {
    name: "deterministic",
    description: "Network-free deterministic embedder for local dev and tests",
    build: build_deterministic,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn deterministic_embeddings_are_unit_vectors() {
        let provider = DeterministicEmbeddingProvider::new(16);
        let vectors = provider.embed_batch(&["hello".to_owned(), "world".to_owned()], None).await.unwrap();
        assert_eq!(vectors.len(), 2);
        for v in &vectors {
            let norm: f32 = v.iter().map(|x| x * x).sum::<f32>().sqrt();
            assert!((norm - 1.0).abs() < 1e-4 || norm == 0.0);
        }
    }

    #[tokio::test]
    async fn same_text_yields_identical_vectors() {
        let provider = DeterministicEmbeddingProvider::new(8);
        let a = provider.embed_batch(&["repeat".to_owned()], None).await.unwrap();
        let b = provider.embed_batch(&["repeat".to_owned()], None).await.unwrap();
        assert_eq!(a, b);
    }
}
