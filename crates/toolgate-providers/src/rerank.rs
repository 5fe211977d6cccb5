//! Rerank providers (C5 optional cross-encoder stage), registered into
//! [`toolgate_domain::registry::rerank`].
//!
//! Hybrid search falls back to min-max normalized weighted fusion whenever no
//! rerank provider is configured, or the configured one times out or errors
//! (§4.5), so neither provider here needs to be perfect — only honest about
//! failure.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use toolgate_domain::error::{Error, Result};
use toolgate_domain::ports::providers::{RerankCandidate, RerankProvider};
use toolgate_domain::registry::rerank::{RerankProviderConfig, RerankProviderEntry, RERANK_PROVIDERS};

const DEFAULT_BASE_URL: &str = "https://api.cohere.com/v1";
const DEFAULT_MODEL: &str = "rerank-english-v3.0";

/// Calls a Cohere-compatible `/rerank` HTTP endpoint.
pub struct HttpRerankProvider {
    client: reqwest::Client,
    base_url: String,
    model: String,
    api_key: Option<String>,
}

impl HttpRerankProvider {
    pub fn new(base_url: impl Into<String>, model: impl Into<String>, api_key: Option<String>, timeout_ms: u64) -> Self {
        Self {
            client: reqwest::Client::builder().timeout(Duration::from_millis(timeout_ms)).build().unwrap_or_default(),
            base_url: base_url.into(),
            model: model.into(),
            api_key,
        }
    }
}

#[derive(Serialize)]
struct RerankRequest<'a> {
    model: &'a str,
    query: &'a str,
    documents: &'a [String],
}

#[derive(Deserialize)]
struct RerankResponse {
    results: Vec<RerankResult>,
}

#[derive(Deserialize)]
struct RerankResult {
    index: usize,
    relevance_score: f32,
}

#[async_trait]
impl RerankProvider for HttpRerankProvider {
    async fn rerank(&self, query: &str, candidates: &[RerankCandidate]) -> Result<Vec<f32>> {
        if candidates.is_empty() {
            return Ok(Vec::new());
        }
        let documents: Vec<String> = candidates.iter().map(|c| c.text.clone()).collect();

        let mut request = self.client.post(format!("{}/rerank", self.base_url)).json(&RerankRequest { model: &self.model, query, documents: &documents });
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await.map_err(|e| Error::search_backend(format!("rerank request failed: {e}")))?;
        if !response.status().is_success() {
            let status = response.status();
            return Err(Error::search_backend(format!("rerank provider returned {status}")));
        }

        let parsed: RerankResponse = response.json().await.map_err(|e| Error::search_backend(format!("malformed rerank response: {e}")))?;
        if parsed.results.len() != candidates.len() {
            return Err(Error::search_backend("rerank response size does not match request"));
        }

        let mut scores = vec![0.0f32; candidates.len()];
        for result in parsed.results {
            if let Some(slot) = scores.get_mut(result.index) {
                *slot = result.relevance_score;
            }
        }
        Ok(scores)
    }
}

fn build_http(config: &RerankProviderConfig) -> std::result::Result<Arc<dyn RerankProvider>, String> {
    let timeout_ms = config.extra.get("timeout_ms").and_then(|s| s.parse().ok()).unwrap_or(2_000);
    Ok(Arc::new(HttpRerankProvider::new(
        config.base_url.clone().unwrap_or_else(|| DEFAULT_BASE_URL.to_owned()),
        config.model.clone().unwrap_or_else(|| DEFAULT_MODEL.to_owned()),
        config.api_key.clone(),
        timeout_ms,
    )))
}

#[linkme::distributed_slice(RERANK_PROVIDERS)]
static HTTP_ENTRY: RerankProviderEntry = RerankProviderEntry {
    name: "cohere-compatible",
    description: "Calls a Cohere-compatible /rerank HTTP endpoint",
    build: build_http,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_from_the_registry_by_name() {
        let config = RerankProviderConfig { provider: "cohere-compatible".to_owned(), ..Default::default() };
        let provider = toolgate_domain::registry::resolve_rerank_provider(&config);
        assert!(provider.is_ok());
    }

    #[test]
    fn unknown_provider_name_is_rejected() {
        let config = RerankProviderConfig { provider: "does-not-exist".to_owned(), ..Default::default() };
        assert!(toolgate_domain::registry::resolve_rerank_provider(&config).is_err());
    }
}
