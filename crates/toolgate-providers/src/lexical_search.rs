//! In-process lexical search provider (C5 sparse side), registered into
//! [`toolgate_domain::registry::lexical_search`].
//!
//! Reference implementation: a term-frequency scorer over an in-memory
//! inverted index, scoped per `(tenant, project)`. A production deployment
//! registers a real BM25 backend (SQLite FTS5, Tantivy, Elasticsearch)
//! behind the same [`LexicalSearchProvider`] port.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;

use toolgate_domain::error::Result;
use toolgate_domain::ports::providers::{LexicalMatch, LexicalSearchProvider};
use toolgate_domain::registry::lexical_search::{LexicalSearchProviderConfig, LexicalSearchProviderEntry, LEXICAL_SEARCH_PROVIDERS};
use toolgate_domain::value_objects::{ChunkId, TenantFingerprint};

type ScopeKey = (String, String);

fn scope_key(tenant: &TenantFingerprint, project: &str) -> ScopeKey {
    (tenant.as_str().to_owned(), project.to_owned())
}

fn tokenize(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(str::to_lowercase)
        .collect()
}

fn term_frequencies(tokens: &[String]) -> HashMap<String, u32> {
    let mut counts = HashMap::new();
    for token in tokens {
        *counts.entry(token.clone()).or_insert(0u32) += 1;
    }
    counts
}

/// In-memory term-frequency lexical index, scoped by `(tenant, project)`.
pub struct InMemoryLexicalSearch {
    scopes: DashMap<ScopeKey, DashMap<ChunkId, HashMap<String, u32>>>,
}

impl InMemoryLexicalSearch {
    #[must_use]
    pub fn new() -> Self {
        Self { scopes: DashMap::new() }
    }
}

impl Default for InMemoryLexicalSearch {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LexicalSearchProvider for InMemoryLexicalSearch {
    async fn index(&self, tenant: &TenantFingerprint, project: &str, chunk_id: ChunkId, normalized_text: &str) -> Result<()> {
        let scope = self.scopes.entry(scope_key(tenant, project)).or_default();
        scope.insert(chunk_id, term_frequencies(&tokenize(normalized_text)));
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

    async fn search(&self, tenant: &TenantFingerprint, project: &str, query: &str, limit: usize) -> Result<Vec<LexicalMatch>> {
        let Some(scope) = self.scopes.get(&scope_key(tenant, project)) else {
            return Ok(Vec::new());
        };
        let query_terms = tokenize(query);
        if query_terms.is_empty() {
            return Ok(Vec::new());
        }

        let mut matches: Vec<LexicalMatch> = scope
            .iter()
            .filter_map(|entry| {
                let term_counts = entry.value();
                let score: f32 = query_terms.iter().filter_map(|t| term_counts.get(t)).map(|&c| c as f32).sum();
                (score > 0.0).then_some(LexicalMatch { chunk_id: *entry.key(), score })
            })
            .collect();
        matches.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        matches.truncate(limit);
        Ok(matches)
    }
}

fn build(_config: &LexicalSearchProviderConfig) -> std::result::Result<Arc<dyn LexicalSearchProvider>, String> {
    Ok(Arc::new(InMemoryLexicalSearch::new()))
}

#[linkme::distributed_slice(LEXICAL_SEARCH_PROVIDERS)]
static IN_MEMORY_ENTRY: LexicalSearchProviderEntry = LexicalSearchProviderEntry {
    name: "in_memory",
    description: "Term-frequency lexical search held in process memory",
    build,
};

#[cfg(test)]
mod tests {
    use super::*;

    fn tenant() -> TenantFingerprint {
        TenantFingerprint::from_api_key("sk-test-key")
    }

    #[tokio::test]
    async fn search_ranks_by_term_frequency() {
        let index = InMemoryLexicalSearch::new();
        let t = tenant();
        let a = ChunkId::new();
        let b = ChunkId::new();
        index.index(&t, "proj", a, "rust rust rust tokio").await.unwrap();
        index.index(&t, "proj", b, "rust tokio tokio").await.unwrap();

        let results = index.search(&t, "proj", "rust", 10).await.unwrap();
        assert_eq!(results[0].chunk_id, a);
    }

    #[tokio::test]
    async fn non_matching_query_returns_no_hits() {
        let index = InMemoryLexicalSearch::new();
        let t = tenant();
        index.index(&t, "proj", ChunkId::new(), "apples and oranges").await.unwrap();

        let results = index.search(&t, "proj", "quasar", 10).await.unwrap();
        assert!(results.is_empty());
    }
}
