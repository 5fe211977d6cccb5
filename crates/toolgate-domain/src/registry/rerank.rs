//! Rerank Provider Registry
//!
//! Auto-registration system for cross-encoder rerank providers. When no
//! provider is configured, the hybrid search service falls back to min-max
//! normalized weighted fusion of the semantic and lexical candidate scores.

use std::collections::HashMap;

/// Configuration for rerank provider creation.
#[derive(Debug, Clone, Default)]
pub struct RerankProviderConfig {
    /// Provider name (e.g. "cohere", "none").
    pub provider: String,
    /// Model identifier.
    pub model: Option<String>,
    /// API key for authentication.
    pub api_key: Option<String>,
    /// Base URL for the provider API.
    pub base_url: Option<String>,
    /// Additional provider-specific configuration.
    pub extra: HashMap<String, String>,
}

crate::impl_config_builder!(RerankProviderConfig {
    /// Set the model name
    model: with_model(into String),
    /// Set the API key
    api_key: with_api_key(into String),
    /// Set the base URL for the API
    base_url: with_base_url(into String),
});

crate::impl_registry!(
    provider_trait: crate::ports::providers::RerankProvider,
    config_type: RerankProviderConfig,
    entry_type: RerankProviderEntry,
    slice_name: RERANK_PROVIDERS,
    resolve_fn: resolve_rerank_provider,
    list_fn: list_rerank_providers
);
