//! Lexical Search Provider Registry
//!
//! Auto-registration system for BM25/FTS lexical search providers using linkme
//! distributed slices.

use std::collections::HashMap;

/// Configuration for lexical search provider creation.
#[derive(Debug, Clone, Default)]
pub struct LexicalSearchProviderConfig {
    /// Provider name (e.g. "sqlite-fts5").
    pub provider: String,
    /// Additional provider-specific configuration.
    pub extra: HashMap<String, String>,
}

crate::impl_config_builder!(LexicalSearchProviderConfig {});

crate::impl_registry!(
    provider_trait: crate::ports::providers::LexicalSearchProvider,
    config_type: LexicalSearchProviderConfig,
    entry_type: LexicalSearchProviderEntry,
    slice_name: LEXICAL_SEARCH_PROVIDERS,
    resolve_fn: resolve_lexical_search_provider,
    list_fn: list_lexical_search_providers
);
