//!
//! **Documentation**: [docs/modules/domain.md](../../../../docs/modules/domain.md)
//!
//! Provider Registry System
//!
//! Defines the auto-registration infrastructure for pluggable providers.
//! Uses the `linkme` crate for compile-time registration of providers
//! that can be discovered and instantiated at runtime by configuration name.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                    Provider Registration Flow                    │
//! ├─────────────────────────────────────────────────────────────────┤
//! │                                                                 │
//! │  1. Provider defines:  #[linkme::distributed_slice(PROVIDERS)]  │
//! │                        static ENTRY: ProviderEntry = ...        │
//! │                              ↓                                  │
//! │  2. Registry declares: #[linkme::distributed_slice]             │
//! │                        pub static PROVIDERS: [Entry] = [..]     │
//! │                              ↓                                  │
//! │  3. Resolver queries:  PROVIDERS.iter()                         │
//! │                              ↓                                  │
//! │  4. Config selects:    "provider = fastembed" → FastEmbedProvider│
//! │                                                                 │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ### Registering a provider (in `toolgate-providers`)
//!
//! ```no_run
//! use toolgate_domain::registry::embedding::{EmbeddingProviderEntry, EMBEDDING_PROVIDERS};
//! // Providers register via #[linkme::distributed_slice(EMBEDDING_PROVIDERS)]
//! ```
//!
//! ### Resolving a provider (in `toolgate-infrastructure`)
//!
//! ```no_run
//! use toolgate_domain::registry::embedding::{EmbeddingProviderConfig, resolve_embedding_provider};
//!
//! fn get_provider() -> Result<(), String> {
//!     let config = EmbeddingProviderConfig { provider: "fastembed".to_owned(), ..Default::default() };
//!     let provider = resolve_embedding_provider(&config)?;
//!     println!("Using provider: {}", provider.model_name());
//!     Ok(())
//! }
//! ```

/// Embedding provider registry (C5 dense-vector side).
pub mod embedding;
/// Lexical (BM25/FTS) search provider registry (C5 sparse side).
pub mod lexical_search;
/// Rerank provider registry (C5 optional cross-encoder stage).
pub mod rerank;
/// Vector store provider registry (C5 dense-vector side).
pub mod vector_store;

pub use embedding::{EMBEDDING_PROVIDERS, EmbeddingProviderConfig, resolve_embedding_provider};
pub use lexical_search::{
    LEXICAL_SEARCH_PROVIDERS, LexicalSearchProviderConfig, resolve_lexical_search_provider,
};
pub use rerank::{RERANK_PROVIDERS, RerankProviderConfig, resolve_rerank_provider};
pub use vector_store::{VECTOR_STORE_PROVIDERS, VectorStoreProviderConfig, resolve_vector_store_provider};
