//! Configuration Value Objects
//!
//! Value objects representing configuration for external providers
//! and system settings. These configurations define how the system
//! interacts with external services.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::utils::sensitivity::REDACTED;
use crate::value_objects::types::{
    CacheProviderKind, EmbeddingProviderKind, VectorStoreProviderKind,
};

/// Value Object: Embedding Provider Configuration
///
/// Configuration for connecting to and using embedding providers.
/// Defines which provider to use and how to authenticate with it.
#[derive(Clone, Serialize, Deserialize, PartialEq)]
pub struct EmbeddingConfig {
    /// Provider name (openai, ollama, fastembed, etc.)
    pub provider: EmbeddingProviderKind,
    /// Model identifier specific to the provider
    pub model: String,
    /// API key for cloud providers
    pub api_key: Option<String>,
    /// Custom API endpoint URL
    pub base_url: Option<String>,
    /// Output embedding dimensions
    pub dimensions: Option<usize>,
    /// Maximum input token limit
    pub max_tokens: Option<usize>,
}

impl fmt::Debug for EmbeddingConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EmbeddingConfig")
            .field("provider", &self.provider)
            .field("model", &self.model)
            .field("api_key", &self.api_key.as_ref().map(|_| REDACTED))
            .field("base_url", &self.base_url)
            .field("dimensions", &self.dimensions)
            .field("max_tokens", &self.max_tokens)
            .finish()
    }
}

/// Value Object: Vector Store Configuration
///
/// Configuration for connecting to vector storage backends.
/// Defines which storage system to use and connection parameters.
#[derive(Clone, Serialize, Deserialize, PartialEq)]
pub struct VectorStoreConfig {
    /// Provider name (edgevec, milvus, qdrant, pinecone)
    pub provider: VectorStoreProviderKind,
    /// Server address for remote providers (e.g., Milvus)
    pub address: Option<String>,
    /// Authentication token for remote providers
    pub token: Option<String>,
    /// Collection name for organizing vectors
    pub collection: Option<String>,
    /// Expected embedding dimensions
    pub dimensions: Option<usize>,
    /// Request timeout in seconds
    pub timeout_secs: Option<u64>,
}

impl fmt::Debug for VectorStoreConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VectorStoreConfig")
            .field("provider", &self.provider)
            .field("address", &self.address)
            .field("token", &self.token.as_ref().map(|_| REDACTED))
            .field("collection", &self.collection)
            .field("dimensions", &self.dimensions)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

/// Value Object: Cache Configuration
///
/// Configuration for cache backend providers.
/// Defines which cache provider to use and connection parameters.
#[derive(Clone, Serialize, Deserialize, PartialEq)]
pub struct CacheConfig {
    /// Provider name (moka, redis, null)
    pub provider: CacheProviderKind,
    /// Server address for remote providers (e.g., Redis)
    pub address: Option<String>,
    /// Authentication password for remote providers
    pub password: Option<String>,
    /// Database index for Redis
    pub database: Option<u32>,
    /// Maximum cache size in entries
    pub max_size: Option<usize>,
    /// Default TTL in seconds
    pub ttl_secs: Option<u64>,
}

impl fmt::Debug for CacheConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CacheConfig")
            .field("provider", &self.provider)
            .field("address", &self.address)
            .field("password", &self.password.as_ref().map(|_| REDACTED))
            .field("database", &self.database)
            .field("max_size", &self.max_size)
            .field("ttl_secs", &self.ttl_secs)
            .finish()
    }
}

/// Value Object: Rerank Provider Configuration
///
/// Configuration for the optional cross-encoder reranker consulted after
/// semantic and lexical candidates are merged.
#[derive(Clone, Serialize, Deserialize, PartialEq)]
pub struct RerankConfig {
    /// Provider name (cohere, jina, none).
    pub provider: String,
    /// Model identifier specific to the provider.
    pub model: Option<String>,
    /// API key for cloud providers.
    pub api_key: Option<String>,
    /// Custom API endpoint URL.
    pub base_url: Option<String>,
    /// Request timeout in milliseconds before falling back to fusion scoring.
    pub timeout_ms: u64,
    /// Weight applied to the semantic score in the fallback fusion formula.
    pub fallback_semantic_weight: f32,
    /// Weight applied to the lexical score in the fallback fusion formula.
    pub fallback_lexical_weight: f32,
}

impl fmt::Debug for RerankConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RerankConfig")
            .field("provider", &self.provider)
            .field("model", &self.model)
            .field("api_key", &self.api_key.as_ref().map(|_| REDACTED))
            .field("base_url", &self.base_url)
            .field("timeout_ms", &self.timeout_ms)
            .field("fallback_semantic_weight", &self.fallback_semantic_weight)
            .field("fallback_lexical_weight", &self.fallback_lexical_weight)
            .finish()
    }
}
