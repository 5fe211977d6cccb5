//! # Providers Layer
//!
//! Concrete implementations of the external-service ports `toolgate-domain`
//! defines: embedding, vector store, lexical search, rerank, and the
//! symmetric-crypto primitive behind the credential vault (C12). Each
//! provider module registers itself into the matching `toolgate-domain`
//! registry slice via `#[linkme::distributed_slice]`, so the infrastructure
//! layer selects one by name from config without a compile-time match arm
//! per provider.
//!
//! This crate depends only on `toolgate-domain`: it implements ports, it
//! does not orchestrate use cases.

/// AES-256-GCM [`toolgate_domain::ports::providers::CryptoProvider`] (C12).
pub mod crypto;
/// [`toolgate_domain::ports::providers::EmbeddingProvider`] implementations.
pub mod embedding;
/// [`toolgate_domain::ports::providers::LexicalSearchProvider`] implementations.
pub mod lexical_search;
/// [`toolgate_domain::ports::providers::RerankProvider`] implementations.
pub mod rerank;
/// [`toolgate_domain::ports::providers::VectorStoreProvider`] implementations.
pub mod vector_store;

pub use crypto::AesGcmCryptoProvider;
pub use embedding::{DeterministicEmbeddingProvider, HttpEmbeddingProvider};
pub use lexical_search::InMemoryLexicalSearch;
pub use rerank::HttpRerankProvider;
pub use vector_store::InMemoryVectorStore;
