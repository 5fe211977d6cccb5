//! External provider ports: the pluggable half of C4/C5/C12, resolved by name
//! from config through the [`crate::registry`] `linkme` slices.
//!
//! | Port | Description |
//! | ------ | ------------- |
//! | [`EmbeddingProvider`] | text → dense vector |
//! | [`VectorStoreProvider`] | semantic candidate retrieval |
//! | [`LexicalSearchProvider`] | BM25/FTS candidate retrieval |
//! | [`RerankProvider`] | optional cross-encoder rerank |
//! | [`CryptoProvider`] | symmetric encryption for the credential vault |

/// Symmetric encryption port.
pub mod crypto;
/// Embedding provider port.
pub mod embedding;
/// Lexical search and rerank ports.
pub mod hybrid_search;
/// Vector store provider port.
pub mod vector_store;

pub use crypto::{CryptoProvider, EncryptedData};
pub use embedding::EmbeddingProvider;
pub use hybrid_search::{LexicalMatch, LexicalSearchProvider, RerankCandidate, RerankProvider};
pub use vector_store::{VectorMatch, VectorStoreProvider};
