//! Domain port interfaces: boundary contracts between domain and every outer
//! layer, following the Dependency Inversion Principle — domain defines the
//! trait, providers/infrastructure implement it, application/server consume
//! it through `Arc<dyn Trait>`.
//!
//! ## Organization
//!
//! - **infrastructure/** — database, advisory locking, credential vault,
//!   logging, metrics
//! - **providers/** — embedding, vector store, lexical search, rerank, crypto
//! - **repositories/** — per-entity persistence contracts
//! - **services/** — the C5/C6/C8/C10 application-layer operations

/// Infrastructure service ports.
pub mod infrastructure;
/// External service provider ports.
pub mod providers;
/// Repository ports for data persistence.
pub mod repositories;
/// Application service ports.
pub mod services;

// Canonical re-exports — the one import surface for all port traits/types.
pub use infrastructure::{
    AdvisoryLockGuard, AdvisoryLockProvider, CredentialRef, CredentialVault, DatabaseExecutor,
    DatabaseProvider, DatabaseTransaction, LogLevel, MetricsSink, OperationLogger, SqlExecutor,
    SqlParam, SqlRow,
};
pub use providers::{
    CryptoProvider, EmbeddingProvider, EncryptedData, LexicalMatch, LexicalSearchProvider,
    RerankCandidate, RerankProvider, VectorMatch, VectorStoreProvider,
};
pub use repositories::{CallLogRepository, FileRepository, IndexOutboxRepository, TurnGuardRepository};
pub use services::{
    ExtractedPassage, HybridSearchService, MemoryEngineService, PipelineComposer,
    RagExtractService, SearchHit,
};
