//! Immutable value objects: identifiers, tenant identity, and small enums.

/// Provider configuration value objects (embedding, vector store, cache, rerank).
pub mod config;
/// Strong-typed UUID identifiers.
pub mod ids;
/// Tenant fingerprint and display identity.
pub mod tenant;
/// Small shared enums (memory tier, job kind/status, pipeline mode).
pub mod types;

pub use config::{CacheConfig, EmbeddingConfig, RerankConfig, VectorStoreConfig};
pub use ids::{CallLogId, ChunkId, FactId, FileId, IndexJobId, PipelineStepId, TurnGuardId};
pub use tenant::{TenantContext, TenantFingerprint, TenantIdentity};
pub use types::{
    IndexJobKind, IndexJobStatus, MemoryTier, PipelineStepMode, PipelineStepOutcome,
    TurnGuardStatus,
};
