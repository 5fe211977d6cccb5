//! Core persisted and ephemeral entities.
//!
//! `File`, `Chunk`, `ChunkEmbedding`, and `ChunkLexicalRow` implement
//! [`crate::schema::types::HasTableSchema`] so their DDL lives next to the
//! struct it describes; `MemoryFact` and `PipelineStepResult` do not own a
//! table (the former rides the `File` table, the latter never persists).

/// Audit trail row written by call dispatch after redaction.
pub mod call_log;
pub use call_log::CallLogEntry;

/// Derived chunk, embedding, and lexical rows rebuilt by the index workers.
pub mod chunk;
pub use chunk::{Chunk, ChunkEmbedding, ChunkLexicalRow};

/// The soft-deletable file row at the root of the virtual file system.
pub mod file;
pub use file::File;

/// Outbox row produced by a file mutation, consumed by the index worker pool.
pub mod index_job;
pub use index_job::IndexJob;

/// Tiered long-term memory fact, persisted as an ordinary file.
pub mod memory_fact;
pub use memory_fact::MemoryFact;

/// Ephemeral per-step result produced while a pipeline composition runs.
pub mod pipeline;
pub use pipeline::PipelineStepResult;

/// Idempotency guard for `after_turn` memory commits.
pub mod turn_guard;
pub use turn_guard::TurnGuard;
