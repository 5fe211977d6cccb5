//! # Application Layer
//!
//! Use-case orchestration for the tool-invocation gateway: each module wires
//! one or more domain ports together behind a concrete service a transport
//! layer can call directly. Contains no SQL, no HTTP clients, and no
//! transport framing — only coordination of domain ports.
//!
//! | Module | Component |
//! |--------|-----------|
//! | [`config`] | Deserializable configuration surface shared with infrastructure |
//! | [`path_algebra`] | Validation & Path Algebra (C2) |
//! | [`file_store`] | File Store (C3) |
//! | [`hybrid_search`] | Hybrid Search (C5) |
//! | [`memory_engine`] | Memory Engine (C6) |
//! | [`call_audit`] | Call Audit & Redaction (C7) |
//! | [`pipeline`] | Pipeline Composer (C8) |
//! | [`rag_extract`] | RAG Extract (C10) |
//! | [`index_worker`] | Index Outbox Worker pool (C4) |
//! | [`retention_worker`] | Retention Worker (C11) |

/// Per-invocation audit trail redaction and entry construction (C7).
pub mod call_audit;
/// Configuration value types shared with the infrastructure layer's `AppConfig`.
pub mod config;
/// File Store use case: stat/read/write/delete/rename/list (C3).
pub mod file_store;
/// Hybrid semantic + lexical search orchestration (C5).
pub mod hybrid_search;
/// Chunk/embed/write worker pool consuming the index outbox (C4).
pub mod index_worker;
/// Session-scoped memory lifecycle built on File Store and Hybrid Search (C6).
pub mod memory_engine;
/// Project/path validation and directory synthesis (C2).
pub mod path_algebra;
/// Ordered/parallel/nested tool-step execution (C8).
pub mod pipeline;
/// Materials-scoped extraction with its own semantic + lexical-overlap
/// scorer, reusing File Store ingestion (C10).
pub mod rag_extract;
/// Background sweep that hard-purges soft-deleted files and expired facts (C11).
pub mod retention_worker;

pub use call_audit::{redact_params, record_call, CallOutcome};
pub use file_store::{FileStoreService, StatResult};
pub use hybrid_search::HybridSearch;
pub use index_worker::IndexWorker;
pub use memory_engine::MemoryEngine;
pub use pipeline::{Pipeline, ToolInvoker};
pub use rag_extract::RagExtract;
pub use retention_worker::RetentionWorker;
