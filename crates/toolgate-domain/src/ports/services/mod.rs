//! Application service ports: the business operations tool dispatch (C9) and
//! the pipeline composer (C8) call through, implemented in the application crate.

/// Memory Engine (C6): before/after turn, maintenance, directory abstracts.
pub mod memory;
/// Pipeline Composer (C8).
pub mod pipeline;
/// RAG Extract (C10).
pub mod rag_extract;
/// Hybrid Search (C5).
pub mod search;

pub use memory::MemoryEngineService;
pub use pipeline::PipelineComposer;
pub use rag_extract::{ExtractedPassage, RagExtractService};
pub use search::{HybridSearchService, SearchHit};
