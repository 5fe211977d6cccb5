//! Repository ports: persistence contracts for each persisted entity family.

/// Per-invocation audit trail (C7).
pub mod call_log;
/// Virtual file system storage (C3).
pub mod file_store;
/// Index outbox jobs and derived chunk rows (C4).
pub mod index_outbox;
/// Memory turn-guard idempotency table (C6).
pub mod memory;

pub use call_log::CallLogRepository;
pub use file_store::FileRepository;
pub use index_outbox::IndexOutboxRepository;
pub use memory::TurnGuardRepository;
