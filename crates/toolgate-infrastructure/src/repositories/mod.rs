//! SQLite implementations of the domain's repository ports (C3/C4/C6/C7).

mod convert;

/// [`CallLogRepository`](toolgate_domain::ports::CallLogRepository) impl.
pub mod call_log;
/// [`FileRepository`](toolgate_domain::ports::FileRepository) impl.
pub mod file_store;
/// [`IndexOutboxRepository`](toolgate_domain::ports::IndexOutboxRepository) impl.
pub mod index_outbox;
/// [`TurnGuardRepository`](toolgate_domain::ports::TurnGuardRepository) impl.
pub mod turn_guard;

pub use call_log::SqliteCallLogRepository;
pub use file_store::SqliteFileRepository;
pub use index_outbox::SqliteIndexOutboxRepository;
pub use turn_guard::SqliteTurnGuardRepository;
