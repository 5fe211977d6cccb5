//! # Infrastructure Layer
//!
//! Concrete, technology-specific implementations of the domain's
//! infrastructure ports: SQLite persistence (C3/C4/C6/C7), the in-process
//! advisory lock (§5), the credential envelope vault (C12), `tracing`-backed
//! logging and metrics, and `figment`-based configuration loading.
//!
//! This is the outermost ring before wiring: it depends on
//! `toolgate-domain`, `toolgate-application` (for the plain config structs
//! it deserializes into), and `toolgate-providers` (for the crypto provider
//! the credential vault wraps). The binary crate composes this layer's
//! concrete types behind the domain's port traits and hands `Arc<dyn Trait>`
//! handles to the application layer.

/// In-process keyed advisory lock provider (§5).
pub mod advisory_lock;
/// Figment-based [`config::AppConfig`] loader.
pub mod config;
/// Moka-backed transient credential vault (C12).
pub mod credential_vault;
/// SQLite connection pool, schema DDL, and driver-agnostic SQL port impls.
pub mod database;
/// `tracing`-backed [`toolgate_domain::ports::OperationLogger`].
pub mod logging;
/// `tracing`-event-bridged [`toolgate_domain::ports::MetricsSink`].
pub mod metrics;
/// SQLite repository implementations (C3/C4/C6/C7).
pub mod repositories;

pub use advisory_lock::InProcessAdvisoryLockProvider;
pub use config::AppConfig;
pub use credential_vault::MokaCredentialVault;
pub use database::{SqliteDatabaseExecutor, SqliteDatabaseProvider, SqliteSchemaDdlGenerator};
pub use logging::TracingOperationLogger;
pub use metrics::TracingMetricsSink;
pub use repositories::{SqliteCallLogRepository, SqliteFileRepository, SqliteIndexOutboxRepository, SqliteTurnGuardRepository};
