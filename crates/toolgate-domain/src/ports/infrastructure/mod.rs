//! Infrastructure ports: technical capabilities the application layer calls
//! through a trait object, concretely implemented by the providers crate.
//!
//! | Port | Description |
//! | ------ | ------------- |
//! | [`DatabaseExecutor`] | SQL execution and transactions |
//! | [`AdvisoryLockProvider`] | `(tenant, project)`-scoped mutation serialization |
//! | [`CredentialVault`] | transient caller-scoped credential handoff |
//! | [`OperationLogger`] | structured logging facade |
//! | [`MetricsSink`] | counters/histograms/gauges bridge |

/// `(tenant, project)`-scoped advisory locking.
pub mod advisory_lock;
/// Transient credential envelope vault.
pub mod credential_vault;
/// SQL execution, rows, and transactions.
pub mod database;
/// Operation logging port.
pub mod logging;
/// Metrics sink port.
pub mod metrics;

pub use advisory_lock::{AdvisoryLockGuard, AdvisoryLockProvider};
pub use credential_vault::{CredentialRef, CredentialVault};
pub use database::{
    DatabaseExecutor, DatabaseProvider, DatabaseTransaction, SqlExecutor, SqlParam, SqlRow,
};
pub use logging::{LogLevel, OperationLogger};
pub use metrics::MetricsSink;
