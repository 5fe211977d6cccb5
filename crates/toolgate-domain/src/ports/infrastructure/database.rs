//! Database executor port (infrastructure).
//!
//! Abstraction for SQL execution so repositories and application code do not
//! depend on a concrete driver. Implementations live in the providers crate
//! and are injected via DI. Extended beyond a bare executor with transaction
//! support: File Store mutations (C3) must commit atomically with their
//! Index Outbox job insert (C4), and the memory turn guard (C6) needs the
//! same all-or-nothing write.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::Result;

/// Parameter for prepared statement binding (driver-agnostic).
#[derive(Debug, Clone)]
pub enum SqlParam {
    /// UTF-8 text value.
    String(String),
    /// 64-bit signed integer.
    I64(i64),
    /// Double-precision float.
    F64(f64),
    /// Boolean, mapped to the backend's native representation.
    Bool(bool),
    /// SQL NULL.
    Null,
}

impl From<&str> for SqlParam {
    fn from(s: &str) -> Self {
        Self::String(s.to_owned())
    }
}

impl From<String> for SqlParam {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<i64> for SqlParam {
    fn from(v: i64) -> Self {
        Self::I64(v)
    }
}

impl From<u64> for SqlParam {
    fn from(v: u64) -> Self {
        Self::I64(v as i64)
    }
}

impl From<bool> for SqlParam {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl<T: Into<SqlParam>> From<Option<T>> for SqlParam {
    fn from(v: Option<T>) -> Self {
        v.map_or(Self::Null, Into::into)
    }
}

/// Abstraction for a single query result row.
///
/// Implementations wrap driver-specific rows and expose values by column
/// name so repository code can map to domain entities without depending on
/// the driver.
pub trait SqlRow: Send + Sync {
    /// Try to get a string by column name.
    fn try_get_string(&self, name: &str) -> Result<Option<String>>;

    /// Try to get an i64 by column name.
    fn try_get_i64(&self, name: &str) -> Result<Option<i64>>;

    /// Try to get an f64 by column name (e.g. a lexical search rank).
    fn try_get_f64(&self, name: &str) -> Result<Option<f64>>;

    /// Try to get a bool by column name.
    fn try_get_bool(&self, name: &str) -> Result<Option<bool>>;
}

/// Shared surface between a plain connection and an open transaction.
#[async_trait]
pub trait SqlExecutor: Send + Sync {
    /// Execute a statement that does not return rows.
    async fn execute(&self, sql: &str, params: &[SqlParam]) -> Result<()>;

    /// Execute a query expected to return at most one row.
    async fn query_one(&self, sql: &str, params: &[SqlParam]) -> Result<Option<Arc<dyn SqlRow>>>;

    /// Execute a query and collect all returned rows.
    async fn query_all(&self, sql: &str, params: &[SqlParam]) -> Result<Vec<Arc<dyn SqlRow>>>;
}

/// An open transaction. Dropping it without calling [`DatabaseTransaction::commit`]
/// rolls back; implementations roll back on drop as a safety net for early
/// returns via `?`.
#[async_trait]
pub trait DatabaseTransaction: SqlExecutor {
    /// Commit all statements executed on this transaction.
    async fn commit(self: Box<Self>) -> Result<()>;

    /// Explicitly roll back. Equivalent to dropping without committing.
    async fn rollback(self: Box<Self>) -> Result<()>;
}

/// Port for executing SQL and opening transactions.
///
/// Repositories depend on this trait via DI; they do not hold pools or use
/// driver types directly.
#[async_trait]
pub trait DatabaseExecutor: SqlExecutor {
    /// Begin a transaction. Every statement run against the returned handle
    /// is invisible to other connections until [`DatabaseTransaction::commit`].
    async fn begin(&self) -> Result<Box<dyn DatabaseTransaction>>;
}

/// Provider factory for database connections with schema initialization.
#[async_trait]
pub trait DatabaseProvider: Send + Sync {
    /// Open (creating if absent) a database file at `path` and run migrations.
    async fn connect(&self, path: &std::path::Path) -> Result<Arc<dyn DatabaseExecutor>>;

    /// Open an ephemeral in-memory database, used by tests.
    async fn connect_in_memory(&self) -> Result<Arc<dyn DatabaseExecutor>>;
}
