//! Advisory lock port (§5): serializes mutations within one `(tenant, project)`
//! scope.
//!
//! The reference implementation is an in-process keyed async mutex registry
//! rather than a database-native lock, since the reference database (SQLite)
//! has none; see `DESIGN.md` for the tradeoff this accepts.

use async_trait::async_trait;

use crate::error::Result;

/// An acquired advisory lock. Releases on drop.
pub trait AdvisoryLockGuard: Send + std::fmt::Debug {}

/// Port for acquiring scope-serializing advisory locks.
#[async_trait]
pub trait AdvisoryLockProvider: Send + Sync {
    /// Acquire the lock for `scope_key`, waiting up to `timeout_ms`.
    ///
    /// Returns [`crate::Error::ResourceBusy`] if the timeout elapses before
    /// the lock is free.
    async fn acquire(
        &self,
        scope_key: &str,
        timeout_ms: u64,
    ) -> Result<Box<dyn AdvisoryLockGuard>>;
}
