//! In-process keyed async mutex implementation of the [`AdvisoryLockProvider`]
//! port (§5), grounded on the teacher's `DashMap`-backed concurrent registry
//! style (`mcb-infrastructure::infrastructure::indexing::DefaultIndexingOperations`).
//!
//! SQLite has no native advisory lock, so `(tenant, project)` mutation
//! serialization is enforced in-process instead; see `DESIGN.md` for the
//! single-instance-deployment tradeoff this accepts.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard};

use toolgate_domain::error::{Error, Result};
use toolgate_domain::ports::infrastructure::{AdvisoryLockGuard, AdvisoryLockProvider};

/// Registry of per-scope-key mutexes, lazily created on first acquisition and
/// never removed (scope keys are bounded by `(tenant, project)` cardinality).
pub struct InProcessAdvisoryLockProvider {
    locks: DashMap<String, Arc<Mutex<()>>>,
}

impl InProcessAdvisoryLockProvider {
    #[must_use]
    pub fn new() -> Self {
        Self { locks: DashMap::new() }
    }

    fn lock_for(&self, scope_key: &str) -> Arc<Mutex<()>> {
        self.locks.entry(scope_key.to_owned()).or_insert_with(|| Arc::new(Mutex::new(()))).clone()
    }
}

impl Default for InProcessAdvisoryLockProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug)]
struct OwnedMutexLockGuard(#[allow(dead_code)] OwnedMutexGuard<()>);

impl AdvisoryLockGuard for OwnedMutexLockGuard {}

#[async_trait]
impl AdvisoryLockProvider for InProcessAdvisoryLockProvider {
    async fn acquire(&self, scope_key: &str, timeout_ms: u64) -> Result<Box<dyn AdvisoryLockGuard>> {
        let mutex = self.lock_for(scope_key);
        let acquired = tokio::time::timeout(Duration::from_millis(timeout_ms), mutex.lock_owned()).await;
        match acquired {
            Ok(guard) => Ok(Box::new(OwnedMutexLockGuard(guard))),
            Err(_) => Err(Error::resource_busy(format!("advisory lock for {scope_key} not acquired within {timeout_ms}ms"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn serializes_same_scope_key() {
        let provider = InProcessAdvisoryLockProvider::new();
        let guard = provider.acquire("tenant/project", 50).await.unwrap();
        let err = provider.acquire("tenant/project", 50).await.unwrap_err();
        assert!(matches!(err, Error::ResourceBusy { .. }));
        drop(guard);
        assert!(provider.acquire("tenant/project", 50).await.is_ok());
    }

    #[tokio::test]
    async fn distinct_scope_keys_do_not_contend() {
        let provider = InProcessAdvisoryLockProvider::new();
        let _a = provider.acquire("tenant/a", 50).await.unwrap();
        assert!(provider.acquire("tenant/b", 50).await.is_ok());
    }
}
