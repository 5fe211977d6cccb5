//! Memory Engine repository port (C6): the turn-guard idempotency table.

use async_trait::async_trait;

use crate::entities::TurnGuard;
use crate::error::Result;
use crate::value_objects::{TenantFingerprint, TurnGuardId};

/// Persistence contract for `after_turn` idempotency guards.
#[async_trait]
pub trait TurnGuardRepository: Send + Sync {
    /// Fetch a guard by its natural key.
    async fn find(
        &self,
        tenant: &TenantFingerprint,
        project: &str,
        session_id: &str,
        turn_id: &str,
    ) -> Result<Option<TurnGuard>>;

    /// Insert a new guard row in `processing` state. Fails with
    /// [`crate::Error::AlreadyExists`] if one already exists for the key
    /// (the caller decides whether to reclaim a stale one).
    async fn start(&self, guard: &TurnGuard) -> Result<()>;

    /// Mark a guard `done`, storing the serialized result to replay on retry.
    async fn complete(&self, id: TurnGuardId, result_json: &str) -> Result<()>;

    /// Reclaim a guard stuck in `processing` past the staleness window,
    /// resetting it back to `processing` under the current attempt.
    async fn reclaim(&self, id: TurnGuardId) -> Result<()>;
}
