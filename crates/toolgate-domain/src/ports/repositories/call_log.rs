//! Call Audit repository port (C7).

use async_trait::async_trait;

use crate::entities::CallLogEntry;
use crate::error::Result;
use crate::value_objects::TenantFingerprint;

/// Persistence contract for per-invocation audit rows.
#[async_trait]
pub trait CallLogRepository: Send + Sync {
    /// Insert one audit entry. Never fails the tool call it describes: the
    /// application layer logs and swallows any error from this call.
    async fn insert(&self, entry: &CallLogEntry) -> Result<()>;

    /// Recent entries for a tenant, newest first, for operator inspection.
    async fn recent_for_tenant(
        &self,
        tenant: &TenantFingerprint,
        limit: usize,
    ) -> Result<Vec<CallLogEntry>>;
}
