//! Memory Engine service port (C6): the session-scoped turn lifecycle built
//! on top of the File Store (C3) and Hybrid Search (C5).

use async_trait::async_trait;
use serde_json::Value;

use crate::error::Result;
use crate::value_objects::TenantFingerprint;

/// Port for the four memory-lifecycle tool operations.
#[async_trait]
pub trait MemoryEngineService: Send + Sync {
    /// Recall relevant facts and recent session log entries before a turn runs.
    async fn before_turn(
        &self,
        tenant: &TenantFingerprint,
        project: &str,
        session_id: &str,
        api_key: Option<&str>,
    ) -> Result<Value>;

    /// Commit a turn's transcript delta and any extracted facts.
    ///
    /// Idempotent per `(session_id, turn_id)`: a retried call with the same
    /// key after a `done` guard replays the original result instead of
    /// re-appending.
    async fn after_turn(
        &self,
        tenant: &TenantFingerprint,
        project: &str,
        session_id: &str,
        turn_id: &str,
        payload: Value,
        api_key: Option<&str>,
    ) -> Result<Value>;

    /// Compact session log shards and expire facts past their retention window.
    async fn run_maintenance(
        &self,
        tenant: &TenantFingerprint,
        project: &str,
        session_id: &str,
    ) -> Result<Value>;

    /// List a memory directory along with an LLM-friendly abstract of its contents.
    async fn list_dir_with_abstract(
        &self,
        tenant: &TenantFingerprint,
        project: &str,
        path: &str,
    ) -> Result<Value>;
}
