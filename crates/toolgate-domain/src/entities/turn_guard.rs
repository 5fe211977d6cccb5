//! Idempotency guard for `after_turn` memory commits.

use chrono::{DateTime, Utc};

use crate::value_objects::{TenantFingerprint, TurnGuardId, TurnGuardStatus};

/// Records that a given `(session, turn)` commit is in flight or complete so a
/// retried `after_turn` call neither duplicates writes nor blocks forever on a
/// crashed attempt.
#[derive(Debug, Clone, PartialEq)]
pub struct TurnGuard {
    /// Primary key.
    pub id: TurnGuardId,
    pub tenant: TenantFingerprint,
    pub project: String,
    pub session_id: String,
    /// Caller-supplied turn identifier, unique within a session.
    pub turn_id: String,
    pub status: TurnGuardStatus,
    /// Serialized result to replay to a caller that retries after `status` is
    /// `Done`, so a retry of a successful commit returns the original response.
    pub result_json: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TurnGuard {
    /// Whether a guard stuck in `Processing` past the staleness window may be
    /// reclaimed by a new attempt instead of returning `RESOURCE_BUSY` forever.
    #[must_use]
    pub fn is_stale(&self, now: DateTime<Utc>, staleness_window_secs: i64) -> bool {
        self.status == TurnGuardStatus::Processing
            && (now - self.updated_at).num_seconds() >= staleness_window_secs
    }
}

impl_table_schema!(TurnGuard, "turn_guards",
    columns: [
        ("id", Uuid, pk),
        ("tenant_fingerprint", Text),
        ("project", Text),
        ("session_id", Text),
        ("turn_id", Text),
        ("status", Text),
        ("result_json", Text, nullable),
        ("created_at", Timestamp),
        ("updated_at", Timestamp),
    ],
    indexes: [
        "idx_turn_guards_session" => ["tenant_fingerprint", "project", "session_id"],
    ],
    foreign_keys: [],
    unique_constraints: [
        ["tenant_fingerprint", "project", "session_id", "turn_id"],
    ],
);
