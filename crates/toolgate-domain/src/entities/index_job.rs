//! The outbox row: inserted in the same transaction as the file mutation it
//! describes, later claimed and processed by the worker pool.

use chrono::{DateTime, Utc};

use crate::value_objects::{FileId, IndexJobId, IndexJobKind, IndexJobStatus, TenantFingerprint};

/// One unit of indexing work produced by a file mutation.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexJob {
    /// Primary key.
    pub id: IndexJobId,
    pub tenant: TenantFingerprint,
    pub project: String,
    /// File this job rebuilds or tears down.
    pub file_id: FileId,
    pub kind: IndexJobKind,
    pub status: IndexJobStatus,
    /// Number of times a worker has attempted this job.
    pub attempts: u32,
    /// Detail from the most recent failed attempt, if any.
    pub last_error: Option<String>,
    pub created_at: DateTime<Utc>,
    /// Set when a worker claims the job; cleared back to `None` on failure-requeue.
    pub claimed_at: Option<DateTime<Utc>>,
    /// Opaque [`crate::ports::infrastructure::CredentialRef`] string for an
    /// `Upsert` job's transient caller-credential envelope (§4.4.1). `None`
    /// for `Delete` jobs, which never call the embedder.
    pub credential_ref: Option<String>,
}

impl IndexJob {
    /// Whether this job has exhausted the given retry budget.
    #[must_use]
    pub fn exhausted(&self, max_attempts: u32) -> bool {
        self.attempts >= max_attempts
    }
}

impl_table_schema!(IndexJob, "index_jobs",
    columns: [
        ("id", Uuid, pk),
        ("tenant_fingerprint", Text),
        ("project", Text),
        ("file_id", Uuid),
        ("kind", Text),
        ("status", Text),
        ("attempts", Integer),
        ("last_error", Text, nullable),
        ("created_at", Timestamp),
        ("claimed_at", Timestamp, nullable),
        ("credential_ref", Text, nullable),
    ],
    indexes: [
        "idx_index_jobs_status" => ["status", "created_at"],
        "idx_index_jobs_file" => ["file_id"],
    ],
    foreign_keys: [
        ("file_id", "files", "id"),
    ],
);
