//! The virtual file system's only physical row: a soft-deletable file.

use chrono::{DateTime, Utc};

use crate::value_objects::{FileId, TenantFingerprint};

/// A file within one tenant's one project.
///
/// There is no directory table: directories are synthesized at read time from
/// the set of active (non soft-deleted) file paths sharing a prefix.
#[derive(Debug, Clone, PartialEq)]
pub struct File {
    /// Primary key.
    pub id: FileId,
    /// Owning tenant.
    pub tenant: TenantFingerprint,
    /// Project name, scoped within the tenant.
    pub project: String,
    /// Full virtual path, always starting with `/` and never ending with one.
    pub path: String,
    /// UTF-8 file content.
    pub content: String,
    /// Byte length of `content`, kept denormalized for quota checks without a read.
    pub size_bytes: u64,
    /// Monotonically increasing version, bumped on every successful write.
    pub version: u64,
    /// Set when the row is soft-deleted; excluded from all read paths once set.
    pub deleted_at: Option<DateTime<Utc>>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last mutation timestamp (write, delete, or rename).
    pub updated_at: DateTime<Utc>,
}

impl File {
    /// Whether this row is excluded from active reads, listings, and search.
    #[must_use]
    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }
}

impl_table_schema!(File, "files",
    columns: [
        ("id", Uuid, pk),
        ("tenant_fingerprint", Text),
        ("project", Text),
        ("path", Text),
        ("content", Text),
        ("size_bytes", Integer),
        ("version", Integer),
        ("deleted_at", Timestamp, nullable),
        ("created_at", Timestamp),
        ("updated_at", Timestamp),
    ],
    indexes: [
        "idx_files_tenant_project_path" => ["tenant_fingerprint", "project", "path"],
        "idx_files_tenant_project_deleted" => ["tenant_fingerprint", "project", "deleted_at"],
    ],
    foreign_keys: [],
    unique_constraints: [
        ["tenant_fingerprint", "project", "path"],
    ],
);
