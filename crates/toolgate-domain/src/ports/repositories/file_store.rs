//! File Store repository port (C3).

use async_trait::async_trait;

use crate::entities::File;
use crate::error::Result;
use crate::value_objects::{FileId, TenantFingerprint};

/// Persistence contract for the virtual file system's only physical table.
///
/// Every method is scoped by `(tenant, project)`; callers never reach across
/// tenant or project boundaries. Mutating methods are called from within an
/// open [`crate::ports::infrastructure::DatabaseTransaction`] so the caller
/// can enqueue the matching [`crate::entities::IndexJob`] atomically.
#[async_trait]
pub trait FileRepository: Send + Sync {
    /// Fetch an active (non soft-deleted) file by exact path.
    async fn find_active(
        &self,
        tenant: &TenantFingerprint,
        project: &str,
        path: &str,
    ) -> Result<Option<File>>;

    /// Fetch a file by id regardless of soft-delete state.
    async fn find_by_id(&self, id: FileId) -> Result<Option<File>>;

    /// Insert a new file row.
    async fn insert(&self, file: &File) -> Result<()>;

    /// Overwrite an existing file's content, bumping `version` and `updated_at`.
    async fn update_content(
        &self,
        id: FileId,
        content: &str,
        size_bytes: u64,
        new_version: u64,
    ) -> Result<()>;

    /// Mark a file soft-deleted.
    async fn soft_delete(&self, id: FileId) -> Result<()>;

    /// Rename an active file to a new path, checked for collisions by the caller.
    async fn rename(&self, id: FileId, new_path: &str) -> Result<()>;

    /// List active file paths under `prefix`, used to synthesize directories.
    async fn list_active_paths(
        &self,
        tenant: &TenantFingerprint,
        project: &str,
        prefix: &str,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<File>>;

    /// Count active files under `prefix`, including nested subdirectories.
    async fn count_active_under(
        &self,
        tenant: &TenantFingerprint,
        project: &str,
        prefix: &str,
    ) -> Result<u64>;

    /// Sum `size_bytes` over every active file in `project`, for the §4.3
    /// project byte quota. Counts the whole project, not a subtree, since the
    /// cap is project-wide.
    async fn sum_active_bytes(&self, tenant: &TenantFingerprint, project: &str) -> Result<u64>;

    /// Hard-delete soft-deleted rows whose `deleted_at` is older than the
    /// retention cutoff. Returns the number of rows purged.
    async fn purge_soft_deleted_before(
        &self,
        cutoff: chrono::DateTime<chrono::Utc>,
        batch_size: u32,
    ) -> Result<u64>;
}
