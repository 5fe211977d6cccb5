//! File Store use case (C3): stat/read/write/delete/rename/list, each
//! transactionally paired with an Index Outbox enqueue per §4.3/§4.4.

use std::sync::Arc;

use chrono::Utc;
use toolgate_domain::entities::{File, IndexJob};
use toolgate_domain::error::{Error, Result};
use toolgate_domain::ports::infrastructure::{AdvisoryLockProvider, CredentialVault, DatabaseExecutor};
use toolgate_domain::ports::repositories::{FileRepository, IndexOutboxRepository};
use toolgate_domain::value_objects::{FileId, IndexJobId, IndexJobKind, IndexJobStatus, TenantFingerprint};

use crate::config::FileIoConfig;
use crate::path_algebra::{
    self, descendant_prefix, synthesize_listing, validate_path, validate_project, ListEntry, WriteMode,
};

/// Lock scope key for `(tenant, project)`-serialized file mutations.
fn scope_key(tenant: &TenantFingerprint, project: &str) -> String {
    format!("fileio:{}:{project}", tenant.as_str())
}

/// Orchestrates virtual file system operations against the file store and
/// index outbox, under one advisory lock per mutation.
pub struct FileStoreService {
    files: Arc<dyn FileRepository>,
    outbox: Arc<dyn IndexOutboxRepository>,
    database: Arc<dyn DatabaseExecutor>,
    locks: Arc<dyn AdvisoryLockProvider>,
    vault: Arc<dyn CredentialVault>,
    config: FileIoConfig,
    /// §4.4.1 TTL for a stashed caller-credential envelope; an `UPSERT` job
    /// not claimed within this window loses its embedding credentials and is
    /// re-scheduled without one.
    credential_ttl_secs: u64,
}

/// Result of a successful `stat` call.
#[derive(Debug, Clone)]
pub struct StatResult {
    pub path: String,
    pub is_directory: bool,
    pub size_bytes: u64,
    pub version: u64,
}

impl FileStoreService {
    pub fn new(
        files: Arc<dyn FileRepository>,
        outbox: Arc<dyn IndexOutboxRepository>,
        database: Arc<dyn DatabaseExecutor>,
        locks: Arc<dyn AdvisoryLockProvider>,
        vault: Arc<dyn CredentialVault>,
        config: FileIoConfig,
        credential_ttl_secs: u64,
    ) -> Self {
        Self { files, outbox, database, locks, vault, config, credential_ttl_secs }
    }

    /// Stashes `api_key` into the credential vault when present, for an
    /// `Upsert` job the index worker will later resolve. Absent on anonymous
    /// or service-internal writes; those jobs simply run without one and the
    /// worker re-schedules them per §4.4.1 rather than falling back to a
    /// shared credential.
    async fn stash_credential(&self, api_key: Option<&str>) -> Result<Option<String>> {
        match api_key {
            Some(key) => Ok(Some(self.vault.stash(key, self.credential_ttl_secs).await?.0)),
            None => Ok(None),
        }
    }

    /// §4.3 `read`: returns the full content of an active file.
    ///
    /// A path with active descendants is a synthesized directory, not a
    /// missing file; that case fails `IS_DIRECTORY` rather than `NOT_FOUND`,
    /// mirroring [`Self::stat`]'s pattern.
    pub async fn read(&self, tenant: &TenantFingerprint, project: &str, path: &str) -> Result<File> {
        validate_project(project)?;
        validate_path(path)?;
        if let Some(file) = self.files.find_active(tenant, project, path).await? {
            return Ok(file);
        }
        let count = self.files.count_active_under(tenant, project, &descendant_prefix(path)).await?;
        if count > 0 {
            return Err(Error::IsDirectory { path: path.to_owned() });
        }
        Err(Error::not_found(format!("file {path}")))
    }

    /// §4.3 `stat`: describes a file or synthesized directory at `path`.
    pub async fn stat(&self, tenant: &TenantFingerprint, project: &str, path: &str) -> Result<StatResult> {
        validate_project(project)?;
        validate_path(path)?;
        if let Some(file) = self.files.find_active(tenant, project, path).await? {
            return Ok(StatResult {
                path: file.path,
                is_directory: false,
                size_bytes: file.size_bytes,
                version: file.version,
            });
        }
        let count = self.files.count_active_under(tenant, project, &descendant_prefix(path)).await?;
        if count == 0 {
            return Err(Error::not_found(format!("file or directory {path}")));
        }
        Ok(StatResult { path: path.to_owned(), is_directory: true, size_bytes: 0, version: 0 })
    }

    /// §4.3 `list`: synthesizes a directory listing from active file paths.
    pub async fn list(
        &self,
        tenant: &TenantFingerprint,
        project: &str,
        path: &str,
        depth: u32,
        limit: Option<usize>,
    ) -> Result<(Vec<ListEntry>, bool)> {
        validate_project(project)?;
        validate_path(path)?;
        let limit = limit.unwrap_or(self.config.list_limit_default).min(self.config.list_limit_max);
        let prefix = descendant_prefix(path);
        if !path.is_empty() && self.files.find_active(tenant, project, path).await?.is_some() {
            return Err(Error::NotDirectory { path: path.to_owned() });
        }
        let files = self.files.list_active_paths(tenant, project, &prefix, limit * 4 + 1, 0).await?;
        Ok(synthesize_listing(path, depth.max(1), &files, limit))
    }

    /// §4.3 `write`: creates or mutates a file, enqueuing the matching index
    /// job in the same transaction.
    pub async fn write(
        &self,
        tenant: &TenantFingerprint,
        project: &str,
        path: &str,
        mode: WriteMode,
        offset: i64,
        payload: &str,
        api_key: Option<&str>,
    ) -> Result<File> {
        validate_project(project)?;
        validate_path(path)?;
        if path.is_empty() {
            return Err(Error::IsDirectory { path: "/".to_owned() });
        }
        if payload.len() as u64 > self.config.max_payload_bytes {
            return Err(Error::PayloadTooLarge {
                message: format!("payload exceeds {} bytes", self.config.max_payload_bytes),
            });
        }

        let _guard = self.locks.acquire(&scope_key(tenant, project), self.config.lock_timeout_ms).await?;

        for parent in path_algebra::strict_parent_prefixes(path) {
            if self.files.find_active(tenant, project, &parent).await?.is_some() {
                return Err(Error::NotDirectory { path: parent });
            }
        }

        let existing = self.files.find_active(tenant, project, path).await?;
        let new_content = path_algebra::apply_write(existing.as_ref().map(|f| f.content.as_str()), mode, offset, payload)?;

        if new_content.len() as u64 > self.config.max_file_bytes {
            return Err(Error::QuotaExceeded {
                message: format!("file exceeds {} bytes", self.config.max_file_bytes),
            });
        }
        let previous_size = existing.as_ref().map_or(0, |f| f.size_bytes);
        let project_total = self.files.sum_active_bytes(tenant, project).await?;
        let project_total_after = project_total - previous_size + new_content.len() as u64;
        if project_total_after > self.config.max_project_bytes {
            return Err(Error::QuotaExceeded {
                message: format!("project exceeds {} bytes", self.config.max_project_bytes),
            });
        }

        let now = Utc::now();
        let tx = self.database.begin().await?;

        let file = match existing {
            Some(mut f) => {
                let new_version = f.version + 1;
                self.files
                    .update_content(f.id, &new_content, new_content.len() as u64, new_version)
                    .await?;
                f.content = new_content;
                f.size_bytes = f.content.len() as u64;
                f.version = new_version;
                f.updated_at = now;
                f
            }
            None => {
                let file = File {
                    id: FileId::new(),
                    tenant: tenant.clone(),
                    project: project.to_owned(),
                    path: path.to_owned(),
                    size_bytes: new_content.len() as u64,
                    content: new_content,
                    version: 1,
                    deleted_at: None,
                    created_at: now,
                    updated_at: now,
                };
                self.files.insert(&file).await?;
                file
            }
        };

        let credential_ref = self.stash_credential(api_key).await?;
        let job = IndexJob {
            id: IndexJobId::new(),
            tenant: tenant.clone(),
            project: project.to_owned(),
            file_id: file.id,
            kind: IndexJobKind::Upsert,
            status: IndexJobStatus::Pending,
            attempts: 0,
            last_error: None,
            created_at: now,
            claimed_at: None,
            credential_ref,
        };
        self.outbox.enqueue(&job).await?;

        tx.commit().await?;
        Ok(file)
    }

    /// §4.3 `delete`: soft-deletes a file (or every active file under a
    /// directory path when `recursive`), enqueuing a tombstone index job per
    /// file.
    pub async fn delete(
        &self,
        tenant: &TenantFingerprint,
        project: &str,
        path: &str,
        recursive: bool,
    ) -> Result<u64> {
        validate_project(project)?;
        validate_path(path)?;
        if path.is_empty() && !self.config.allow_root_wipe {
            return Err(Error::PermissionDenied { message: "root wipe is disabled".to_owned() });
        }

        let _guard = self.locks.acquire(&scope_key(tenant, project), self.config.lock_timeout_ms).await?;

        let mut targets = Vec::new();
        if let Some(file) = self.files.find_active(tenant, project, path).await? {
            targets.push(file);
        }
        let descendants = self.files.list_active_paths(tenant, project, &descendant_prefix(path), usize::MAX, 0).await?;
        if !descendants.is_empty() && !recursive && targets.is_empty() {
            return Err(Error::NotEmpty { path: path.to_owned() });
        }
        targets.extend(descendants);

        if targets.is_empty() {
            return Err(Error::not_found(format!("file or directory {path}")));
        }

        let tx = self.database.begin().await?;
        let now = Utc::now();
        for file in &targets {
            self.files.soft_delete(file.id).await?;
            let job = IndexJob {
                id: IndexJobId::new(),
                tenant: tenant.clone(),
                project: project.to_owned(),
                file_id: file.id,
                kind: IndexJobKind::Delete,
                status: IndexJobStatus::Pending,
                attempts: 0,
                last_error: None,
                created_at: now,
                claimed_at: None,
                credential_ref: None,
            };
            self.outbox.enqueue(&job).await?;
        }
        tx.commit().await?;

        Ok(targets.len() as u64)
    }

    /// §4.3 `rename`: moves a single active file, or an entire synthesized
    /// subtree, to a new path prefix within the same project.
    ///
    /// Disallows a root source/destination and moving a path into its own
    /// subtree. `overwrite` is only honored when exactly one source file
    /// would replace exactly one destination file; the replaced file is
    /// soft-deleted first. Every moved file re-enqueues `DELETE(old) +
    /// UPSERT(new)` so chunk `file_path` denormalization stays current.
    pub async fn rename(
        &self,
        tenant: &TenantFingerprint,
        project: &str,
        from: &str,
        to: &str,
        overwrite: bool,
        api_key: Option<&str>,
    ) -> Result<u64> {
        validate_project(project)?;
        validate_path(from)?;
        validate_path(to)?;
        if from.is_empty() || to.is_empty() {
            return Err(Error::InvalidPath { message: "rename does not support the project root".to_owned() });
        }
        if to == from || to.starts_with(&format!("{from}/")) {
            return Err(Error::InvalidPath { message: "destination must not be inside the source subtree".to_owned() });
        }

        let _guard = self.locks.acquire(&scope_key(tenant, project), self.config.lock_timeout_ms).await?;

        let mut sources = Vec::new();
        if let Some(file) = self.files.find_active(tenant, project, from).await? {
            sources.push(file);
        }
        let descendants = self.files.list_active_paths(tenant, project, &descendant_prefix(from), usize::MAX, 0).await?;
        let is_subtree_move = sources.is_empty() && !descendants.is_empty();
        sources.extend(descendants);
        if sources.is_empty() {
            return Err(Error::not_found(format!("file or directory {from}")));
        }

        for parent in path_algebra::strict_parent_prefixes(to) {
            if self.files.find_active(tenant, project, &parent).await?.is_some() {
                return Err(Error::NotDirectory { path: parent });
            }
        }

        let mut moves = Vec::with_capacity(sources.len());
        for src in &sources {
            let dst = format!("{to}{}", &src.path[from.len()..]);
            let collision = self.files.find_active(tenant, project, &dst).await?;
            match collision {
                None => {}
                Some(existing) if overwrite && sources.len() == 1 && !is_subtree_move => {
                    self.files.soft_delete(existing.id).await?;
                }
                Some(_) => return Err(Error::AlreadyExists { path: dst }),
            }
            moves.push((src.id, dst));
        }

        let tx = self.database.begin().await?;
        let now = Utc::now();
        let credential_ref = self.stash_credential(api_key).await?;
        for (file_id, dst) in &moves {
            self.files.rename(*file_id, dst).await?;
            let delete_job = IndexJob {
                id: IndexJobId::new(),
                tenant: tenant.clone(),
                project: project.to_owned(),
                file_id: *file_id,
                kind: IndexJobKind::Delete,
                status: IndexJobStatus::Pending,
                attempts: 0,
                last_error: None,
                created_at: now,
                claimed_at: None,
                credential_ref: None,
            };
            self.outbox.enqueue(&delete_job).await?;
            let upsert_job = IndexJob {
                id: IndexJobId::new(),
                tenant: tenant.clone(),
                project: project.to_owned(),
                file_id: *file_id,
                kind: IndexJobKind::Upsert,
                status: IndexJobStatus::Pending,
                attempts: 0,
                last_error: None,
                created_at: now,
                claimed_at: None,
                credential_ref: credential_ref.clone(),
            };
            self.outbox.enqueue(&upsert_job).await?;
        }
        tx.commit().await?;

        Ok(moves.len() as u64)
    }
}
