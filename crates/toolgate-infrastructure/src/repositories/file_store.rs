//! SQLite implementation of [`FileRepository`] (C3), grounded on the teacher's
//! `SqliteMemoryRepository` query style: plain `sqlx::query` strings bound
//! positionally, routed here through the domain's [`DatabaseExecutor`] port
//! instead of a raw `SqlitePool`.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;

use toolgate_domain::entities::File;
use toolgate_domain::error::Result;
use toolgate_domain::ports::infrastructure::{DatabaseExecutor, SqlParam};
use toolgate_domain::ports::FileRepository;
use toolgate_domain::value_objects::{FileId, TenantFingerprint};

use super::convert::{column_i64, column_string, column_tenant, column_timestamp, column_timestamp_opt, column_u64, timestamp};

/// SQLite-backed [`FileRepository`].
pub struct SqliteFileRepository {
    db: Arc<dyn DatabaseExecutor>,
}

impl SqliteFileRepository {
    #[must_use]
    pub fn new(db: Arc<dyn DatabaseExecutor>) -> Self {
        Self { db }
    }
}

fn escape_like(prefix: &str) -> String {
    prefix.replace('\\', "\\\\").replace('%', "\\%").replace('_', "\\_")
}

fn row_to_file(row: &Arc<dyn toolgate_domain::ports::infrastructure::SqlRow>) -> Result<File> {
    Ok(File {
        id: FileId::from_string(&column_string(row, "id")?),
        tenant: column_tenant(row, "tenant_fingerprint")?,
        project: column_string(row, "project")?,
        path: column_string(row, "path")?,
        content: column_string(row, "content")?,
        size_bytes: column_u64(row, "size_bytes")?,
        version: column_u64(row, "version")?,
        deleted_at: column_timestamp_opt(row, "deleted_at")?,
        created_at: column_timestamp(row, "created_at")?,
        updated_at: column_timestamp(row, "updated_at")?,
    })
}

#[async_trait]
impl FileRepository for SqliteFileRepository {
    async fn find_active(&self, tenant: &TenantFingerprint, project: &str, path: &str) -> Result<Option<File>> {
        let row = self
            .db
            .query_one(
                "SELECT * FROM files WHERE tenant_fingerprint = ? AND project = ? AND path = ? AND deleted_at IS NULL",
                &[SqlParam::String(tenant.as_str().to_owned()), SqlParam::String(project.to_owned()), SqlParam::String(path.to_owned())],
            )
            .await?;
        row.as_ref().map(row_to_file).transpose()
    }

    async fn find_by_id(&self, id: FileId) -> Result<Option<File>> {
        let row = self.db.query_one("SELECT * FROM files WHERE id = ?", &[SqlParam::String(id.as_str())]).await?;
        row.as_ref().map(row_to_file).transpose()
    }

    async fn insert(&self, file: &File) -> Result<()> {
        self.db
            .execute(
                "INSERT INTO files (id, tenant_fingerprint, project, path, content, size_bytes, version, deleted_at, created_at, updated_at)
                 VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
                &[
                    SqlParam::String(file.id.as_str()),
                    SqlParam::String(file.tenant.as_str().to_owned()),
                    SqlParam::String(file.project.clone()),
                    SqlParam::String(file.path.clone()),
                    SqlParam::String(file.content.clone()),
                    SqlParam::I64(file.size_bytes as i64),
                    SqlParam::I64(file.version as i64),
                    file.deleted_at.map(timestamp).into(),
                    SqlParam::I64(timestamp(file.created_at)),
                    SqlParam::I64(timestamp(file.updated_at)),
                ],
            )
            .await
    }

    async fn update_content(&self, id: FileId, content: &str, size_bytes: u64, new_version: u64) -> Result<()> {
        self.db
            .execute(
                "UPDATE files SET content = ?, size_bytes = ?, version = ?, updated_at = ? WHERE id = ?",
                &[
                    SqlParam::String(content.to_owned()),
                    SqlParam::I64(size_bytes as i64),
                    SqlParam::I64(new_version as i64),
                    SqlParam::I64(timestamp(Utc::now())),
                    SqlParam::String(id.as_str()),
                ],
            )
            .await
    }

    async fn soft_delete(&self, id: FileId) -> Result<()> {
        let now = timestamp(Utc::now());
        self.db
            .execute(
                "UPDATE files SET deleted_at = ?, updated_at = ? WHERE id = ?",
                &[SqlParam::I64(now), SqlParam::I64(now), SqlParam::String(id.as_str())],
            )
            .await
    }

    async fn rename(&self, id: FileId, new_path: &str) -> Result<()> {
        self.db
            .execute(
                "UPDATE files SET path = ?, updated_at = ? WHERE id = ?",
                &[SqlParam::String(new_path.to_owned()), SqlParam::I64(timestamp(Utc::now())), SqlParam::String(id.as_str())],
            )
            .await
    }

    async fn list_active_paths(&self, tenant: &TenantFingerprint, project: &str, prefix: &str, limit: usize, offset: usize) -> Result<Vec<File>> {
        let like_pattern = format!("{}%", escape_like(prefix));
        let rows = self
            .db
            .query_all(
                "SELECT * FROM files WHERE tenant_fingerprint = ? AND project = ? AND path LIKE ? ESCAPE '\\' AND deleted_at IS NULL
                 ORDER BY path ASC LIMIT ? OFFSET ?",
                &[
                    SqlParam::String(tenant.as_str().to_owned()),
                    SqlParam::String(project.to_owned()),
                    SqlParam::String(like_pattern),
                    SqlParam::I64(limit as i64),
                    SqlParam::I64(offset as i64),
                ],
            )
            .await?;
        rows.iter().map(row_to_file).collect()
    }

    async fn count_active_under(&self, tenant: &TenantFingerprint, project: &str, prefix: &str) -> Result<u64> {
        let like_pattern = format!("{}%", escape_like(prefix));
        let row = self
            .db
            .query_one(
                "SELECT COUNT(*) AS n FROM files WHERE tenant_fingerprint = ? AND project = ? AND path LIKE ? ESCAPE '\\' AND deleted_at IS NULL",
                &[SqlParam::String(tenant.as_str().to_owned()), SqlParam::String(project.to_owned()), SqlParam::String(like_pattern)],
            )
            .await?;
        match row {
            Some(r) => Ok(column_i64(&r, "n")?.max(0) as u64),
            None => Ok(0),
        }
    }

    async fn sum_active_bytes(&self, tenant: &TenantFingerprint, project: &str) -> Result<u64> {
        let row = self
            .db
            .query_one(
                "SELECT COALESCE(SUM(size_bytes), 0) AS n FROM files WHERE tenant_fingerprint = ? AND project = ? AND deleted_at IS NULL",
                &[SqlParam::String(tenant.as_str().to_owned()), SqlParam::String(project.to_owned())],
            )
            .await?;
        match row {
            Some(r) => Ok(column_i64(&r, "n")?.max(0) as u64),
            None => Ok(0),
        }
    }

    async fn purge_soft_deleted_before(&self, cutoff: chrono::DateTime<chrono::Utc>, batch_size: u32) -> Result<u64> {
        let rows = self
            .db
            .query_all(
                "SELECT id FROM files WHERE deleted_at IS NOT NULL AND deleted_at < ? LIMIT ?",
                &[SqlParam::I64(timestamp(cutoff)), SqlParam::I64(i64::from(batch_size))],
            )
            .await?;
        let ids: Vec<String> = rows.iter().map(|r| column_string(r, "id")).collect::<Result<_>>()?;
        for id in &ids {
            self.db.execute("DELETE FROM chunk_lexical_rows WHERE chunk_id IN (SELECT id FROM chunks WHERE file_id = ?)", &[SqlParam::String(id.clone())]).await?;
            self.db.execute("DELETE FROM chunk_embeddings WHERE chunk_id IN (SELECT id FROM chunks WHERE file_id = ?)", &[SqlParam::String(id.clone())]).await?;
            self.db.execute("DELETE FROM chunks WHERE file_id = ?", &[SqlParam::String(id.clone())]).await?;
            self.db.execute("DELETE FROM index_jobs WHERE file_id = ?", &[SqlParam::String(id.clone())]).await?;
            self.db.execute("DELETE FROM files WHERE id = ?", &[SqlParam::String(id.clone())]).await?;
        }
        Ok(ids.len() as u64)
    }
}
