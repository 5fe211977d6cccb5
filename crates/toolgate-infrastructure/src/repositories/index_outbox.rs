//! SQLite implementation of [`IndexOutboxRepository`] (C4), grounded on the
//! teacher's `SqliteMemoryRepository` conflict-aware upsert style, extended
//! with the claim/replace-chunks transactions §6 requires.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;

use toolgate_domain::entities::{Chunk, ChunkEmbedding, ChunkLexicalRow, IndexJob};
use toolgate_domain::error::{Error, Result};
use toolgate_domain::ports::infrastructure::{DatabaseExecutor, SqlParam, SqlRow};
use toolgate_domain::ports::IndexOutboxRepository;
use toolgate_domain::value_objects::{ChunkId, FileId, IndexJobId, IndexJobKind, IndexJobStatus, TenantFingerprint};

use super::convert::{column_i64, column_string, column_tenant, column_timestamp, column_timestamp_opt, column_u64, timestamp};

fn kind_to_str(kind: IndexJobKind) -> &'static str {
    match kind {
        IndexJobKind::Upsert => "UPSERT",
        IndexJobKind::Delete => "DELETE",
    }
}

fn kind_from_str(s: &str) -> Result<IndexJobKind> {
    match s {
        "UPSERT" => Ok(IndexJobKind::Upsert),
        "DELETE" => Ok(IndexJobKind::Delete),
        other => Err(Error::internal(format!("unknown index job kind: {other}"))),
    }
}

fn status_to_str(status: IndexJobStatus) -> &'static str {
    match status {
        IndexJobStatus::Pending => "pending",
        IndexJobStatus::Processing => "processing",
        IndexJobStatus::Done => "done",
        IndexJobStatus::Failed => "failed",
    }
}

fn status_from_str(s: &str) -> Result<IndexJobStatus> {
    match s {
        "pending" => Ok(IndexJobStatus::Pending),
        "processing" => Ok(IndexJobStatus::Processing),
        "done" => Ok(IndexJobStatus::Done),
        "failed" => Ok(IndexJobStatus::Failed),
        other => Err(Error::internal(format!("unknown index job status: {other}"))),
    }
}

fn row_to_job(row: &Arc<dyn SqlRow>) -> Result<IndexJob> {
    Ok(IndexJob {
        id: IndexJobId::from_string(&column_string(row, "id")?),
        tenant: column_tenant(row, "tenant_fingerprint")?,
        project: column_string(row, "project")?,
        file_id: FileId::from_string(&column_string(row, "file_id")?),
        kind: kind_from_str(&column_string(row, "kind")?)?,
        status: status_from_str(&column_string(row, "status")?)?,
        attempts: column_u64(row, "attempts")? as u32,
        last_error: row.try_get_string("last_error")?,
        created_at: column_timestamp(row, "created_at")?,
        claimed_at: column_timestamp_opt(row, "claimed_at")?,
        credential_ref: row.try_get_string("credential_ref")?,
    })
}

fn row_to_chunk(row: &Arc<dyn SqlRow>) -> Result<Chunk> {
    Ok(Chunk {
        id: ChunkId::from_string(&column_string(row, "id")?),
        tenant: column_tenant(row, "tenant_fingerprint")?,
        project: column_string(row, "project")?,
        file_id: FileId::from_string(&column_string(row, "file_id")?),
        file_path: column_string(row, "file_path")?,
        ordinal: column_u64(row, "ordinal")? as u32,
        start_byte: column_u64(row, "start_byte")?,
        end_byte: column_u64(row, "end_byte")?,
        text: column_string(row, "text")?,
        file_version: column_u64(row, "file_version")?,
        last_served_at: column_timestamp_opt(row, "last_served_at")?,
        created_at: column_timestamp(row, "created_at")?,
    })
}

/// SQLite-backed [`IndexOutboxRepository`].
pub struct SqliteIndexOutboxRepository {
    db: Arc<dyn DatabaseExecutor>,
}

impl SqliteIndexOutboxRepository {
    #[must_use]
    pub fn new(db: Arc<dyn DatabaseExecutor>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl IndexOutboxRepository for SqliteIndexOutboxRepository {
    async fn enqueue(&self, job: &IndexJob) -> Result<()> {
        self.db
            .execute(
                "INSERT INTO index_jobs (id, tenant_fingerprint, project, file_id, kind, status, attempts, last_error, created_at, claimed_at, credential_ref)
                 VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
                &[
                    SqlParam::String(job.id.as_str()),
                    SqlParam::String(job.tenant.as_str().to_owned()),
                    SqlParam::String(job.project.clone()),
                    SqlParam::String(job.file_id.as_str()),
                    SqlParam::String(kind_to_str(job.kind).to_owned()),
                    SqlParam::String(status_to_str(job.status).to_owned()),
                    SqlParam::I64(i64::from(job.attempts)),
                    job.last_error.clone().into(),
                    SqlParam::I64(timestamp(job.created_at)),
                    job.claimed_at.map(timestamp).into(),
                    job.credential_ref.clone().into(),
                ],
            )
            .await
    }

    async fn claim_batch(&self, batch_size: u32) -> Result<Vec<IndexJob>> {
        let tx = self.db.begin().await?;
        let rows = tx
            .query_all("SELECT * FROM index_jobs WHERE status = 'pending' ORDER BY created_at ASC LIMIT ?", &[SqlParam::I64(i64::from(batch_size))])
            .await?;
        let jobs: Vec<IndexJob> = rows.iter().map(row_to_job).collect::<Result<_>>()?;
        let now = timestamp(Utc::now());
        for job in &jobs {
            tx.execute(
                "UPDATE index_jobs SET status = 'processing', claimed_at = ? WHERE id = ?",
                &[SqlParam::I64(now), SqlParam::String(job.id.as_str())],
            )
            .await?;
        }
        tx.commit().await?;
        Ok(jobs.into_iter().map(|mut j| { j.status = IndexJobStatus::Processing; j }).collect())
    }

    async fn mark_done(&self, id: IndexJobId) -> Result<()> {
        self.db.execute("UPDATE index_jobs SET status = 'done' WHERE id = ?", &[SqlParam::String(id.as_str())]).await
    }

    async fn mark_failed(&self, id: IndexJobId, error: &str, exhausted: bool) -> Result<()> {
        let status = if exhausted { "failed" } else { "pending" };
        self.db
            .execute(
                "UPDATE index_jobs SET status = ?, attempts = attempts + 1, last_error = ?, claimed_at = NULL WHERE id = ?",
                &[SqlParam::String(status.to_owned()), SqlParam::String(error.to_owned()), SqlParam::String(id.as_str())],
            )
            .await
    }

    async fn replace_chunks(&self, file_id: FileId, chunks: &[Chunk], embeddings: &[ChunkEmbedding], lexical_rows: &[ChunkLexicalRow]) -> Result<()> {
        let tx = self.db.begin().await?;
        tx.execute("DELETE FROM chunk_lexical_rows WHERE chunk_id IN (SELECT id FROM chunks WHERE file_id = ?)", &[SqlParam::String(file_id.as_str())]).await?;
        tx.execute("DELETE FROM chunk_embeddings WHERE chunk_id IN (SELECT id FROM chunks WHERE file_id = ?)", &[SqlParam::String(file_id.as_str())]).await?;
        tx.execute("DELETE FROM chunks WHERE file_id = ?", &[SqlParam::String(file_id.as_str())]).await?;

        for chunk in chunks {
            tx.execute(
                "INSERT INTO chunks (id, tenant_fingerprint, project, file_id, file_path, ordinal, start_byte, end_byte, text, file_version, last_served_at, created_at)
                 VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
                &[
                    SqlParam::String(chunk.id.as_str()),
                    SqlParam::String(chunk.tenant.as_str().to_owned()),
                    SqlParam::String(chunk.project.clone()),
                    SqlParam::String(chunk.file_id.as_str()),
                    SqlParam::String(chunk.file_path.clone()),
                    SqlParam::I64(i64::from(chunk.ordinal)),
                    SqlParam::I64(chunk.start_byte as i64),
                    SqlParam::I64(chunk.end_byte as i64),
                    SqlParam::String(chunk.text.clone()),
                    SqlParam::I64(chunk.file_version as i64),
                    chunk.last_served_at.map(timestamp).into(),
                    SqlParam::I64(timestamp(chunk.created_at)),
                ],
            )
            .await?;
        }
        for embedding in embeddings {
            let vector_json = serde_json::to_string(&embedding.vector)?;
            tx.execute(
                "INSERT INTO chunk_embeddings (chunk_id, model, vector_json, created_at) VALUES (?, ?, ?, ?)",
                &[
                    SqlParam::String(embedding.chunk_id.as_str()),
                    SqlParam::String(embedding.model.clone()),
                    SqlParam::String(vector_json),
                    SqlParam::I64(timestamp(embedding.created_at)),
                ],
            )
            .await?;
        }
        for lexical in lexical_rows {
            tx.execute(
                "INSERT INTO chunk_lexical_rows (chunk_id, normalized_text, created_at) VALUES (?, ?, ?)",
                &[SqlParam::String(lexical.chunk_id.as_str()), SqlParam::String(lexical.normalized_text.clone()), SqlParam::I64(timestamp(lexical.created_at))],
            )
            .await?;
        }
        tx.commit().await
    }

    async fn delete_chunks_for_file(&self, file_id: FileId) -> Result<Vec<ChunkId>> {
        let rows = self.db.query_all("SELECT id FROM chunks WHERE file_id = ?", &[SqlParam::String(file_id.as_str())]).await?;
        let ids: Vec<ChunkId> = rows.iter().map(|r| column_string(r, "id").map(|s| ChunkId::from_string(&s))).collect::<Result<_>>()?;

        let tx = self.db.begin().await?;
        tx.execute("DELETE FROM chunk_lexical_rows WHERE chunk_id IN (SELECT id FROM chunks WHERE file_id = ?)", &[SqlParam::String(file_id.as_str())]).await?;
        tx.execute("DELETE FROM chunk_embeddings WHERE chunk_id IN (SELECT id FROM chunks WHERE file_id = ?)", &[SqlParam::String(file_id.as_str())]).await?;
        tx.execute("DELETE FROM chunks WHERE file_id = ?", &[SqlParam::String(file_id.as_str())]).await?;
        tx.commit().await?;

        Ok(ids)
    }

    async fn oldest_pending_age_secs(&self) -> Result<Option<i64>> {
        let row = self.db.query_one("SELECT created_at FROM index_jobs WHERE status = 'pending' ORDER BY created_at ASC LIMIT 1", &[]).await?;
        match row {
            Some(r) => {
                let created_at = column_i64(&r, "created_at")?;
                Ok(Some((timestamp(Utc::now()) - created_at).max(0)))
            }
            None => Ok(None),
        }
    }

    async fn find_chunks_by_ids(&self, tenant: &TenantFingerprint, project: &str, ids: &[ChunkId]) -> Result<Vec<Chunk>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let placeholders = vec!["?"; ids.len()].join(",");
        let sql = format!(
            "SELECT c.* FROM chunks c JOIN files f ON f.id = c.file_id
             WHERE c.tenant_fingerprint = ? AND c.project = ? AND c.id IN ({placeholders}) AND c.file_version = f.version AND f.deleted_at IS NULL"
        );
        let mut params = vec![SqlParam::String(tenant.as_str().to_owned()), SqlParam::String(project.to_owned())];
        params.extend(ids.iter().map(|id| SqlParam::String(id.as_str())));
        let rows = self.db.query_all(&sql, &params).await?;
        rows.iter().map(row_to_chunk).collect()
    }

    async fn mark_served(&self, ids: &[ChunkId], served_at: chrono::DateTime<chrono::Utc>) -> Result<()> {
        if ids.is_empty() {
            return Ok(());
        }
        let placeholders = vec!["?"; ids.len()].join(",");
        let sql = format!("UPDATE chunks SET last_served_at = ? WHERE id IN ({placeholders})");
        let mut params = vec![SqlParam::I64(timestamp(served_at))];
        params.extend(ids.iter().map(|id| SqlParam::String(id.as_str())));
        self.db.execute(&sql, &params).await
    }
}
