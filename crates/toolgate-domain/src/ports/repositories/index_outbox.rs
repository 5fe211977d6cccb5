//! Index Outbox repository port (C4 producer side).

use async_trait::async_trait;

use crate::entities::{Chunk, ChunkEmbedding, ChunkLexicalRow, IndexJob};
use crate::error::Result;
use crate::value_objects::{ChunkId, FileId, IndexJobId};

/// Persistence contract for outbox jobs and the derived rows workers produce.
#[async_trait]
pub trait IndexOutboxRepository: Send + Sync {
    /// Insert a new job row, normally within the same transaction as the
    /// file mutation that produced it.
    async fn enqueue(&self, job: &IndexJob) -> Result<()>;

    /// Atomically claim up to `batch_size` pending jobs for processing,
    /// marking them `processing` so no other worker also claims them.
    async fn claim_batch(&self, batch_size: u32) -> Result<Vec<IndexJob>>;

    /// Mark a job done.
    async fn mark_done(&self, id: IndexJobId) -> Result<()>;

    /// Record a failed attempt; re-queues as `pending` unless `attempts` has
    /// reached the caller's retry budget, in which case it is left `failed`.
    async fn mark_failed(&self, id: IndexJobId, error: &str, exhausted: bool) -> Result<()>;

    /// Replace all chunks/embeddings/lexical rows for a file with a fresh set,
    /// in one transaction, so readers never observe a partially rebuilt file.
    async fn replace_chunks(
        &self,
        file_id: FileId,
        chunks: &[Chunk],
        embeddings: &[ChunkEmbedding],
        lexical_rows: &[ChunkLexicalRow],
    ) -> Result<()>;

    /// Delete all chunks/embeddings/lexical rows for a file.
    async fn delete_chunks_for_file(&self, file_id: FileId) -> Result<Vec<ChunkId>>;

    /// Oldest pending job's age, for freshness-SLO heartbeat reporting.
    async fn oldest_pending_age_secs(&self) -> Result<Option<i64>>;

    /// Fetch chunks by id, scoped to one tenant/project, skipping chunks whose
    /// `file_version` is behind the owning file's current version.
    async fn find_chunks_by_ids(
        &self,
        tenant: &crate::value_objects::TenantFingerprint,
        project: &str,
        ids: &[ChunkId],
    ) -> Result<Vec<Chunk>>;

    /// Touch `last_served_at` on the given chunks, per §8's invariant that it
    /// updates only for chunks included in a search response.
    async fn mark_served(&self, ids: &[ChunkId], served_at: chrono::DateTime<chrono::Utc>) -> Result<()>;
}
