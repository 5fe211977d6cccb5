//! Index Outbox Worker pool (C4 consumer side): claims pending jobs, chunks
//! and embeds `Upsert` jobs, tears down `Delete` jobs, and retries with
//! backoff per §4.4.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;

use toolgate_domain::entities::{Chunk, ChunkEmbedding, ChunkLexicalRow, IndexJob};
use toolgate_domain::error::Result;
use toolgate_domain::ports::infrastructure::{CredentialRef, CredentialVault, MetricsSink};
use toolgate_domain::ports::providers::{EmbeddingProvider, LexicalSearchProvider, VectorStoreProvider};
use toolgate_domain::ports::repositories::{FileRepository, IndexOutboxRepository};
use toolgate_domain::value_objects::{ChunkId, FileId, IndexJobKind};

use crate::config::IndexConfig;

/// Splits `content` into paragraph-bounded chunks capped at `max_chunk_chars`,
/// returning exact `(start_byte, end_byte)` ranges into the original string
/// so a chunk's text is always reproducible as `content[start..end]`.
fn chunk_file_content(content: &str, max_chunk_chars: usize) -> Vec<(u64, u64, String)> {
    if content.is_empty() {
        return Vec::new();
    }

    // Paragraph boundaries, split on a blank line, covering the whole string.
    let mut paragraphs = Vec::new();
    let mut pos = 0usize;
    loop {
        match content[pos..].find("\n\n") {
            Some(rel) => {
                paragraphs.push((pos, pos + rel));
                pos += rel + 2;
            }
            None => {
                paragraphs.push((pos, content.len()));
                break;
            }
        }
    }

    let mut chunks = Vec::new();
    let mut chunk_start: Option<usize> = None;
    let mut chunk_end = 0usize;

    for (p_start, p_end) in paragraphs {
        let start = chunk_start.unwrap_or(p_start);
        if chunk_start.is_some() && p_end - start > max_chunk_chars {
            chunks.push((start as u64, chunk_end as u64, content[start..chunk_end].to_owned()));
            chunk_start = None;
        }
        let start = chunk_start.unwrap_or(p_start);
        chunk_start = Some(start);
        chunk_end = p_end;

        // A single paragraph longer than the cap is hard-split on char boundaries.
        while chunk_end - chunk_start.unwrap() > max_chunk_chars {
            let cs = chunk_start.unwrap();
            let split_at = content[cs..]
                .char_indices()
                .nth(max_chunk_chars)
                .map_or(chunk_end, |(i, _)| cs + i)
                .min(chunk_end);
            if split_at <= cs {
                break;
            }
            chunks.push((cs as u64, split_at as u64, content[cs..split_at].to_owned()));
            chunk_start = Some(split_at);
        }
    }

    if let Some(cs) = chunk_start {
        if cs < chunk_end {
            chunks.push((cs as u64, chunk_end as u64, content[cs..chunk_end].to_owned()));
        }
    }
    chunks
}

fn normalize_for_lexical(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ").to_lowercase()
}

/// Runs the chunk/embed/write machinery for one `Upsert` job against the
/// file's current content, and the teardown for a `Delete` job. Shared by
/// every worker in the pool; holds no per-job state.
pub struct IndexWorker {
    outbox: Arc<dyn IndexOutboxRepository>,
    files: Arc<dyn FileRepository>,
    embedder: Arc<dyn EmbeddingProvider>,
    vector_store: Arc<dyn VectorStoreProvider>,
    lexical: Arc<dyn LexicalSearchProvider>,
    vault: Arc<dyn CredentialVault>,
    metrics: Arc<dyn MetricsSink>,
    config: IndexConfig,
}

impl IndexWorker {
    pub fn new(
        outbox: Arc<dyn IndexOutboxRepository>,
        files: Arc<dyn FileRepository>,
        embedder: Arc<dyn EmbeddingProvider>,
        vector_store: Arc<dyn VectorStoreProvider>,
        lexical: Arc<dyn LexicalSearchProvider>,
        vault: Arc<dyn CredentialVault>,
        metrics: Arc<dyn MetricsSink>,
        config: IndexConfig,
    ) -> Self {
        Self { outbox, files, embedder, vector_store, lexical, vault, metrics, config }
    }

    /// Runs one claim-and-process cycle; returns the number of jobs handled.
    /// `run` calls this in a loop with a poll interval between empty cycles.
    pub async fn tick(&self) -> Result<usize> {
        let claimed = self.outbox.claim_batch(self.config.batch_size).await?;
        if claimed.is_empty() {
            return Ok(0);
        }

        // §4.4 step 2: group by owning file, keeping only the latest job's
        // intent; superseded jobs in the same batch are marked done alongside it.
        let mut by_file: std::collections::HashMap<FileId, Vec<IndexJob>> = std::collections::HashMap::new();
        for job in claimed {
            by_file.entry(job.file_id).or_default().push(job);
        }

        let mut handled = 0usize;
        for (_, mut jobs) in by_file {
            jobs.sort_by_key(|j| j.created_at);
            let canonical = jobs.pop().expect("group is non-empty");
            for superseded in &jobs {
                let _ = self.outbox.mark_done(superseded.id).await;
            }

            match self.process_one(&canonical).await {
                Ok(()) => {
                    self.outbox.mark_done(canonical.id).await?;
                    self.metrics.increment_counter("index_job_done", 1, &[("kind", job_kind_label(canonical.kind))]);
                }
                Err(e) => {
                    let exhausted = canonical.exhausted(self.config.retry_max);
                    self.outbox.mark_failed(canonical.id, &e.to_string(), exhausted).await?;
                    toolgate_domain::warn!("index_worker", "job attempt failed", &e);
                    self.metrics.increment_counter(
                        "index_job_failed",
                        1,
                        &[("kind", job_kind_label(canonical.kind)), ("exhausted", if exhausted { "true" } else { "false" })],
                    );
                }
            }
            handled += 1;
        }

        if let Ok(Some(lag)) = self.outbox.oldest_pending_age_secs().await {
            self.metrics.set_gauge("index_outbox_oldest_pending_age_secs", lag as f64, &[]);
        }

        Ok(handled)
    }

    async fn process_one(&self, job: &IndexJob) -> Result<()> {
        match job.kind {
            IndexJobKind::Delete => self.process_delete(job).await,
            IndexJobKind::Upsert => self.process_upsert(job).await,
        }
    }

    async fn process_delete(&self, job: &IndexJob) -> Result<()> {
        let stale_ids = self.outbox.delete_chunks_for_file(job.file_id).await?;
        if !stale_ids.is_empty() {
            self.vector_store.delete(&job.tenant, &job.project, &stale_ids).await?;
            self.lexical.delete(&job.tenant, &job.project, &stale_ids).await?;
        }
        Ok(())
    }

    async fn process_upsert(&self, job: &IndexJob) -> Result<()> {
        let file = match self.files.find_by_id(job.file_id).await? {
            Some(f) if f.deleted_at.is_none() => f,
            // File was deleted (or hard-purged) since this job was enqueued;
            // tear down any rows it had instead of trying to rebuild them.
            _ => return self.process_delete(job).await,
        };

        let Some(reference) = job.credential_ref.as_ref() else {
            return Err(toolgate_domain::error::Error::resource_busy(
                "upsert job has no credential envelope; re-scheduling per §4.4.1",
            ));
        };
        let api_key = self.vault.resolve_and_evict(&CredentialRef(reference.clone())).await?;

        let pieces = chunk_file_content(&file.content, self.config.max_chunk_chars);
        if pieces.is_empty() {
            let stale_ids = self.outbox.delete_chunks_for_file(job.file_id).await?;
            if !stale_ids.is_empty() {
                self.vector_store.delete(&job.tenant, &job.project, &stale_ids).await?;
                self.lexical.delete(&job.tenant, &job.project, &stale_ids).await?;
            }
            return Ok(());
        }

        let texts: Vec<String> = pieces.iter().map(|(_, _, text)| text.clone()).collect();
        let vectors = self.embedder.embed_batch(&texts, Some(api_key.as_str())).await?;
        if vectors.len() != pieces.len() {
            return Err(toolgate_domain::error::Error::search_backend(
                "embedding provider returned a mismatched vector count",
            ));
        }

        let now = Utc::now();
        let model = self.embedder.model_name().to_owned();
        let chunks: Vec<Chunk> = pieces
            .iter()
            .enumerate()
            .map(|(ordinal, (start_byte, end_byte, text))| Chunk {
                id: ChunkId::new(),
                tenant: job.tenant.clone(),
                project: job.project.clone(),
                file_id: file.id,
                file_path: file.path.clone(),
                ordinal: ordinal as u32,
                start_byte: *start_byte,
                end_byte: *end_byte,
                text: text.clone(),
                file_version: file.version,
                last_served_at: None,
                created_at: now,
            })
            .collect();
        let embeddings: Vec<ChunkEmbedding> = chunks
            .iter()
            .zip(vectors.iter())
            .map(|(chunk, vector)| ChunkEmbedding {
                chunk_id: chunk.id,
                model: model.clone(),
                vector: vector.clone(),
                created_at: now,
            })
            .collect();
        let lexical_rows: Vec<ChunkLexicalRow> = chunks
            .iter()
            .map(|chunk| ChunkLexicalRow {
                chunk_id: chunk.id,
                normalized_text: normalize_for_lexical(&chunk.text),
                created_at: now,
            })
            .collect();

        let stale_ids = self.outbox.delete_chunks_for_file(job.file_id).await?;
        if !stale_ids.is_empty() {
            self.vector_store.delete(&job.tenant, &job.project, &stale_ids).await?;
            self.lexical.delete(&job.tenant, &job.project, &stale_ids).await?;
        }

        for (chunk, embedding) in chunks.iter().zip(embeddings.iter()) {
            self.vector_store.upsert(&job.tenant, &job.project, chunk.id, &embedding.vector).await?;
        }
        for (chunk, row) in chunks.iter().zip(lexical_rows.iter()) {
            self.lexical.index(&job.tenant, &job.project, chunk.id, &row.normalized_text).await?;
        }
        self.outbox.replace_chunks(job.file_id, &chunks, &embeddings, &lexical_rows).await?;

        Ok(())
    }
}

fn job_kind_label(kind: IndexJobKind) -> &'static str {
    match kind {
        IndexJobKind::Upsert => "upsert",
        IndexJobKind::Delete => "delete",
    }
}

/// Runs `worker` in a poll loop on the current task until `shutdown` resolves,
/// sleeping `poll_interval` after an empty cycle so idle workers don't spin.
///
/// One `toolgate_domain::value_objects` detail is not modeled here: the
/// caller spawns `config.workers` instances of this loop onto the runtime to
/// form the pool described in §4.4; this function is the body of one worker.
pub async fn run(worker: Arc<IndexWorker>, poll_interval: Duration, mut shutdown: tokio::sync::watch::Receiver<bool>) {
    loop {
        tokio::select! {
            _ = shutdown.changed() => {
                if *shutdown.borrow() {
                    return;
                }
            }
            result = worker.tick() => {
                match result {
                    Ok(0) => tokio::time::sleep(poll_interval).await,
                    Ok(_) => {}
                    Err(e) => {
                        toolgate_domain::error!("index_worker", "claim cycle failed", &e);
                        tokio::time::sleep(poll_interval).await;
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paragraphs_under_the_cap_form_one_chunk() {
        let content = "first paragraph.\n\nsecond paragraph.";
        let chunks = chunk_file_content(content, 100);
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].2, content);
    }

    #[test]
    fn chunk_byte_ranges_round_trip_through_the_source() {
        let content = "alpha paragraph one.\n\nbravo paragraph two.\n\ncharlie paragraph three.";
        let chunks = chunk_file_content(content, 30);
        assert!(chunks.len() >= 2);
        for (start, end, text) in &chunks {
            assert_eq!(&content[*start as usize..*end as usize], text.as_str());
        }
    }

    #[test]
    fn a_paragraph_longer_than_the_cap_is_hard_split_on_char_boundaries() {
        let content = "x".repeat(250);
        let chunks = chunk_file_content(&content, 100);
        assert_eq!(chunks.len(), 3);
        for (start, end, text) in &chunks {
            assert_eq!(&content[*start as usize..*end as usize], text.as_str());
        }
    }

    #[test]
    fn empty_content_yields_no_chunks() {
        assert!(chunk_file_content("", 100).is_empty());
    }

    #[test]
    fn normalization_lowercases_and_collapses_whitespace() {
        assert_eq!(normalize_for_lexical("Hello   World\n\tagain"), "hello world again");
    }
}
