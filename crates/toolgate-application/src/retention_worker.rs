//! Retention Worker (C11): a background sweep, sibling to the index worker
//! pool, that hard-purges soft-deleted file rows once their retention window
//! has elapsed.
//!
//! Per-session memory fact expiry and log compaction (§4.6) run via
//! [`crate::memory_engine::MemoryEngine::run_maintenance`], invoked per
//! `(tenant, project, session_id)` rather than from this sweep: the file
//! store has no session directory to enumerate blindly, so a session's
//! maintenance is triggered by its own traffic (or an operator-driven sweep
//! one layer up) instead of being guessed at here.

use std::sync::Arc;
use std::time::Duration;

use chrono::{Duration as ChronoDuration, Utc};

use toolgate_domain::error::Result;
use toolgate_domain::ports::infrastructure::MetricsSink;
use toolgate_domain::ports::repositories::FileRepository;

use crate::config::FileIoConfig;

/// Hard-purges soft-deleted [`toolgate_domain::entities::File`] rows whose
/// `deleted_at` is older than `config.delete_retention_days`.
pub struct RetentionWorker {
    files: Arc<dyn FileRepository>,
    metrics: Arc<dyn MetricsSink>,
    config: FileIoConfig,
    purge_batch_size: u32,
}

impl RetentionWorker {
    pub fn new(
        files: Arc<dyn FileRepository>,
        metrics: Arc<dyn MetricsSink>,
        config: FileIoConfig,
        purge_batch_size: u32,
    ) -> Self {
        Self { files, metrics, config, purge_batch_size }
    }

    /// Purges every soft-deleted row past the retention cutoff, in batches,
    /// and returns the total rows removed.
    pub async fn sweep(&self) -> Result<u64> {
        let cutoff = Utc::now() - ChronoDuration::days(self.config.delete_retention_days);
        let mut total = 0u64;
        loop {
            let purged = self.files.purge_soft_deleted_before(cutoff, self.purge_batch_size).await?;
            total += purged;
            if purged < u64::from(self.purge_batch_size) {
                break;
            }
        }
        if total > 0 {
            self.metrics.increment_counter("retention_files_purged", total, &[]);
        }
        Ok(total)
    }
}

/// Runs [`RetentionWorker::sweep`] every `interval` until `shutdown` resolves.
pub async fn run(worker: Arc<RetentionWorker>, interval: Duration, mut shutdown: tokio::sync::watch::Receiver<bool>) {
    loop {
        tokio::select! {
            _ = shutdown.changed() => {
                if *shutdown.borrow() {
                    return;
                }
            }
            _ = tokio::time::sleep(interval) => {
                if let Err(e) = worker.sweep().await {
                    toolgate_domain::error!("retention_worker", "sweep failed", &e);
                }
            }
        }
    }
}
