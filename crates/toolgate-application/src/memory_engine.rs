//! Memory Engine use case (C6): the session-scoped `before_turn`/`after_turn`/
//! `run_maintenance`/`list_dir_with_abstract` lifecycle, built on top of the
//! File Store (C3) and Hybrid Search (C5).

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{Duration, Utc};
use serde_json::{json, Value};
use uuid::Uuid;

use toolgate_domain::error::{Error, Result};
use toolgate_domain::ports::infrastructure::AdvisoryLockProvider;
use toolgate_domain::ports::repositories::TurnGuardRepository;
use toolgate_domain::ports::services::{HybridSearchService, MemoryEngineService};
use toolgate_domain::value_objects::{MemoryTier, TenantFingerprint, TurnGuardId, TurnGuardStatus};
use toolgate_domain::entities::TurnGuard;

use crate::config::MemoryConfig;
use crate::file_store::FileStoreService;
use crate::path_algebra::WriteMode;

fn scope_key(tenant: &TenantFingerprint, project: &str, session_id: &str) -> String {
    format!("memory:{}:{project}:{session_id}", tenant.as_str())
}

fn log_dir(session_id: &str) -> String {
    format!("/memory/{session_id}/log")
}

/// One shard per UTC day; `run_maintenance` merges shards once they age past
/// `compaction_min_age_hours`, so the active shard never grows unbounded.
fn shard_id_for(now: chrono::DateTime<Utc>) -> String {
    now.format("%Y%m%d").to_string()
}

fn shard_path(session_id: &str, shard_id: &str) -> String {
    format!("/memory/{session_id}/log/{shard_id}.jsonl")
}

fn summary_path(session_id: &str) -> String {
    format!("/memory/{session_id}/log/summary.jsonl")
}

fn abstract_path(dir_path: &str) -> String {
    format!("{dir_path}.abstract")
}

fn fact_path(session_id: &str, tier: MemoryTier, fact_id: &str) -> String {
    format!("/memory/{session_id}/facts/{}/{fact_id}.md", tier.as_str())
}

/// Coordinates the memory engine's four operations atop the virtual file
/// system and the turn-guard idempotency table.
pub struct MemoryEngine {
    files: Arc<FileStoreService>,
    search: Arc<dyn HybridSearchService>,
    guards: Arc<dyn TurnGuardRepository>,
    locks: Arc<dyn AdvisoryLockProvider>,
    config: MemoryConfig,
}

impl MemoryEngine {
    pub fn new(
        files: Arc<FileStoreService>,
        search: Arc<dyn HybridSearchService>,
        guards: Arc<dyn TurnGuardRepository>,
        locks: Arc<dyn AdvisoryLockProvider>,
        config: MemoryConfig,
    ) -> Self {
        Self { files, search, guards, locks, config }
    }

    /// Reads the session's runtime log across its compacted summary (oldest)
    /// and its live day-shards (chronological), returning the last
    /// `recent_context_items` entries in ascending order.
    async fn read_log_events(&self, tenant: &TenantFingerprint, project: &str, session_id: &str) -> Result<Vec<Value>> {
        let mut lines: Vec<Value> = Vec::new();
        match self.files.read(tenant, project, &summary_path(session_id)).await {
            Ok(file) => lines.extend(file.content.lines().filter_map(|l| serde_json::from_str::<Value>(l).ok())),
            Err(Error::NotFound { .. }) => {}
            Err(e) => return Err(e),
        }

        let (entries, _) = self.files.list(tenant, project, &log_dir(session_id), 1, Some(self.config.max_processed_turns)).await?;
        let mut shard_paths: Vec<String> = entries
            .into_iter()
            .filter(|e| matches!(e.kind, crate::path_algebra::ListEntryKind::File) && e.path != summary_path(session_id))
            .map(|e| e.path)
            .collect();
        shard_paths.sort();
        for shard in shard_paths {
            if let Ok(file) = self.files.read(tenant, project, &shard).await {
                lines.extend(file.content.lines().filter_map(|l| serde_json::from_str::<Value>(l).ok()));
            }
        }

        let start = lines.len().saturating_sub(self.config.recent_context_items);
        Ok(lines.split_off(start))
    }

    /// Merges day-shards whose last write is older than
    /// `compaction_min_age_hours` into the session's summary file, then
    /// deletes the merged shards. Never touches today's shard.
    async fn compact_log_shards(&self, tenant: &TenantFingerprint, project: &str, session_id: &str, now: chrono::DateTime<Utc>) -> Result<u64> {
        let compaction_cutoff = now - Duration::hours(self.config.compaction_min_age_hours);
        let current_shard = shard_path(session_id, &shard_id_for(now));
        let session_summary = summary_path(session_id);
        let (entries, _) = self.files.list(tenant, project, &log_dir(session_id), 1, Some(self.config.max_processed_turns)).await.unwrap_or_default();

        let mut compacted = 0u64;
        for entry in entries {
            if !matches!(entry.kind, crate::path_algebra::ListEntryKind::File) {
                continue;
            }
            if entry.path == session_summary || entry.path == current_shard {
                continue;
            }
            let Ok(file) = self.files.read(tenant, project, &entry.path).await else { continue };
            if file.updated_at >= compaction_cutoff {
                continue;
            }
            self.files.write(tenant, project, &session_summary, WriteMode::Append, 0, &file.content, None).await?;
            self.files.delete(tenant, project, &entry.path, false).await?;
            compacted += 1;
        }
        Ok(compacted)
    }

    /// Regenerates each fact tier's `.abstract` sibling, rate-limited to
    /// `summary_refresh_interval_minutes` so a maintenance sweep that runs
    /// often doesn't rewrite the same file every time.
    async fn refresh_fact_abstracts(
        &self,
        tenant: &TenantFingerprint,
        project: &str,
        session_id: &str,
        now: chrono::DateTime<Utc>,
        remaining: &std::collections::HashMap<MemoryTier, u64>,
    ) -> Result<u64> {
        let refresh_window = Duration::minutes(self.config.summary_refresh_interval_minutes);
        let mut refreshed = 0u64;
        for tier in [MemoryTier::L1, MemoryTier::L2] {
            let dir_path = format!("/memory/{session_id}/facts/{}", tier.as_str());
            let path = abstract_path(&dir_path);
            if let Ok(existing) = self.files.read(tenant, project, &path).await {
                if now - existing.updated_at < refresh_window {
                    continue;
                }
            }
            let count = remaining.get(&tier).copied().unwrap_or(0);
            let text = format!("{count} active {} fact(s)", tier.as_str());
            self.files.write(tenant, project, &path, WriteMode::Truncate, 0, &text, None).await?;
            refreshed += 1;
        }
        Ok(refreshed)
    }

    fn strip_recalled_prefixes(input_items: &Value) -> Value {
        match input_items {
            Value::Array(items) => Value::Array(
                items
                    .iter()
                    .filter(|item| {
                        !item
                            .get("kind")
                            .and_then(Value::as_str)
                            .is_some_and(|k| k == "recalled_fact" || k == "memory_reference")
                    })
                    .cloned()
                    .collect(),
            ),
            other => other.clone(),
        }
    }
}

#[async_trait]
impl MemoryEngineService for MemoryEngine {
    async fn before_turn(
        &self,
        tenant: &TenantFingerprint,
        project: &str,
        session_id: &str,
        api_key: Option<&str>,
    ) -> Result<Value> {
        let recent_context = self.read_log_events(tenant, project, session_id).await?;

        let hits = self
            .search
            .search(
                tenant,
                project,
                session_id,
                &format!("/memory/{session_id}/facts/"),
                self.config.recall_facts_limit,
                api_key,
            )
            .await
            .unwrap_or_default();

        let recall_fact_ids: Vec<String> = hits.iter().map(|h| h.chunk.id.to_string()).collect();
        let input_items: Vec<Value> = recent_context
            .into_iter()
            .chain(hits.iter().map(|h| {
                json!({"kind": "recalled_fact", "text": h.chunk.text, "score": h.score})
            }))
            .collect();

        let context_token_count = input_items
            .iter()
            .filter_map(|item| item.get("text").and_then(Value::as_str).map(str::len))
            .sum::<usize>()
            / 4;

        Ok(json!({
            "input_items": input_items,
            "recall_fact_ids": recall_fact_ids,
            "context_token_count": context_token_count,
        }))
    }

    async fn after_turn(
        &self,
        tenant: &TenantFingerprint,
        project: &str,
        session_id: &str,
        turn_id: &str,
        payload: Value,
        api_key: Option<&str>,
    ) -> Result<Value> {
        let _guard = self
            .locks
            .acquire(&scope_key(tenant, project, session_id), self.config.session_lock_timeout_ms)
            .await?;

        let now = Utc::now();
        match self.guards.find(tenant, project, session_id, turn_id).await? {
            Some(existing) if existing.status == TurnGuardStatus::Done => {
                return Ok(existing
                    .result_json
                    .as_deref()
                    .and_then(|s| serde_json::from_str(s).ok())
                    .unwrap_or_else(|| json!({"ok": true})));
            }
            Some(existing) if !existing.is_stale(now, self.config.staleness_window_secs) => {
                return Err(Error::resource_busy("after_turn commit already in flight"));
            }
            Some(existing) => {
                self.guards.reclaim(existing.id).await?;
            }
            None => {
                let guard = TurnGuard {
                    id: TurnGuardId::new(),
                    tenant: tenant.clone(),
                    project: project.to_owned(),
                    session_id: session_id.to_owned(),
                    turn_id: turn_id.to_owned(),
                    status: TurnGuardStatus::Processing,
                    result_json: None,
                    created_at: now,
                    updated_at: now,
                };
                self.guards.start(&guard).await?;
            }
        }

        let input_items = payload.get("input_items").cloned().unwrap_or(Value::Null);
        let output_items = payload.get("output_items").cloned().unwrap_or(Value::Null);
        let delta_input = Self::strip_recalled_prefixes(&input_items);

        let entry = json!({
            "turn_id": turn_id,
            "input_items": delta_input,
            "output_items": output_items,
            "recorded_at": now.to_rfc3339(),
        });
        let line = format!("{}\n", serde_json::to_string(&entry)?);
        let current_shard = shard_path(session_id, &shard_id_for(now));
        self.files.write(tenant, project, &current_shard, WriteMode::Append, 0, &line, api_key).await?;

        if let Some(facts) = payload.get("extracted_facts").and_then(Value::as_array) {
            for fact in facts {
                let Some(text) = fact.get("text").and_then(Value::as_str) else { continue };
                let tier = match fact.get("tier").and_then(Value::as_str) {
                    Some("l2") => MemoryTier::L2,
                    _ => MemoryTier::L1,
                };
                let fact_id = Uuid::new_v4().to_string();
                let path = fact_path(session_id, tier, &fact_id);
                self.files.write(tenant, project, &path, WriteMode::Truncate, 0, text, api_key).await?;
            }
        }

        let result = json!({"ok": true});
        let guard_row = self
            .guards
            .find(tenant, project, session_id, turn_id)
            .await?
            .ok_or_else(|| Error::internal("turn guard vanished mid-commit"))?;
        self.guards.complete(guard_row.id, &serde_json::to_string(&result)?).await?;

        Ok(result)
    }

    async fn run_maintenance(
        &self,
        tenant: &TenantFingerprint,
        project: &str,
        session_id: &str,
    ) -> Result<Value> {
        let now = Utc::now();
        let cutoff_l1 = now - Duration::days(self.config.l1_retention_days);
        let cutoff_l2 = now - Duration::days(self.config.l2_retention_days);

        let mut expired = 0u64;
        let mut remaining: std::collections::HashMap<MemoryTier, u64> = std::collections::HashMap::new();
        for (tier, cutoff) in [(MemoryTier::L1, cutoff_l1), (MemoryTier::L2, cutoff_l2)] {
            let prefix = format!("/memory/{session_id}/facts/{}", tier.as_str());
            let (entries, _) = self
                .files
                .list(tenant, project, &prefix, 1, Some(self.config.max_processed_turns))
                .await
                .unwrap_or_default();
            let mut kept = 0u64;
            for entry in entries {
                if let Ok(file) = self.files.read(tenant, project, &entry.path).await {
                    if file.created_at < cutoff {
                        self.files.delete(tenant, project, &entry.path, false).await?;
                        expired += 1;
                    } else {
                        kept += 1;
                    }
                }
            }
            remaining.insert(tier, kept);
        }

        let compacted = self.compact_log_shards(tenant, project, session_id, now).await?;
        let refreshed = self.refresh_fact_abstracts(tenant, project, session_id, now, &remaining).await?;

        Ok(json!({"ok": true, "expired_facts": expired, "compacted_shards": compacted, "refreshed_abstracts": refreshed}))
    }

    async fn list_dir_with_abstract(
        &self,
        tenant: &TenantFingerprint,
        project: &str,
        path: &str,
    ) -> Result<Value> {
        let (entries, has_more) = self.files.list(tenant, project, path, 1, None).await?;
        let mut out = Vec::with_capacity(entries.len());
        for entry in entries {
            let abstract_text = match self.files.read(tenant, project, &abstract_path(&entry.path)).await {
                Ok(file) => Some(file.content),
                Err(_) => self.files.read(tenant, project, &format!("{}.overview", entry.path)).await.ok().map(|f| f.content),
            };
            out.push(json!({
                "path": entry.path,
                "is_directory": matches!(entry.kind, crate::path_algebra::ListEntryKind::Directory),
                "abstract": abstract_text,
            }));
        }
        Ok(json!({"entries": out, "has_more": has_more}))
    }
}
