//! Configuration value types consumed by the use-case layer.
//!
//! These are plain, `Deserialize`-able structs rather than domain value
//! objects: the infrastructure layer's `AppConfig` deserializes directly into
//! them via figment, so the shape on disk and the shape the use cases read
//! are the same type.

use serde::{Deserialize, Serialize};

/// §6 FileIO configuration surface.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct FileIoConfig {
    pub allow_root_wipe: bool,
    pub max_payload_bytes: u64,
    pub max_file_bytes: u64,
    pub max_project_bytes: u64,
    pub list_limit_default: usize,
    pub list_limit_max: usize,
    pub lock_timeout_ms: u64,
    pub delete_retention_days: i64,
}

impl Default for FileIoConfig {
    fn default() -> Self {
        Self {
            allow_root_wipe: false,
            max_payload_bytes: 10 * 1024 * 1024,
            max_file_bytes: 50 * 1024 * 1024,
            max_project_bytes: 5 * 1024 * 1024 * 1024,
            list_limit_default: 256,
            list_limit_max: 4096,
            lock_timeout_ms: 5_000,
            delete_retention_days: 30,
        }
    }
}

/// §6 Search configuration surface.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct SearchConfig {
    pub enabled: bool,
    pub limit_default: usize,
    pub limit_max: usize,
    pub vector_candidates: usize,
    pub lexical_candidates: usize,
    pub fallback_semantic_weight: f32,
    pub fallback_lexical_weight: f32,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            limit_default: 5,
            limit_max: 20,
            vector_candidates: 30,
            lexical_candidates: 30,
            fallback_semantic_weight: 0.6,
            fallback_lexical_weight: 0.4,
        }
    }
}

/// §6 Index worker pool configuration surface.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct IndexConfig {
    pub workers: usize,
    pub batch_size: u32,
    pub retry_max: u32,
    pub retry_backoff_ms: u64,
    pub slo_p95_seconds: u64,
    pub credential_ttl_secs: u64,
    pub max_chunk_chars: usize,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            workers: 2,
            batch_size: 16,
            retry_max: 5,
            retry_backoff_ms: 500,
            slo_p95_seconds: 30,
            credential_ttl_secs: 300,
            max_chunk_chars: 2000,
        }
    }
}

/// §6 Memory engine configuration surface.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct MemoryConfig {
    pub recent_context_items: usize,
    pub recall_facts_limit: usize,
    pub search_limit: usize,
    pub compact_threshold: f32,
    pub l1_retention_days: i64,
    pub l2_retention_days: i64,
    pub compaction_min_age_hours: i64,
    pub summary_refresh_interval_minutes: i64,
    pub max_processed_turns: usize,
    pub session_lock_timeout_ms: u64,
    pub staleness_window_secs: i64,
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            recent_context_items: 30,
            recall_facts_limit: 20,
            search_limit: 5,
            compact_threshold: 0.8,
            l1_retention_days: 1,
            l2_retention_days: 7,
            compaction_min_age_hours: 24,
            summary_refresh_interval_minutes: 60,
            max_processed_turns: 1024,
            session_lock_timeout_ms: 5_000,
            staleness_window_secs: 120,
        }
    }
}

/// §4.10/§6 RAG Extract configuration surface.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct RagConfig {
    pub top_k_limit: usize,
    pub max_materials_size: usize,
    pub semantic_weight: f32,
    pub lexical_weight: f32,
}

impl Default for RagConfig {
    fn default() -> Self {
        Self { top_k_limit: 20, max_materials_size: 1_000_000, semantic_weight: 0.7, lexical_weight: 0.3 }
    }
}

/// §6 Pipeline composer configuration surface.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct PipelineConfig {
    pub max_total_steps: usize,
    pub max_nesting_depth: usize,
    pub max_parallel_concurrency: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self { max_total_steps: 50, max_nesting_depth: 5, max_parallel_concurrency: 8 }
    }
}
