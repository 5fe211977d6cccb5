//! Shared test-only fakes for wiring a real [`crate::dispatch::Dispatch`]
//! without a network-backed embedder, vector store, or memory engine.
//!
//! Hybrid search and memory are stubbed with hand-written fakes rather than
//! `mockall` because every test here exercises the file-store path only;
//! the file store itself is the real [`toolgate_application::FileStoreService`]
//! over an in-memory SQLite database, since that path has no external
//! dependency worth faking out.

#![cfg(test)]

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use toolgate_application::config::{FileIoConfig, PipelineConfig};
use toolgate_application::FileStoreService;
use toolgate_domain::entities::CallLogEntry;
use toolgate_domain::error::Result;
use toolgate_domain::ports::infrastructure::DatabaseProvider;
use toolgate_domain::ports::repositories::CallLogRepository;
use toolgate_domain::ports::services::{ExtractedPassage, HybridSearchService, MemoryEngineService, RagExtractService, SearchHit};
use toolgate_domain::value_objects::TenantFingerprint;
use toolgate_infrastructure::repositories::{SqliteFileRepository, SqliteIndexOutboxRepository};
use toolgate_infrastructure::{InProcessAdvisoryLockProvider, MokaCredentialVault, SqliteDatabaseProvider};
use toolgate_providers::AesGcmCryptoProvider;

use crate::dispatch::{Dispatch, DispatchConfig};

/// Search fake that never finds anything; every test here exercises the
/// file-store tools, which never call through to hybrid search.
pub struct UnreachableSearch;

#[async_trait]
impl HybridSearchService for UnreachableSearch {
    async fn search(&self, _tenant: &TenantFingerprint, _project: &str, _query: &str, _path_prefix: &str, _limit: usize, _api_key: Option<&str>) -> Result<Vec<SearchHit>> {
        panic!("hybrid search should not be reached by the file-store dispatch tests")
    }
}

/// Memory fake with the same "should not be reached" contract as [`UnreachableSearch`].
pub struct UnreachableMemory;

#[async_trait]
impl MemoryEngineService for UnreachableMemory {
    async fn before_turn(&self, _tenant: &TenantFingerprint, _project: &str, _session_id: &str, _api_key: Option<&str>) -> Result<Value> {
        panic!("memory engine should not be reached by the file-store dispatch tests")
    }

    async fn after_turn(&self, _tenant: &TenantFingerprint, _project: &str, _session_id: &str, _turn_id: &str, _payload: Value, _api_key: Option<&str>) -> Result<Value> {
        panic!("memory engine should not be reached by the file-store dispatch tests")
    }

    async fn run_maintenance(&self, _tenant: &TenantFingerprint, _project: &str, _session_id: &str) -> Result<Value> {
        panic!("memory engine should not be reached by the file-store dispatch tests")
    }

    async fn list_dir_with_abstract(&self, _tenant: &TenantFingerprint, _project: &str, _path: &str) -> Result<Value> {
        panic!("memory engine should not be reached by the file-store dispatch tests")
    }
}

/// RAG extract fake with the same "should not be reached" contract as [`UnreachableSearch`].
pub struct UnreachableRagExtract;

#[async_trait]
impl RagExtractService for UnreachableRagExtract {
    async fn extract_key_info(
        &self,
        _tenant: &TenantFingerprint,
        _user_id: &str,
        _task_id: &str,
        _query: &str,
        _materials: &str,
        _top_k: usize,
        _api_key: Option<&str>,
    ) -> Result<Vec<ExtractedPassage>> {
        panic!("rag extract should not be reached by the file-store dispatch tests")
    }
}

/// Call-log fake recording every entry in-process, so tests can assert an
/// audit row was written without standing up SQLite for it.
#[derive(Default)]
pub struct RecordingCallLog {
    pub entries: tokio::sync::Mutex<Vec<CallLogEntry>>,
}

#[async_trait]
impl CallLogRepository for RecordingCallLog {
    async fn insert(&self, entry: &CallLogEntry) -> Result<()> {
        self.entries.lock().await.push(entry.clone());
        Ok(())
    }

    async fn recent_for_tenant(&self, tenant: &TenantFingerprint, limit: usize) -> Result<Vec<CallLogEntry>> {
        let entries = self.entries.lock().await;
        Ok(entries.iter().rev().filter(|e| &e.tenant == tenant).take(limit).cloned().collect())
    }
}

/// Builds a [`Dispatch`] whose file-store path is fully real (in-memory
/// SQLite, real advisory locks, real credential vault) and whose search and
/// memory use cases panic if ever invoked.
pub async fn file_store_only_dispatch() -> (Arc<Dispatch>, TenantFingerprint) {
    let database = SqliteDatabaseProvider.connect_in_memory().await.expect("in-memory schema applies cleanly");
    let files_repo = Arc::new(SqliteFileRepository::new(Arc::clone(&database)));
    let outbox_repo = Arc::new(SqliteIndexOutboxRepository::new(Arc::clone(&database)));
    let locks = Arc::new(InProcessAdvisoryLockProvider::new());
    let crypto = Arc::new(AesGcmCryptoProvider::new());
    let vault = Arc::new(MokaCredentialVault::new(crypto, 100));

    let files = Arc::new(FileStoreService::new(files_repo as _, outbox_repo as _, database, locks as _, vault as _, FileIoConfig::default(), 300));

    let config = DispatchConfig { tool_timeout_ms: 5_000, search_limit_default: 10, search_limit_max: 50, rag_top_k_default: 5, pipeline: PipelineConfig::default() };
    let dispatch = Dispatch::new(
        files,
        Arc::new(UnreachableSearch) as _,
        Arc::new(UnreachableMemory) as _,
        Arc::new(UnreachableRagExtract) as _,
        Arc::new(RecordingCallLog::default()) as _,
        config,
    );

    let tenant = TenantFingerprint::from_api_key("sk-test-harness");
    (dispatch, tenant)
}
