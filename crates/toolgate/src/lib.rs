//! Dependency-injection wiring for the `toolgate` binary: builds every
//! concrete adapter the domain ports require, assembles the application
//! layer's use cases on top of them, and starts the background worker pool
//! alongside the MCP transport.

use std::path::Path;
use std::sync::Arc;

use anyhow::Context;

use toolgate_application::{FileStoreService, HybridSearch, IndexWorker, MemoryEngine, RagExtract, RetentionWorker};
use toolgate_domain::ports::infrastructure::DatabaseProvider;
use toolgate_domain::ports::providers::{EmbeddingProvider, LexicalSearchProvider, RerankProvider, VectorStoreProvider};
use toolgate_domain::registry::{EmbeddingProviderConfig, LexicalSearchProviderConfig, RerankProviderConfig, VectorStoreProviderConfig};
use toolgate_infrastructure::config::AppConfig;
use toolgate_infrastructure::repositories::{SqliteCallLogRepository, SqliteFileRepository, SqliteIndexOutboxRepository, SqliteTurnGuardRepository};
use toolgate_infrastructure::{InProcessAdvisoryLockProvider, MokaCredentialVault, SqliteDatabaseProvider, TracingMetricsSink};
use toolgate_providers::AesGcmCryptoProvider;
use toolgate_server::dispatch::DispatchConfig;
use toolgate_server::Dispatch;

/// Everything the transport layer needs: the wired dispatcher plus the
/// background worker handles so the caller can shut them down cleanly.
pub struct Application {
    pub dispatch: Arc<Dispatch>,
    pub index_workers: Vec<Arc<IndexWorker>>,
    pub retention_worker: Arc<RetentionWorker>,
}

fn resolve_rerank(config: &toolgate_domain::value_objects::RerankConfig) -> anyhow::Result<Option<Arc<dyn RerankProvider>>> {
    if config.provider == "none" {
        return Ok(None);
    }
    let provider_config = RerankProviderConfig {
        provider: config.provider.clone(),
        model: config.model.clone(),
        api_key: config.api_key.clone(),
        base_url: config.base_url.clone(),
        ..Default::default()
    };
    Ok(Some(toolgate_domain::registry::resolve_rerank_provider(&provider_config).context("resolving rerank provider")?))
}

/// Builds every adapter, wires the application layer's use cases atop them,
/// and assembles the tool dispatcher, without starting any background task.
pub async fn build(config: &AppConfig) -> anyhow::Result<Application> {
    let database = SqliteDatabaseProvider.connect(Path::new(&config.database_path)).await.context("connecting to SQLite database")?;

    let files_repo = Arc::new(SqliteFileRepository::new(Arc::clone(&database)));
    let outbox_repo = Arc::new(SqliteIndexOutboxRepository::new(Arc::clone(&database)));
    let call_log_repo = Arc::new(SqliteCallLogRepository::new(Arc::clone(&database)));
    let turn_guard_repo = Arc::new(SqliteTurnGuardRepository::new(Arc::clone(&database)));

    let locks = Arc::new(InProcessAdvisoryLockProvider::new());
    let crypto = Arc::new(AesGcmCryptoProvider::new());
    let vault = Arc::new(MokaCredentialVault::new(crypto, 10_000));
    let metrics = Arc::new(TracingMetricsSink::new());

    let embedding_config = EmbeddingProviderConfig {
        provider: config.embedding.provider.clone(),
        model: Some(config.embedding.model.clone()),
        api_key: config.embedding.api_key.clone(),
        base_url: config.embedding.base_url.clone(),
        dimensions: config.embedding.dimensions,
        ..Default::default()
    };
    let embedder: Arc<dyn EmbeddingProvider> = toolgate_domain::registry::resolve_embedding_provider(&embedding_config).context("resolving embedding provider")?;

    let vector_store_config = VectorStoreProviderConfig {
        provider: config.vector_store.provider.clone(),
        uri: config.vector_store.address.clone(),
        api_key: config.vector_store.token.clone(),
        dimensions: config.vector_store.dimensions,
        ..Default::default()
    };
    let vector_store: Arc<dyn VectorStoreProvider> =
        toolgate_domain::registry::resolve_vector_store_provider(&vector_store_config).context("resolving vector store provider")?;

    // No dedicated lexical-search section exists in `AppConfig` (§6 names no
    // configurable lexical backend); the in-process term-frequency provider
    // is the only one registered, so it is selected directly rather than
    // plumbing a redundant config field through.
    let lexical_config = LexicalSearchProviderConfig { provider: "in_memory".to_owned(), ..Default::default() };
    let lexical: Arc<dyn LexicalSearchProvider> =
        toolgate_domain::registry::resolve_lexical_search_provider(&lexical_config).context("resolving lexical search provider")?;

    let rerank = resolve_rerank(&config.rerank)?;

    let files = Arc::new(FileStoreService::new(
        Arc::clone(&files_repo) as _,
        Arc::clone(&outbox_repo) as _,
        Arc::clone(&database),
        Arc::clone(&locks) as _,
        Arc::clone(&vault) as _,
        config.file_io.clone(),
        config.index.credential_ttl_secs,
    ));

    let search = Arc::new(HybridSearch::new(
        Arc::clone(&embedder),
        Arc::clone(&vector_store),
        Arc::clone(&lexical),
        rerank,
        Arc::clone(&outbox_repo) as _,
        config.search.clone(),
    ));

    let memory = Arc::new(MemoryEngine::new(Arc::clone(&files), Arc::clone(&search) as _, turn_guard_repo as _, Arc::clone(&locks) as _, config.memory.clone()));

    let rag_extract = Arc::new(RagExtract::new(
        Arc::clone(&files),
        Arc::clone(&embedder),
        Arc::clone(&vector_store),
        Arc::clone(&outbox_repo) as _,
        config.rag.clone(),
        config.index.max_chunk_chars,
    ));

    let dispatch_config = DispatchConfig {
        tool_timeout_ms: 30_000,
        search_limit_default: config.search.limit_default,
        search_limit_max: config.search.limit_max,
        rag_top_k_default: config.search.limit_default.min(config.rag.top_k_limit).max(1),
        pipeline: config.pipeline.clone(),
    };
    let dispatch = Dispatch::new(files, search as _, memory as _, rag_extract as _, call_log_repo as _, dispatch_config);

    let index_workers = (0..config.index.workers)
        .map(|_| {
            Arc::new(IndexWorker::new(
                Arc::clone(&outbox_repo) as _,
                Arc::clone(&files_repo) as _,
                Arc::clone(&embedder),
                Arc::clone(&vector_store),
                Arc::clone(&lexical),
                Arc::clone(&vault) as _,
                Arc::clone(&metrics) as _,
                config.index.clone(),
            ))
        })
        .collect();

    let retention_worker = Arc::new(RetentionWorker::new(files_repo as _, metrics as _, config.file_io.clone(), 256));

    Ok(Application { dispatch, index_workers, retention_worker })
}

/// Spawns the index worker pool and the retention sweep loop as background
/// tasks, returning their join handles so the caller can await a clean
/// shutdown alongside the transport.
pub fn spawn_background_tasks(app: &Application, shutdown: tokio::sync::watch::Receiver<bool>) -> Vec<tokio::task::JoinHandle<()>> {
    let mut handles = Vec::new();
    for worker in &app.index_workers {
        let worker = Arc::clone(worker);
        let shutdown = shutdown.clone();
        handles.push(tokio::spawn(async move {
            toolgate_application::index_worker::run(worker, std::time::Duration::from_secs(2), shutdown).await;
        }));
    }

    let retention = Arc::clone(&app.retention_worker);
    let mut shutdown_retention = shutdown;
    handles.push(tokio::spawn(async move {
        loop {
            if *shutdown_retention.borrow() {
                return;
            }
            if let Err(e) = retention.sweep().await {
                tracing::warn!(error = %e, "retention sweep failed");
            }
            if tokio::time::timeout(std::time::Duration::from_secs(3600), shutdown_retention.changed()).await.is_ok() {
                if *shutdown_retention.borrow() {
                    return;
                }
            }
        }
    }));

    handles
}
