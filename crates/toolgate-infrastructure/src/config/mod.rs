//! Figment-based configuration loading: merges built-in defaults, an
//! optional `toolgate.toml` file, and `TOOLGATE_`-prefixed environment
//! variables, in that precedence order.
//!
//! The teacher loads YAML through a loco-convention `ConfigLoader`
//! (`LOCO_ENV`/`RAILS_ENV`/`NODE_ENV`-driven, reading a `settings:` key);
//! this crate's dependency stack deliberately swaps that for plain
//! `figment`/`toml`, so the loader here follows figment's own idiom instead
//! of imitating the teacher's loco-specific one. See `DESIGN.md`.

use std::path::Path;

use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};

use toolgate_application::config::{FileIoConfig, IndexConfig, MemoryConfig, PipelineConfig, RagConfig, SearchConfig};
use toolgate_domain::error::{Error, Result};
use toolgate_domain::value_objects::{CacheConfig, EmbeddingConfig, RerankConfig, VectorStoreConfig};

/// Top-level, process-wide configuration: the union of every module's
/// configuration surface named in §6, plus the provider/server settings the
/// teacher's ambient stack adds.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Path to the SQLite database file. `:memory:` for an ephemeral store.
    pub database_path: String,
    /// Directory the `tracing-appender` file sink, if any, writes into.
    pub log_dir: Option<String>,
    /// Default `tracing` filter directive when `RUST_LOG` is unset.
    pub log_level: String,
    /// Verbosity at which full error detail is attached to log events
    /// (`off`, `debug`, `trace`); see [`toolgate_domain::utils::ErrorDetailsLevel`].
    pub log_error_detail: String,
    pub file_io: FileIoConfig,
    pub search: SearchConfig,
    pub index: IndexConfig,
    pub memory: MemoryConfig,
    pub pipeline: PipelineConfig,
    pub rag: RagConfig,
    pub embedding: EmbeddingConfig,
    pub vector_store: VectorStoreConfig,
    pub cache: CacheConfig,
    pub rerank: RerankConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database_path: "toolgate.db".to_owned(),
            log_dir: None,
            log_level: "info".to_owned(),
            log_error_detail: "debug".to_owned(),
            file_io: FileIoConfig::default(),
            search: SearchConfig::default(),
            index: IndexConfig::default(),
            memory: MemoryConfig::default(),
            pipeline: PipelineConfig::default(),
            rag: RagConfig::default(),
            embedding: EmbeddingConfig {
                provider: "deterministic".to_owned(),
                model: "toolgate-local".to_owned(),
                api_key: None,
                base_url: None,
                dimensions: Some(256),
                max_tokens: None,
            },
            vector_store: VectorStoreConfig {
                provider: "in_memory".to_owned(),
                address: None,
                token: None,
                collection: None,
                dimensions: Some(256),
                timeout_secs: None,
            },
            cache: CacheConfig { provider: "moka".to_owned(), address: None, password: None, database: None, max_size: Some(10_000), ttl_secs: Some(300) },
            rerank: RerankConfig {
                provider: "none".to_owned(),
                model: None,
                api_key: None,
                base_url: None,
                timeout_ms: 2_000,
                fallback_semantic_weight: 0.6,
                fallback_lexical_weight: 0.4,
            },
        }
    }
}

impl AppConfig {
    /// Loads configuration from built-in defaults, an optional TOML file at
    /// `config_path` (skipped silently if absent), then `TOOLGATE_`-prefixed
    /// environment variables, highest precedence last.
    pub fn load(config_path: Option<&Path>) -> Result<Self> {
        let mut figment = Figment::new().merge(Serialized::defaults(AppConfig::default()));
        if let Some(path) = config_path {
            if path.exists() {
                figment = figment.merge(Toml::file(path));
            }
        }
        figment = figment.merge(Env::prefixed("TOOLGATE_").split("__"));
        figment.extract().map_err(|e| Error::Configuration { message: format!("failed to load configuration: {e}"), source: Some(Box::new(e)) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loads_defaults_when_no_file_or_env_present() {
        let config = AppConfig::load(None).unwrap();
        assert_eq!(config.database_path, "toolgate.db");
        assert_eq!(config.index.workers, 2);
    }

    #[test]
    #[allow(unsafe_code)]
    fn env_override_wins_over_defaults() {
        unsafe {
            std::env::set_var("TOOLGATE_DATABASE_PATH", "/tmp/other.db");
        }
        let config = AppConfig::load(None).unwrap();
        unsafe {
            std::env::remove_var("TOOLGATE_DATABASE_PATH");
        }
        assert_eq!(config.database_path, "/tmp/other.db");
    }
}
