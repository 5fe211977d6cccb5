//! Tool Dispatch (C9): the single choke point every tool call passes
//! through, whether it arrived from the transport layer or recursively from
//! the Pipeline Composer (C8) via [`DispatchInvoker`].
//!
//! `Dispatch::call` validates and deserializes arguments, enforces a
//! per-tool timeout, invokes the matching use case, and records a call-audit
//! entry (C7) for every outcome — success or failure — per §4.9.

use std::sync::{Arc, OnceLock};
use std::time::Duration;

use serde_json::{json, Map, Value};

use toolgate_application::config::PipelineConfig;
use toolgate_application::path_algebra::WriteMode;
use toolgate_application::{CallOutcome, FileStoreService, Pipeline};
use toolgate_domain::entities::PipelineStepResult;
use toolgate_domain::error::{Error, Result};
use toolgate_domain::ports::repositories::CallLogRepository;
use toolgate_domain::ports::services::{HybridSearchService, MemoryEngineService, PipelineComposer, RagExtractService};
use toolgate_domain::value_objects::{PipelineStepOutcome, TenantFingerprint};

use crate::error_mapping::error_payload;
use crate::schema::{
    FileDeleteParams, FileListParams, FileReadParams, FileRenameParams, FileSearchParams, FileStatParams,
    FileWriteParams, McpPipeParams, MemoryAfterTurnParams, MemoryBeforeTurnParams, MemoryListDirWithAbstractParams,
    MemoryRunMaintenanceParams, RagExtractParams,
};
use crate::tool_invoker::DispatchInvoker;

/// Every tool name this gateway serves, matching §6 exactly.
pub const TOOL_NAMES: &[&str] = &[
    "file_stat",
    "file_read",
    "file_write",
    "file_delete",
    "file_rename",
    "file_list",
    "file_search",
    "memory_before_turn",
    "memory_after_turn",
    "memory_run_maintenance",
    "memory_list_dir_with_abstract",
    "rag_extract",
    "mcp_pipe",
];

/// Process-wide tuning for the dispatch layer itself (as opposed to the
/// per-use-case configuration each service already owns).
#[derive(Debug, Clone)]
pub struct DispatchConfig {
    /// Wall-clock budget for one tool invocation (§5 "Timeouts").
    pub tool_timeout_ms: u64,
    pub search_limit_default: usize,
    pub search_limit_max: usize,
    pub rag_top_k_default: usize,
    pub pipeline: PipelineConfig,
}

/// Central registry wiring every use case behind one `call` entry point.
pub struct Dispatch {
    files: Arc<FileStoreService>,
    search: Arc<dyn HybridSearchService>,
    memory: Arc<dyn MemoryEngineService>,
    rag_extract: Arc<dyn RagExtractService>,
    call_log: Arc<dyn CallLogRepository>,
    pipeline: OnceLock<Pipeline>,
    config: DispatchConfig,
}

impl Dispatch {
    /// Builds a fully wired dispatcher. The returned `Arc` is required
    /// up-front because the pipeline composer's [`toolgate_application::ToolInvoker`]
    /// recurses back into this same dispatcher for `tool`/`pipe` steps.
    pub fn new(
        files: Arc<FileStoreService>,
        search: Arc<dyn HybridSearchService>,
        memory: Arc<dyn MemoryEngineService>,
        rag_extract: Arc<dyn RagExtractService>,
        call_log: Arc<dyn CallLogRepository>,
        config: DispatchConfig,
    ) -> Arc<Self> {
        let dispatch = Arc::new(Self { files, search, memory, rag_extract, call_log, pipeline: OnceLock::new(), config });
        let invoker = Arc::new(DispatchInvoker::new(Arc::clone(&dispatch)));
        let pipeline = Pipeline::new(invoker, dispatch.config.pipeline.clone());
        let _ = dispatch.pipeline.set(pipeline);
        dispatch
    }

    fn pipeline(&self) -> &Pipeline {
        self.pipeline.get().expect("pipeline is set during Dispatch::new before any call reaches it")
    }

    /// Runs one named tool call end to end: deserialize args, enforce the
    /// per-tool timeout, invoke the use case, and record the audit entry.
    ///
    /// `api_key` is the caller's raw bearer token, threaded only into
    /// operations that stash a credential for the index worker (§4.4.1);
    /// `None` for pipeline-recursed calls, which never carry one (the
    /// `ToolInvoker` port has no slot for it, matching the domain contract).
    pub async fn call(&self, tenant: &TenantFingerprint, project: &str, tool: &str, args: Value, api_key: Option<&str>) -> Result<Value> {
        let started = std::time::Instant::now();
        let outcome = tokio::time::timeout(Duration::from_millis(self.config.tool_timeout_ms), self.execute(tenant, project, tool, args.clone(), api_key))
            .await
            .unwrap_or_else(|_| Err(Error::resource_busy(format!("tool '{tool}' exceeded its timeout"))));

        let duration_ms = started.elapsed().as_millis() as u64;
        let error_code = outcome.as_ref().err().map(Error::code);
        toolgate_application::record_call(
            &self.call_log,
            CallOutcome { tenant, project: Some(project), tool_name: tool, raw_params: &args, error_code, duration_ms },
        )
        .await;

        outcome
    }

    async fn execute(&self, tenant: &TenantFingerprint, project: &str, tool: &str, args: Value, api_key: Option<&str>) -> Result<Value> {
        match tool {
            "file_stat" => self.file_stat(tenant, args).await,
            "file_read" => self.file_read(tenant, args).await,
            "file_write" => self.file_write(tenant, args, api_key).await,
            "file_delete" => self.file_delete(tenant, args).await,
            "file_rename" => self.file_rename(tenant, args, api_key).await,
            "file_list" => self.file_list(tenant, args).await,
            "file_search" => self.file_search(tenant, args, api_key).await,
            "memory_before_turn" => self.memory_before_turn(tenant, args, api_key).await,
            "memory_after_turn" => self.memory_after_turn(tenant, args, api_key).await,
            "memory_run_maintenance" => self.memory_run_maintenance(tenant, args).await,
            "memory_list_dir_with_abstract" => self.memory_list_dir_with_abstract(tenant, args).await,
            "rag_extract" => self.rag_extract(tenant, args, api_key).await,
            "mcp_pipe" => {
                let _ = project;
                self.mcp_pipe(tenant, args).await
            }
            other => Err(Error::invalid_argument(format!("unknown tool '{other}'"))),
        }
    }

    fn params<T: serde::de::DeserializeOwned>(args: Value) -> Result<T> {
        serde_json::from_value(args).map_err(|e| Error::invalid_argument(format!("invalid arguments: {e}")))
    }

    async fn file_stat(&self, tenant: &TenantFingerprint, args: Value) -> Result<Value> {
        let p: FileStatParams = Self::params(args)?;
        match self.files.stat(tenant, &p.project, &p.path).await {
            Ok(stat) => Ok(json!({
                "exists": true,
                "type": if stat.is_directory { "directory" } else { "file" },
                "size": stat.size_bytes,
                "version": stat.version,
            })),
            Err(Error::NotFound { .. }) => Ok(json!({"exists": false, "type": Value::Null, "size": 0, "version": 0})),
            Err(e) => Err(e),
        }
    }

    async fn file_read(&self, tenant: &TenantFingerprint, args: Value) -> Result<Value> {
        let p: FileReadParams = Self::params(args)?;
        let file = self.files.read(tenant, &p.project, &p.path).await?;
        let offset = p.offset.unwrap_or(0) as usize;
        let content = if offset >= file.content.len() {
            String::new()
        } else {
            let end = p.length.map_or(file.content.len(), |len| (offset + len as usize).min(file.content.len()));
            if !file.content.is_char_boundary(offset) || !file.content.is_char_boundary(end) {
                return Err(Error::InvalidOffset {
                    message: "offset and offset + length must fall on a UTF-8 character boundary".to_owned(),
                });
            }
            file.content[offset..end].to_owned()
        };
        Ok(json!({"content": content, "content_encoding": "utf-8"}))
    }

    async fn file_write(&self, tenant: &TenantFingerprint, args: Value, api_key: Option<&str>) -> Result<Value> {
        let p: FileWriteParams = Self::params(args)?;
        if !matches!(p.content_encoding.as_deref(), None | Some("utf-8")) {
            return Err(Error::invalid_argument("only 'utf-8' content_encoding is supported"));
        }
        let mode = WriteMode::parse(&p.mode)?;
        let file = self.files.write(tenant, &p.project, &p.path, mode, p.offset, &p.content, api_key).await?;
        Ok(json!({"bytes_written": p.content.len(), "version": file.version}))
    }

    async fn file_delete(&self, tenant: &TenantFingerprint, args: Value) -> Result<Value> {
        let p: FileDeleteParams = Self::params(args)?;
        let deleted_count = self.files.delete(tenant, &p.project, &p.path, p.recursive).await?;
        Ok(json!({"deleted_count": deleted_count}))
    }

    async fn file_rename(&self, tenant: &TenantFingerprint, args: Value, api_key: Option<&str>) -> Result<Value> {
        let p: FileRenameParams = Self::params(args)?;
        let moved_count = self.files.rename(tenant, &p.project, &p.from_path, &p.to_path, p.overwrite, api_key).await?;
        Ok(json!({"moved_count": moved_count}))
    }

    async fn file_list(&self, tenant: &TenantFingerprint, args: Value) -> Result<Value> {
        let p: FileListParams = Self::params(args)?;
        let path = p.path.unwrap_or_default();
        let path = toolgate_application::path_algebra::normalize_list_path(&path);
        let (entries, has_more) = self.files.list(tenant, &p.project, path, p.depth.unwrap_or(1), p.limit).await?;
        let entries: Vec<Value> = entries
            .into_iter()
            .map(|e| json!({"path": e.path, "is_directory": matches!(e.kind, toolgate_application::path_algebra::ListEntryKind::Directory)}))
            .collect();
        Ok(json!({"entries": entries, "has_more": has_more}))
    }

    async fn file_search(&self, tenant: &TenantFingerprint, args: Value, api_key: Option<&str>) -> Result<Value> {
        let p: FileSearchParams = Self::params(args)?;
        let limit = p.limit.unwrap_or(self.config.search_limit_default).min(self.config.search_limit_max);
        let hits = self.search.search(tenant, &p.project, &p.query, p.path_prefix.as_deref().unwrap_or(""), limit, api_key).await?;
        let chunks: Vec<Value> = hits
            .into_iter()
            .map(|hit| {
                json!({
                    "chunk_id": hit.chunk.id.to_string(),
                    "file_path": hit.chunk.file_path,
                    "text": hit.chunk.text,
                    "score": hit.score,
                    "ordinal": hit.chunk.ordinal,
                })
            })
            .collect();
        Ok(json!({"chunks": chunks}))
    }

    async fn memory_before_turn(&self, tenant: &TenantFingerprint, args: Value, api_key: Option<&str>) -> Result<Value> {
        let p: MemoryBeforeTurnParams = Self::params(args)?;
        if p.current_input.is_empty() {
            return Err(Error::invalid_argument("current_input must not be empty"));
        }
        self.memory.before_turn(tenant, &p.project, &p.session_id, api_key).await
    }

    async fn memory_after_turn(&self, tenant: &TenantFingerprint, args: Value, api_key: Option<&str>) -> Result<Value> {
        let p: MemoryAfterTurnParams = Self::params(args)?;
        let payload = json!({
            "input_items": p.input_items,
            "output_items": p.output_items,
            "extracted_facts": p.extracted_facts,
        });
        self.memory.after_turn(tenant, &p.project, &p.session_id, &p.turn_id, payload, api_key).await
    }

    async fn memory_run_maintenance(&self, tenant: &TenantFingerprint, args: Value) -> Result<Value> {
        let p: MemoryRunMaintenanceParams = Self::params(args)?;
        self.memory.run_maintenance(tenant, &p.project, &p.session_id).await
    }

    async fn memory_list_dir_with_abstract(&self, tenant: &TenantFingerprint, args: Value) -> Result<Value> {
        let p: MemoryListDirWithAbstractParams = Self::params(args)?;
        let sub_path = p.path.unwrap_or_default();
        let full_path = format!("/memory/{}{sub_path}", p.session_id);
        let _ = p.depth;
        let _ = p.limit;
        let result = self.memory.list_dir_with_abstract(tenant, &p.project, &full_path).await?;
        Ok(json!({"summaries": result.get("entries").cloned().unwrap_or(Value::Array(Vec::new())), "has_more": result.get("has_more").cloned().unwrap_or(Value::Bool(false))}))
    }

    async fn rag_extract(&self, tenant: &TenantFingerprint, args: Value, api_key: Option<&str>) -> Result<Value> {
        let p: RagExtractParams = Self::params(args)?;
        let top_k = p.top_k.unwrap_or(self.config.rag_top_k_default);
        let passages = self.rag_extract.extract_key_info(tenant, &p.user_id, &p.task_id, &p.query, &p.materials, top_k, api_key).await?;
        let passages: Vec<Value> = passages
            .into_iter()
            .map(|passage| json!({"file_path": passage.file_path, "text": passage.text, "score": passage.score}))
            .collect();
        Ok(json!({"passages": passages}))
    }

    async fn mcp_pipe(&self, tenant: &TenantFingerprint, args: Value) -> Result<Value> {
        let p: McpPipeParams = Self::params(args)?;
        let results = self.pipeline().run(tenant, &p.project, p.spec.clone()).await?;
        Ok(build_pipe_response(&p.spec, &results))
    }
}

/// Mirrors one [`PipelineStepResult`] into the same JSON shape
/// `Pipeline::run` uses internally for `${dotted.path}`/`$ref` resolution,
/// so `return` can be evaluated against the same environment shape.
fn step_json(result: &PipelineStepResult) -> Value {
    match result.outcome {
        PipelineStepOutcome::Ok => result.output.clone().unwrap_or(Value::Null),
        PipelineStepOutcome::Error => json!({"ok": false, "error": {"code": result.error_code.clone().unwrap_or_else(|| "INTERNAL_ERROR".to_owned())}}),
        PipelineStepOutcome::Skipped => json!({"skipped": true}),
    }
}

/// Resolves a dotted path (`a.b.0.c`) against an environment value, indexing
/// arrays by integer segments. Mirrors the pipeline composer's private
/// resolver so `mcp_pipe`'s top-level `return` field can be evaluated here
/// without exporting that internal from `toolgate-application`.
fn resolve_dotted_path(root: &Value, path: &str) -> Option<Value> {
    let mut current = root.clone();
    for segment in path.split('.') {
        current = match segment.parse::<usize>() {
            Ok(index) => current.get(index)?.clone(),
            Err(_) => current.get(segment)?.clone(),
        };
    }
    Some(current)
}

/// Builds the `{ok, error, result, steps}` envelope `mcp_pipe` returns,
/// resolving the pipeline spec's top-level `return` reference (§4.8) — the
/// one piece `PipelineComposer::run` itself does not produce, since it
/// returns only the ordered step results.
fn build_pipe_response(spec: &Value, results: &[PipelineStepResult]) -> Value {
    let steps_map: Map<String, Value> = results.iter().map(|r| (r.name.clone(), step_json(r))).collect();
    let ok = results.iter().all(|r| r.outcome != PipelineStepOutcome::Error);
    let error = results.iter().find(|r| r.outcome == PipelineStepOutcome::Error).and_then(|r| r.error_code.clone()).map(Value::String).unwrap_or(Value::Null);

    let env = json!({
        "vars": spec.get("vars").cloned().unwrap_or(Value::Object(Map::new())),
        "steps": steps_map,
        "last": results.last().map(step_json).unwrap_or(Value::Null),
    });

    let result = match spec.get("return") {
        Some(Value::Object(m)) if m.len() == 1 && m.contains_key("$ref") => match m.get("$ref") {
            Some(Value::String(path)) => resolve_dotted_path(&env, path).unwrap_or(Value::Null),
            _ => Value::Null,
        },
        Some(other) => other.clone(),
        None => results.last().map(step_json).unwrap_or(Value::Null),
    };

    json!({"ok": ok, "error": error, "result": result, "steps": env["steps"]})
}

/// Builds the `{code, message, retryable}` payload a transport handler
/// should surface for an error `Dispatch::call` returned.
#[must_use]
pub fn tool_call_error(err: &Error) -> Value {
    error_payload(err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use toolgate_domain::value_objects::PipelineStepId;

    fn ok_step(name: &str, output: Value) -> PipelineStepResult {
        PipelineStepResult { id: PipelineStepId::new(), name: name.to_owned(), outcome: PipelineStepOutcome::Ok, output: Some(output), error_code: None, duration_ms: 1 }
    }

    #[test]
    fn return_ref_resolves_against_named_step_output() {
        let spec = json!({"steps": [], "return": {"$ref": "steps.r.value"}});
        let results = vec![ok_step("r", json!({"value": 42}))];
        let response = build_pipe_response(&spec, &results);
        assert_eq!(response["result"], json!(42));
        assert_eq!(response["ok"], json!(true));
    }

    #[test]
    fn missing_return_falls_back_to_last_step() {
        let spec = json!({"steps": []});
        let results = vec![ok_step("a", json!(1)), ok_step("b", json!(2))];
        let response = build_pipe_response(&spec, &results);
        assert_eq!(response["result"], json!(2));
    }

    #[test]
    fn error_step_flips_ok_false_and_surfaces_code() {
        let spec = json!({"steps": []});
        let results = vec![PipelineStepResult {
            id: PipelineStepId::new(),
            name: "broken".to_owned(),
            outcome: PipelineStepOutcome::Error,
            output: None,
            error_code: Some("INVALID_ARGUMENT".to_owned()),
            duration_ms: 0,
        }];
        let response = build_pipe_response(&spec, &results);
        assert_eq!(response["ok"], json!(false));
        assert_eq!(response["error"], json!("INVALID_ARGUMENT"));
    }
}
