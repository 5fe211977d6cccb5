//! The MCP tool surface (§6): one `#[tool]` method per gateway tool,
//! registered into an `rmcp` [`ToolRouter`] and served through a manually
//! implemented [`ServerHandler`] so `call_tool` can run its own middleware
//! (tenant extraction, MCP logging on failure) ahead of dispatch.

use std::sync::Arc;

use rmcp::handler::server::router::tool::ToolRouter;
use rmcp::handler::server::tool::ToolCallContext;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::{
    CallToolRequestParams, CallToolResult, Content, Implementation, ListToolsResult, LoggingLevel, LoggingMessageNotification,
    LoggingMessageNotificationParam, PaginatedRequestParams, ProtocolVersion, ServerCapabilities, ServerInfo, Tool,
};
use rmcp::service::RequestContext;
use rmcp::{tool, tool_router, ErrorData, RoleServer, ServerHandler};
use serde_json::Value;

use crate::auth::CallerIdentity;
use crate::dispatch::Dispatch;
use crate::error_mapping::tool_error_result;
use crate::schema::{
    FileDeleteParams, FileListParams, FileReadParams, FileRenameParams, FileSearchParams, FileStatParams, FileWriteParams,
    McpPipeParams, MemoryAfterTurnParams, MemoryBeforeTurnParams, MemoryListDirWithAbstractParams, MemoryRunMaintenanceParams,
    RagExtractParams,
};

/// Turns a successful dispatch result into the protocol's success envelope.
fn success(value: Value) -> CallToolResult {
    CallToolResult::success(vec![Content::text(value.to_string())])
}

/// Turns a dispatch failure into a tool-result error (§7): still a
/// successful protocol call, carrying `{ok:false, error:{...}}` as its text.
fn failure(err: &toolgate_domain::error::Error) -> CallToolResult {
    CallToolResult::error(vec![Content::text(tool_error_result(err).to_string())])
}

/// Binds the gateway's business logic to the `rmcp` tool surface.
#[derive(Clone)]
pub struct ToolgateServer {
    dispatch: Arc<Dispatch>,
    tool_router: ToolRouter<ToolgateServer>,
    /// Identity to fall back to when the transport never populated a
    /// per-call identity — the stdio transport's single-tenant mode
    /// (§9: "stdio connections carry one caller for their process
    /// lifetime"), where there is no `Authorization` header to parse per
    /// call. Streamable-HTTP connections always carry a per-call identity
    /// (see [`crate::transport`]) so this stays `None` there.
    default_identity: Option<CallerIdentity>,
}

impl ToolgateServer {
    pub fn new(dispatch: Arc<Dispatch>) -> Self {
        Self { dispatch, tool_router: Self::tool_router(), default_identity: None }
    }

    /// Builds a server pinned to one caller identity for the whole process,
    /// used by the stdio transport.
    pub fn with_default_identity(dispatch: Arc<Dispatch>, identity: CallerIdentity) -> Self {
        Self { dispatch, tool_router: Self::tool_router(), default_identity: Some(identity) }
    }

    /// Schemas for every registered tool, used by the transport layer's
    /// startup log line and by tests.
    pub fn tool_schemas(&self) -> Vec<Tool> {
        self.tool_router.list_all()
    }

    /// Pulls the [`CallerIdentity`] the transport layer resolved from the
    /// `Authorization` header and stashed in the request's extensions (see
    /// [`crate::transport`]), falling back to a process-wide identity for
    /// single-tenant transports. Missing or absent auth is itself a
    /// tool-result error, not a protocol error, so the calling LLM can see
    /// and retry with credentials rather than the connection dying.
    fn caller_identity(&self, context: &RequestContext<RoleServer>) -> Result<CallerIdentity, CallToolResult> {
        context.extensions.get::<CallerIdentity>().cloned().or_else(|| self.default_identity.clone()).ok_or_else(|| {
            CallToolResult::error(vec![Content::text(tool_error_result(&toolgate_domain::error::Error::MissingAuth).to_string())])
        })
    }
}

macro_rules! dispatch_tool {
    ($self:expr, $identity:expr, $project:expr, $tool_name:expr, $params:expr) => {{
        let args = match serde_json::to_value(&$params) {
            Ok(v) => v,
            Err(e) => return Ok(CallToolResult::error(vec![Content::text(format!("failed to encode arguments: {e}"))])),
        };
        match $self
            .dispatch
            .call(&$identity.context.fingerprint, $project, $tool_name, args, Some($identity.raw_token.as_str()))
            .await
        {
            Ok(value) => Ok(success(value)),
            Err(ref e) => Ok(failure(e)),
        }
    }};
}

#[tool_router]
impl ToolgateServer {
    #[tool(
        description = "Describe a virtual file or directory: existence, type, size, and version.",
        annotations(title = "File Stat", read_only_hint = true, destructive_hint = false, idempotent_hint = true, open_world_hint = false)
    )]
    async fn file_stat(&self, Parameters(params): Parameters<FileStatParams>, context: RequestContext<RoleServer>) -> Result<CallToolResult, ErrorData> {
        let identity = match self.caller_identity(&context) {
            Ok(i) => i,
            Err(e) => return Ok(e),
        };
        let project = params.project.clone();
        dispatch_tool!(self, identity, &project, "file_stat", params)
    }

    #[tool(
        description = "Read a virtual file's content, optionally windowed by byte offset/length.",
        annotations(title = "File Read", read_only_hint = true, destructive_hint = false, idempotent_hint = true, open_world_hint = false)
    )]
    async fn file_read(&self, Parameters(params): Parameters<FileReadParams>, context: RequestContext<RoleServer>) -> Result<CallToolResult, ErrorData> {
        let identity = match self.caller_identity(&context) {
            Ok(i) => i,
            Err(e) => return Ok(e),
        };
        let project = params.project.clone();
        dispatch_tool!(self, identity, &project, "file_read", params)
    }

    #[tool(
        description = "Write, append, or overwrite a virtual file's content.",
        annotations(title = "File Write", read_only_hint = false, destructive_hint = true, idempotent_hint = false, open_world_hint = false)
    )]
    async fn file_write(&self, Parameters(params): Parameters<FileWriteParams>, context: RequestContext<RoleServer>) -> Result<CallToolResult, ErrorData> {
        let identity = match self.caller_identity(&context) {
            Ok(i) => i,
            Err(e) => return Ok(e),
        };
        let project = params.project.clone();
        dispatch_tool!(self, identity, &project, "file_write", params)
    }

    #[tool(
        description = "Delete a virtual file, or a whole subtree when recursive is set.",
        annotations(title = "File Delete", read_only_hint = false, destructive_hint = true, idempotent_hint = false, open_world_hint = false)
    )]
    async fn file_delete(&self, Parameters(params): Parameters<FileDeleteParams>, context: RequestContext<RoleServer>) -> Result<CallToolResult, ErrorData> {
        let identity = match self.caller_identity(&context) {
            Ok(i) => i,
            Err(e) => return Ok(e),
        };
        let project = params.project.clone();
        dispatch_tool!(self, identity, &project, "file_delete", params)
    }

    #[tool(
        description = "Rename or move a virtual file or directory subtree.",
        annotations(title = "File Rename", read_only_hint = false, destructive_hint = true, idempotent_hint = false, open_world_hint = false)
    )]
    async fn file_rename(&self, Parameters(params): Parameters<FileRenameParams>, context: RequestContext<RoleServer>) -> Result<CallToolResult, ErrorData> {
        let identity = match self.caller_identity(&context) {
            Ok(i) => i,
            Err(e) => return Ok(e),
        };
        let project = params.project.clone();
        dispatch_tool!(self, identity, &project, "file_rename", params)
    }

    #[tool(
        description = "List a synthesized directory view under a virtual path.",
        annotations(title = "File List", read_only_hint = true, destructive_hint = false, idempotent_hint = true, open_world_hint = false)
    )]
    async fn file_list(&self, Parameters(params): Parameters<FileListParams>, context: RequestContext<RoleServer>) -> Result<CallToolResult, ErrorData> {
        let identity = match self.caller_identity(&context) {
            Ok(i) => i,
            Err(e) => return Ok(e),
        };
        let project = params.project.clone();
        dispatch_tool!(self, identity, &project, "file_list", params)
    }

    #[tool(
        description = "Hybrid vector+lexical search over indexed file chunks.",
        annotations(title = "File Search", read_only_hint = true, destructive_hint = false, idempotent_hint = true, open_world_hint = false)
    )]
    async fn file_search(&self, Parameters(params): Parameters<FileSearchParams>, context: RequestContext<RoleServer>) -> Result<CallToolResult, ErrorData> {
        let identity = match self.caller_identity(&context) {
            Ok(i) => i,
            Err(e) => return Ok(e),
        };
        let project = params.project.clone();
        dispatch_tool!(self, identity, &project, "file_search", params)
    }

    #[tool(
        description = "Recall relevant facts and recent log entries before a conversation turn runs.",
        annotations(title = "Memory Before Turn", read_only_hint = true, destructive_hint = false, idempotent_hint = false, open_world_hint = false)
    )]
    async fn memory_before_turn(
        &self,
        Parameters(params): Parameters<MemoryBeforeTurnParams>,
        context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, ErrorData> {
        let identity = match self.caller_identity(&context) {
            Ok(i) => i,
            Err(e) => return Ok(e),
        };
        let project = params.project.clone();
        dispatch_tool!(self, identity, &project, "memory_before_turn", params)
    }

    #[tool(
        description = "Commit a turn's transcript delta and any extracted facts to session memory.",
        annotations(title = "Memory After Turn", read_only_hint = false, destructive_hint = false, idempotent_hint = true, open_world_hint = false)
    )]
    async fn memory_after_turn(
        &self,
        Parameters(params): Parameters<MemoryAfterTurnParams>,
        context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, ErrorData> {
        let identity = match self.caller_identity(&context) {
            Ok(i) => i,
            Err(e) => return Ok(e),
        };
        let project = params.project.clone();
        dispatch_tool!(self, identity, &project, "memory_after_turn", params)
    }

    #[tool(
        description = "Compact session log shards and expire facts past their retention window.",
        annotations(title = "Memory Maintenance", read_only_hint = false, destructive_hint = true, idempotent_hint = true, open_world_hint = false)
    )]
    async fn memory_run_maintenance(
        &self,
        Parameters(params): Parameters<MemoryRunMaintenanceParams>,
        context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, ErrorData> {
        let identity = match self.caller_identity(&context) {
            Ok(i) => i,
            Err(e) => return Ok(e),
        };
        let project = params.project.clone();
        dispatch_tool!(self, identity, &project, "memory_run_maintenance", params)
    }

    #[tool(
        description = "List a memory directory alongside an LLM-friendly abstract of its contents.",
        annotations(title = "Memory Directory Abstract", read_only_hint = true, destructive_hint = false, idempotent_hint = true, open_world_hint = false)
    )]
    async fn memory_list_dir_with_abstract(
        &self,
        Parameters(params): Parameters<MemoryListDirWithAbstractParams>,
        context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, ErrorData> {
        let identity = match self.caller_identity(&context) {
            Ok(i) => i,
            Err(e) => return Ok(e),
        };
        let project = params.project.clone();
        dispatch_tool!(self, identity, &project, "memory_list_dir_with_abstract", params)
    }

    #[tool(
        description = "Ingest a materials set for a (user_id, task_id) pair and extract the passages most relevant to a query.",
        annotations(title = "RAG Extract", read_only_hint = false, destructive_hint = false, idempotent_hint = false, open_world_hint = false)
    )]
    async fn rag_extract(&self, Parameters(params): Parameters<RagExtractParams>, context: RequestContext<RoleServer>) -> Result<CallToolResult, ErrorData> {
        let identity = match self.caller_identity(&context) {
            Ok(i) => i,
            Err(e) => return Ok(e),
        };
        dispatch_tool!(self, identity, "", "rag_extract", params)
    }

    #[tool(
        description = "Run a composed sequence of tool calls with variable substitution and parallel/nested steps.",
        annotations(title = "Pipe Tools", read_only_hint = false, destructive_hint = true, idempotent_hint = false, open_world_hint = false)
    )]
    async fn mcp_pipe(&self, Parameters(params): Parameters<McpPipeParams>, context: RequestContext<RoleServer>) -> Result<CallToolResult, ErrorData> {
        let identity = match self.caller_identity(&context) {
            Ok(i) => i,
            Err(e) => return Ok(e),
        };
        let project = params.project.clone();
        dispatch_tool!(self, identity, &project, "mcp_pipe", params)
    }
}

impl ServerHandler for ToolgateServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::default(),
            server_info: Implementation { name: "toolgate".to_string(), version: env!("CARGO_PKG_VERSION").to_string(), ..Default::default() },
            capabilities: ServerCapabilities::builder().enable_tools().enable_logging().build(),
            instructions: Some(
                "toolgate: multi-tenant virtual file system, hybrid search, and session memory over MCP.\n\n\
                 Every call must carry an Authorization header; the tenant is derived from it, never from tool arguments.\n\
                 Use file_write/file_read/file_list for the virtual file system, file_search for hybrid retrieval, \
                 memory_before_turn/memory_after_turn for session memory, and mcp_pipe to compose several calls in one round trip."
                    .to_string(),
            ),
        }
    }

    /// Middleware wrapping the generated router: emits an MCP logging
    /// notification when a tool call lands on the error channel, so
    /// observability tooling watching the log stream sees failures without
    /// polling call-audit storage.
    async fn call_tool(&self, request: CallToolRequestParams, context: RequestContext<RoleServer>) -> Result<CallToolResult, ErrorData> {
        let tool_name = request.name.to_string();
        let peer = context.peer.clone();
        let tcc = ToolCallContext::new(self, request, context);
        let result = self.tool_router.call(tcc).await;

        if let Ok(ref r) = result {
            if r.is_error == Some(true) {
                let _ = peer
                    .send_notification(
                        LoggingMessageNotification::new(LoggingMessageNotificationParam {
                            level: LoggingLevel::Warning,
                            logger: Some("toolgate".to_string()),
                            data: serde_json::json!({"tool": tool_name, "error": true}),
                        })
                        .into(),
                    )
                    .await;
            }
        }

        result
    }

    async fn list_tools(&self, _request: Option<PaginatedRequestParams>, _context: RequestContext<RoleServer>) -> Result<ListToolsResult, ErrorData> {
        Ok(ListToolsResult { tools: self.tool_router.list_all(), next_cursor: None, meta: None })
    }

    fn get_tool(&self, name: &str) -> Option<Tool> {
        self.tool_router.get(name).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::CallerIdentity;
    use crate::dispatch::TOOL_NAMES;
    use crate::test_support::file_store_only_dispatch;

    #[tokio::test]
    async fn tool_schemas_registers_every_tool_name_from_dispatch() {
        let (dispatch, _tenant) = file_store_only_dispatch().await;
        let server = ToolgateServer::new(dispatch);

        let mut registered: Vec<String> = server.tool_schemas().into_iter().map(|t| t.name.to_string()).collect();
        registered.sort();
        let mut expected: Vec<String> = TOOL_NAMES.iter().map(ToString::to_string).collect();
        expected.sort();
        assert_eq!(registered, expected);
    }

    #[tokio::test]
    async fn get_tool_resolves_a_single_registered_tool_by_name() {
        let (dispatch, _tenant) = file_store_only_dispatch().await;
        let server = ToolgateServer::new(dispatch);
        assert!(server.get_tool("file_read").is_some());
        assert!(server.get_tool("not_a_real_tool").is_none());
    }

    #[tokio::test]
    async fn stdio_server_has_a_default_identity_http_server_does_not() {
        let (dispatch, _tenant) = file_store_only_dispatch().await;
        let identity = CallerIdentity::from_header_value("sk-stdio-bearer").unwrap();
        let stdio_server = ToolgateServer::with_default_identity(Arc::clone(&dispatch), identity);
        assert!(stdio_server.default_identity.is_some());

        let http_server = ToolgateServer::new(dispatch);
        assert!(http_server.default_identity.is_none());
    }
}
