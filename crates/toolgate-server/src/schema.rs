//! Tool input parameter structs (§6): one per MCP tool, `Deserialize` for
//! wire decoding and `JsonSchema` so `schemars` can generate the input
//! schema `rmcp`'s `#[tool_router]` advertises to callers.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Deserialize, Serialize, JsonSchema)]
pub struct FileStatParams {
    /// Project name the path is scoped to.
    pub project: String,
    /// Virtual path to describe. Empty or `"/"` means the project root.
    pub path: String,
}

#[derive(Debug, Deserialize, Serialize, JsonSchema)]
pub struct FileReadParams {
    pub project: String,
    pub path: String,
    /// Byte offset to start reading from. Defaults to 0.
    pub offset: Option<u64>,
    /// Maximum bytes to return. Defaults to the whole remaining content.
    pub length: Option<u64>,
}

#[derive(Debug, Deserialize, Serialize, JsonSchema)]
pub struct FileWriteParams {
    pub project: String,
    pub path: String,
    /// Content to write, `content_encoding`-decoded first.
    pub content: String,
    /// `"utf8"` (default) or `"base64"`.
    pub content_encoding: Option<String>,
    /// Byte offset the write applies at; required shape depends on `mode`.
    #[serde(default)]
    pub offset: i64,
    /// `"APPEND" | "TRUNCATE" | "OVERWRITE"`.
    pub mode: String,
}

#[derive(Debug, Deserialize, Serialize, JsonSchema)]
pub struct FileDeleteParams {
    pub project: String,
    pub path: String,
    /// Delete every active file under `path` as well. Defaults to `false`.
    #[serde(default)]
    pub recursive: bool,
}

#[derive(Debug, Deserialize, Serialize, JsonSchema)]
pub struct FileRenameParams {
    pub project: String,
    pub from_path: String,
    pub to_path: String,
    /// Replace an existing single-file destination. Defaults to `false`.
    #[serde(default)]
    pub overwrite: bool,
}

#[derive(Debug, Deserialize, Serialize, JsonSchema)]
pub struct FileListParams {
    pub project: String,
    /// Directory to list. Defaults to the project root.
    pub path: Option<String>,
    /// Synthesized-directory recursion depth. Defaults to 1.
    pub depth: Option<u32>,
    /// Maximum entries returned.
    pub limit: Option<usize>,
}

#[derive(Debug, Deserialize, Serialize, JsonSchema)]
pub struct FileSearchParams {
    pub project: String,
    pub query: String,
    /// Restrict hits to chunks whose file path starts with this string.
    pub path_prefix: Option<String>,
    pub limit: Option<usize>,
}

#[derive(Debug, Deserialize, Serialize, JsonSchema)]
pub struct MemoryBeforeTurnParams {
    pub project: String,
    pub session_id: String,
    pub user_id: String,
    pub turn_id: String,
    /// The turn's not-yet-recalled input items. Must be non-empty.
    pub current_input: Vec<Value>,
    pub base_instructions: Option<String>,
    pub max_input_tok: Option<u64>,
}

#[derive(Debug, Deserialize, Serialize, JsonSchema)]
pub struct MemoryAfterTurnParams {
    pub project: String,
    pub session_id: String,
    pub user_id: String,
    pub turn_id: String,
    pub input_items: Value,
    pub output_items: Value,
    /// Facts extracted from this turn, merged into tiered storage.
    #[serde(default)]
    pub extracted_facts: Vec<Value>,
}

#[derive(Debug, Deserialize, Serialize, JsonSchema)]
pub struct MemoryRunMaintenanceParams {
    pub project: String,
    pub session_id: String,
}

#[derive(Debug, Deserialize, Serialize, JsonSchema)]
pub struct MemoryListDirWithAbstractParams {
    pub project: String,
    pub session_id: String,
    /// Path under the session's memory root. Defaults to the session root.
    pub path: Option<String>,
    pub depth: Option<u32>,
    pub limit: Option<usize>,
}

#[derive(Debug, Deserialize, Serialize, JsonSchema)]
pub struct RagExtractParams {
    pub user_id: String,
    pub task_id: String,
    pub query: String,
    /// Materials ingested once per distinct normalized content per task.
    pub materials: String,
    /// Number of passages to return. Defaults to the search layer's default.
    pub top_k: Option<usize>,
}

#[derive(Debug, Deserialize, Serialize, JsonSchema)]
pub struct McpPipeParams {
    /// Project the pipeline's tool steps run against.
    pub project: String,
    /// `{vars?, steps[], return?, continue_on_error?}` per §4.8.
    pub spec: Value,
}
