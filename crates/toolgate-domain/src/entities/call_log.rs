//! Per-invocation audit trail (C7), written with redacted parameters.

use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::value_objects::{CallLogId, TenantFingerprint};

/// One tool invocation's audit record.
#[derive(Debug, Clone, PartialEq)]
pub struct CallLogEntry {
    /// Primary key.
    pub id: CallLogId,
    pub tenant: TenantFingerprint,
    pub project: Option<String>,
    /// Name of the invoked tool (e.g. `file_write`, `memory_after_turn`).
    pub tool_name: String,
    /// Caller-supplied parameters after redaction rules have run.
    pub redacted_params: Value,
    /// Machine-stable error code, or `None` on success.
    pub error_code: Option<String>,
    /// Whether the call succeeded.
    pub ok: bool,
    pub duration_ms: u64,
    pub created_at: DateTime<Utc>,
}

impl_table_schema!(CallLogEntry, "call_log_entries",
    columns: [
        ("id", Uuid, pk),
        ("tenant_fingerprint", Text),
        ("project", Text, nullable),
        ("tool_name", Text),
        ("redacted_params_json", Json),
        ("error_code", Text, nullable),
        ("ok", Boolean),
        ("duration_ms", Integer),
        ("created_at", Timestamp),
    ],
    indexes: [
        "idx_call_log_tenant_created" => ["tenant_fingerprint", "created_at"],
        "idx_call_log_tool" => ["tool_name"],
    ],
    foreign_keys: [],
);
