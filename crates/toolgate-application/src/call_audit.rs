//! Call Audit & Redaction (C7): parameter redaction rules applied before an
//! invocation is persisted, plus the audit-entry builder tool dispatch (C9)
//! calls after every tool invocation.

use std::sync::Arc;

use chrono::Utc;
use serde_json::{json, Value};

use toolgate_domain::entities::CallLogEntry;
use toolgate_domain::ports::repositories::CallLogRepository;
use toolgate_domain::value_objects::{CallLogId, TenantFingerprint};

const MAX_LOGGED_PARAM_LENGTH: usize = 256;

/// Redacts one tool's raw call parameters per §4.7 before they reach audit
/// storage. Unknown tools fall through to the generic string/vector rules.
#[must_use]
pub fn redact_params(tool_name: &str, params: &Value) -> Value {
    match tool_name {
        "file_write" => redact_fields(params, &["content"]),
        "memory_before_turn" | "memory_after_turn" => redact_fields(params, &["current_input", "input_items", "output_items"]),
        _ => redact_generic(params),
    }
}

fn redact_fields(params: &Value, fields: &[&str]) -> Value {
    let Value::Object(map) = params else { return redact_generic(params) };
    let mut out = serde_json::Map::with_capacity(map.len());
    for (key, value) in map {
        if fields.contains(&key.as_str()) {
            out.insert(key.clone(), redacted_marker(value));
        } else {
            out.insert(key.clone(), redact_generic(value));
        }
    }
    Value::Object(out)
}

fn redacted_marker(value: &Value) -> Value {
    if is_redacted_marker(value) {
        return value.clone();
    }
    let type_name = match value {
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
        Value::Number(_) => "number",
        Value::Bool(_) => "bool",
        Value::Null => "null",
    };
    json!({"redacted": true, "preview": format!("<redacted:{type_name}>")})
}

/// Recognizes the exact shape [`redacted_marker`] produces, so redacting an
/// already-redacted value is a no-op instead of re-wrapping it under a
/// fresh (and possibly different) type tag.
fn is_redacted_marker(value: &Value) -> bool {
    let Value::Object(map) = value else { return false };
    map.len() == 2
        && map.get("redacted") == Some(&Value::Bool(true))
        && matches!(map.get("preview"), Some(Value::String(s)) if s.starts_with("<redacted:") && s.ends_with('>'))
}

/// Generic recursive redaction: long strings are length-summarized and
/// numeric-vector-shaped arrays are dimension-summarized; everything else
/// passes through unchanged.
fn redact_generic(value: &Value) -> Value {
    match value {
        Value::String(s) if s.len() > MAX_LOGGED_PARAM_LENGTH => {
            Value::String(format!("<string:len={},truncated>", s.len()))
        }
        Value::Array(items) if is_numeric_vector(items) => {
            let preview: Vec<Value> = items.iter().take(3).cloned().collect();
            json!({
                "vector": true,
                "dim": items.len(),
                "preview": preview,
                "truncated": items.len() > 3,
            })
        }
        Value::Array(items) => Value::Array(items.iter().map(redact_generic).collect()),
        Value::Object(map) => {
            Value::Object(map.iter().map(|(k, v)| (k.clone(), redact_generic(v))).collect())
        }
        other => other.clone(),
    }
}

fn is_numeric_vector(items: &[Value]) -> bool {
    items.len() > 8 && items.iter().all(Value::is_number)
}

/// Outcome of one tool invocation, as observed by the dispatcher.
pub struct CallOutcome<'a> {
    pub tenant: &'a TenantFingerprint,
    pub project: Option<&'a str>,
    pub tool_name: &'a str,
    pub raw_params: &'a Value,
    pub error_code: Option<&'a str>,
    pub duration_ms: u64,
}

/// Builds and persists the audit entry for one tool call. Never propagates a
/// storage failure to the caller: per §4.9 step 4, audit logging failures do
/// not fail the tool call they describe.
pub async fn record_call(repo: &Arc<dyn CallLogRepository>, outcome: CallOutcome<'_>) {
    let entry = CallLogEntry {
        id: CallLogId::new(),
        tenant: outcome.tenant.clone(),
        project: outcome.project.map(str::to_owned),
        tool_name: outcome.tool_name.to_owned(),
        redacted_params: redact_params(outcome.tool_name, outcome.raw_params),
        error_code: outcome.error_code.map(str::to_owned),
        ok: outcome.error_code.is_none(),
        duration_ms: outcome.duration_ms,
        created_at: Utc::now(),
    };
    if let Err(e) = repo.insert(&entry).await {
        toolgate_domain::infra::logging::dispatch(
            toolgate_domain::ports::LogLevel::Error,
            "call_audit",
            "failed to persist call log entry",
            Some(&e),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_write_content_is_redacted() {
        let params = json!({"path": "/a.txt", "content": "secret payload"});
        let redacted = redact_params("file_write", &params);
        assert_eq!(redacted["content"]["redacted"], json!(true));
        assert_eq!(redacted["path"], json!("/a.txt"));
    }

    #[test]
    fn long_strings_are_length_summarized() {
        let long = "x".repeat(300);
        let params = json!({"note": long});
        let redacted = redact_params("file_read", &params);
        assert_eq!(redacted["note"], json!("<string:len=300,truncated>"));
    }

    #[test]
    fn numeric_vectors_are_dimension_summarized() {
        let vector: Vec<f32> = (0..16).map(|i| i as f32).collect();
        let params = json!({"embedding": vector});
        let redacted = redact_params("file_read", &params);
        assert_eq!(redacted["embedding"]["dim"], json!(16));
        assert_eq!(redacted["embedding"]["truncated"], json!(true));
    }

    #[test]
    fn redacting_an_already_redacted_field_is_a_no_op() {
        let params = json!({"content": "secret"});
        let once = redact_params("file_write", &params);
        let twice = redact_params("file_write", &once);
        assert_eq!(once, twice);
    }

    #[test]
    fn memory_fields_are_redacted_regardless_of_shape() {
        let params = json!({"current_input": ["a", "b"], "turn_id": "t1"});
        let redacted = redact_params("memory_before_turn", &params);
        assert_eq!(redacted["current_input"]["redacted"], json!(true));
        assert_eq!(redacted["turn_id"], json!("t1"));
    }
}
