//! Maps the domain [`Error`] onto the tool surface's error payload (§7) and
//! onto `rmcp`'s protocol-level error channel.
//!
//! Per §4.9 step 4 and §7, every tool-contract failure (bad input, missing
//! file, busy lock, ...) stays on the MCP tool-result channel as `{code,
//! message, retryable}` so the calling LLM can see and adapt to it; only a
//! wiring/transport fault (a panicked task, a response that failed to
//! serialize) crosses into `rmcp::ErrorData`, the protocol error channel.

use serde_json::{json, Value};
use toolgate_domain::error::Error;

/// Builds the `{code, message, retryable}` error payload for a failed tool call.
#[must_use]
pub fn error_payload(err: &Error) -> Value {
    json!({
        "code": err.code(),
        "message": err.to_string(),
        "retryable": err.retryable(),
    })
}

/// Wraps [`error_payload`] in the tool surface's envelope: the tool call
/// itself succeeded at the protocol level, but the operation it described
/// did not.
#[must_use]
pub fn tool_error_result(err: &Error) -> Value {
    json!({ "ok": false, "error": error_payload(err) })
}
