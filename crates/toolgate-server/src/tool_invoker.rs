//! Adapts [`Dispatch`] to the pipeline composer's [`ToolInvoker`] port so
//! `mcp_pipe` steps recurse back through the same validation, timeout, and
//! audit machinery every top-level call goes through.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use toolgate_application::ToolInvoker;
use toolgate_domain::value_objects::TenantFingerprint;

use crate::dispatch::Dispatch;

/// Wraps a [`Dispatch`] so the pipeline composer can invoke tool steps
/// in-process without depending on the server crate's concrete type.
pub struct DispatchInvoker {
    dispatch: Arc<Dispatch>,
}

impl DispatchInvoker {
    pub fn new(dispatch: Arc<Dispatch>) -> Self {
        Self { dispatch }
    }
}

#[async_trait]
impl ToolInvoker for DispatchInvoker {
    /// Pipeline-recursed calls never carry the caller's own bearer token:
    /// the port has no slot for one, so credential-stashing operations
    /// invoked through `mcp_pipe` run with the platform-default credential
    /// (§4.4.1's `api_key: None` path).
    async fn invoke(&self, tenant: &TenantFingerprint, project: &str, tool: &str, args: Value) -> Result<Value, String> {
        self.dispatch.call(tenant, project, tool, args, None).await.map_err(|e| e.code().to_owned())
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::test_support::file_store_only_dispatch;

    #[tokio::test]
    async fn invoke_recurses_through_dispatch_and_succeeds() {
        let (dispatch, tenant) = file_store_only_dispatch().await;
        let invoker = DispatchInvoker::new(dispatch);

        let result = invoker.invoke(&tenant, "proj", "file_stat", json!({"project": "proj", "path": "/missing.txt"})).await.unwrap();
        assert_eq!(result["exists"], json!(false));
    }

    #[tokio::test]
    async fn invoke_maps_dispatch_errors_to_their_machine_stable_code() {
        let (dispatch, tenant) = file_store_only_dispatch().await;
        let invoker = DispatchInvoker::new(dispatch);

        let err = invoker.invoke(&tenant, "proj", "not_a_real_tool", json!({})).await.unwrap_err();
        assert_eq!(err, "INVALID_ARGUMENT");
    }

    #[tokio::test]
    async fn invoke_never_threads_an_api_key_into_the_stashed_credential() {
        // A recursed file_write never receives a bearer token (the port has
        // no slot for one), so the written file carries no stashed
        // credential — verified indirectly: the call itself must still
        // succeed, since `api_key: None` is a valid, supported path.
        let (dispatch, tenant) = file_store_only_dispatch().await;
        let invoker = DispatchInvoker::new(dispatch);

        let result = invoker
            .invoke(&tenant, "proj", "file_write", json!({"project": "proj", "path": "/a.txt", "mode": "OVERWRITE", "content": "hi"}))
            .await
            .unwrap();
        assert_eq!(result["bytes_written"], json!(2));
    }
}
