//! Transport runners: stdio for single-tenant local use, and an axum
//! streamable-HTTP service for multi-tenant deployments where each
//! connection authenticates with its own `Authorization` header (§9).

use std::sync::Arc;

use axum::extract::Request;
use axum::http::{HeaderMap, StatusCode};
use axum::middleware::{self, Next};
use axum::response::Response;
use axum::Router;
use rmcp::transport::stdio;
use rmcp::transport::streamable_http_server::session::local::LocalSessionManager;
use rmcp::transport::streamable_http_server::StreamableHttpService;
use rmcp::ServiceExt;

use crate::auth::CallerIdentity;
use crate::dispatch::Dispatch;
use crate::handler::ToolgateServer;

/// Runs the gateway over stdio for the lifetime of the process.
///
/// stdio has no per-call `Authorization` header, so the whole process
/// authenticates once at startup with `bearer_token` and every tool call
/// runs under that single identity.
pub async fn serve_stdio(dispatch: Arc<Dispatch>, bearer_token: &str) -> anyhow::Result<()> {
    let identity = CallerIdentity::from_header_value(bearer_token)?;
    let server = ToolgateServer::with_default_identity(dispatch, identity);
    let running = server.serve(stdio()).await?;
    running.waiting().await?;
    Ok(())
}

/// Extracts the `Authorization` header from an inbound HTTP request and
/// stashes the resolved [`CallerIdentity`] in the request's extensions so
/// [`crate::handler::ToolgateServer`]'s tool methods can read it back out of
/// `rmcp`'s per-call [`rmcp::service::RequestContext::extensions`], which is
/// seeded from the HTTP request extensions by the streamable-HTTP transport.
///
/// A request with no or malformed `Authorization` header is still let
/// through: `ToolgateServer::caller_identity` turns the absence into a
/// `MISSING_AUTH` tool-result error rather than a bare HTTP rejection, so a
/// misconfigured client sees the same error shape it would over any other
/// transport.
async fn resolve_identity(mut request: Request, next: Next) -> Response {
    if let Some(identity) = extract_identity(request.headers()) {
        request.extensions_mut().insert(identity);
    }
    next.run(request).await
}

fn extract_identity(headers: &HeaderMap) -> Option<CallerIdentity> {
    let raw = headers.get(axum::http::header::AUTHORIZATION)?.to_str().ok()?;
    CallerIdentity::from_header_value(raw).ok()
}

/// Builds the axum router serving the MCP streamable-HTTP transport at
/// `/mcp`, with the authorization-resolving middleware applied ahead of it.
pub fn http_router(dispatch: Arc<Dispatch>) -> Router {
    let service = StreamableHttpService::new(move || Ok(ToolgateServer::new(Arc::clone(&dispatch))), LocalSessionManager::default().into(), Default::default());

    Router::new().nest_service("/mcp", service).route_layer(middleware::from_fn(resolve_identity)).fallback(fallback_not_found)
}

async fn fallback_not_found() -> (StatusCode, &'static str) {
    (StatusCode::NOT_FOUND, "toolgate: unknown route, MCP is served at /mcp")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::file_store_only_dispatch;

    #[tokio::test]
    async fn http_router_builds_without_panicking() {
        let (dispatch, _tenant) = file_store_only_dispatch().await;
        let _router = http_router(dispatch);
    }

    #[test]
    fn extract_identity_parses_a_bearer_header() {
        let mut headers = HeaderMap::new();
        headers.insert(axum::http::header::AUTHORIZATION, "Bearer sk-http-123".parse().unwrap());
        let identity = extract_identity(&headers).expect("bearer header resolves to an identity");
        assert_eq!(identity.raw_token, "sk-http-123");
    }

    #[test]
    fn extract_identity_is_none_without_a_header() {
        let headers = HeaderMap::new();
        assert!(extract_identity(&headers).is_none());
    }
}

/// Runs the streamable-HTTP transport until the process receives a shutdown signal.
pub async fn serve_http(dispatch: Arc<Dispatch>, bind_addr: &str) -> anyhow::Result<()> {
    let router = http_router(dispatch);
    let listener = tokio::net::TcpListener::bind(bind_addr).await?;
    tracing::info!(%bind_addr, "toolgate MCP server listening");
    axum::serve(listener, router).await?;
    Ok(())
}
