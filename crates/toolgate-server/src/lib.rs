//! MCP transport and tool-surface layer: wires the application layer's use
//! cases (C5, C6, C8 via [`dispatch::Dispatch`]) to the `rmcp` tool protocol
//! (§6) and exposes both a stdio and a streamable-HTTP transport (§9).

/// `Authorization` header parsing into a resolved [`auth::CallerIdentity`].
pub mod auth;
/// Tool Dispatch (C9): validation, timeout, and call-audit around every tool.
pub mod dispatch;
/// Maps the domain [`toolgate_domain::error::Error`] onto the tool error payload (§7).
pub mod error_mapping;
/// The `rmcp` tool surface (§6) and manual `ServerHandler` middleware.
pub mod handler;
/// Tool input parameter structs, one per tool (§6).
pub mod schema;
/// [`toolgate_application::ToolInvoker`] adapter recursing back through `dispatch`.
pub mod tool_invoker;
#[cfg(test)]
mod test_support;
/// stdio and streamable-HTTP transport runners.
pub mod transport;

pub use dispatch::{Dispatch, DispatchConfig};
pub use handler::ToolgateServer;
