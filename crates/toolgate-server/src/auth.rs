//! Authorization header parsing and the per-request tenant identity carried
//! from the transport boundary into tool dispatch (C9, §4.1/§9).
//!
//! Tool handlers never re-parse `Authorization` themselves: the transport
//! layer (stdio or the axum `StreamableHttpService`, see [`crate::transport`])
//! resolves it once and hands a [`CallerIdentity`] down through `rmcp`'s
//! per-request [`rmcp::service::RequestContext::extensions`].

use toolgate_domain::error::{Error, Result};
use toolgate_domain::value_objects::TenantContext;

/// Resolved caller identity for one tool call.
///
/// Carries the raw bearer token alongside the derived [`TenantContext`]
/// because a handful of operations (file writes, memory commits) thread the
/// caller's own credential into a stashed [`toolgate_domain::ports::infrastructure::CredentialVault`]
/// entry for the index worker to embed with later (§4.4.1); the fingerprint
/// alone cannot reconstruct that token.
#[derive(Debug, Clone)]
pub struct CallerIdentity {
    pub context: TenantContext,
    pub raw_token: String,
}

impl CallerIdentity {
    /// Parses a raw `Authorization` header value (`"Bearer <token>"` or a
    /// bare token) into a resolved caller identity.
    pub fn from_header_value(value: &str) -> Result<Self> {
        let token = value.strip_prefix("Bearer ").unwrap_or(value).trim();
        if token.is_empty() {
            return Err(Error::MissingAuth);
        }
        let context = TenantContext::from_raw(token)?;
        Ok(Self { context, raw_token: token.to_owned() })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bearer_prefix_is_stripped() {
        let identity = CallerIdentity::from_header_value("Bearer sk-test-123").unwrap();
        assert_eq!(identity.raw_token, "sk-test-123");
    }

    #[test]
    fn bare_token_is_accepted() {
        let identity = CallerIdentity::from_header_value("sk-test-123").unwrap();
        assert_eq!(identity.raw_token, "sk-test-123");
    }

    #[test]
    fn empty_header_is_missing_auth() {
        assert!(matches!(CallerIdentity::from_header_value(""), Err(Error::MissingAuth)));
        assert!(matches!(CallerIdentity::from_header_value("Bearer "), Err(Error::MissingAuth)));
    }
}
