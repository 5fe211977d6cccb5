//! Tenant identity value objects.
//!
//! The raw API key is never retained past derivation of a [`TenantFingerprint`];
//! every read/write/search/index path carries the fingerprint, never the token.

use std::fmt;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Stable, non-reversible identifier for a tenant, derived from an API key.
///
/// Always exactly 64 lowercase hex characters (a SHA-256 digest).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, schemars::JsonSchema)]
pub struct TenantFingerprint(String);

impl TenantFingerprint {
    /// Derive a fingerprint from a raw API key. The key itself is not retained.
    #[must_use]
    pub fn from_api_key(api_key: &str) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(api_key.as_bytes());
        Self(hex::encode(hasher.finalize()))
    }

    /// Wrap an already-computed 64-hex-char digest, validating its shape.
    pub fn from_hex(s: &str) -> crate::Result<Self> {
        if s.len() == 64 && s.bytes().all(|b| b.is_ascii_hexdigit()) {
            Ok(Self(s.to_ascii_lowercase()))
        } else {
            Err(crate::Error::invalid_argument(
                "tenant fingerprint must be 64 hex characters",
            ))
        }
    }

    /// The full 64-hex-char digest.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Short prefix safe to place in logs and trace spans.
    #[must_use]
    pub fn log_prefix(&self) -> &str {
        &self.0[..8]
    }
}

impl fmt::Display for TenantFingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Caller-facing display identity parsed from the `identity@api-key` legacy form,
/// or equal to the fingerprint's log prefix when no identity segment was supplied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, schemars::JsonSchema)]
pub struct TenantIdentity(String);

impl TenantIdentity {
    /// Build a display identity from an explicit name.
    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Build a fallback display identity from a fingerprint when no identity
    /// segment was present in the authorization header.
    #[must_use]
    pub fn anonymous(fingerprint: &TenantFingerprint) -> Self {
        Self(fingerprint.log_prefix().to_string())
    }

    /// The display string, safe to log in full.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TenantIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Resolved tenant context, threaded through every C2-C10 call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TenantContext {
    /// Stable tenant fingerprint, used for every storage key.
    pub fingerprint: TenantFingerprint,
    /// Human-readable identity, used only for logging/audit.
    pub identity: TenantIdentity,
}

/// Prefixes that mark a token as API-key shaped, per §4.1/§9.
const API_KEY_PREFIXES: [&str; 4] = ["sk-", "rk-", "pk-", "ak-"];

fn looks_like_api_key(s: &str) -> bool {
    API_KEY_PREFIXES.iter().any(|p| s.starts_with(p))
}

impl TenantContext {
    /// Derive a [`TenantContext`] from a raw authorization value.
    ///
    /// Recognizes the legacy `identity@api-key` form only when the left half
    /// does not itself look API-key shaped and the right half does (§4.1,
    /// §9) — an email-like token such as `user@example.com` is never split,
    /// since neither half matches an API-key prefix. Splitting always hashes
    /// the whole raw value for the fingerprint in that case; otherwise the
    /// fingerprint is derived from the key half alone.
    pub fn from_raw(raw: &str) -> crate::Result<Self> {
        if raw.is_empty() {
            return Err(crate::Error::MissingAuth);
        }
        if raw.chars().any(|c| c.is_control() || c.is_whitespace()) {
            return Err(crate::Error::InvalidAuth {
                message: "token must not contain whitespace or control characters".to_owned(),
            });
        }
        match raw.rsplit_once('@') {
            Some((name, key)) if !name.is_empty() && !looks_like_api_key(name) && looks_like_api_key(key) => {
                Ok(Self { fingerprint: TenantFingerprint::from_api_key(key), identity: TenantIdentity::named(name) })
            }
            _ => {
                let fingerprint = TenantFingerprint::from_api_key(raw);
                let identity = TenantIdentity::anonymous(&fingerprint);
                Ok(Self { fingerprint, identity })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_key_yields_same_fingerprint() {
        let a = TenantFingerprint::from_api_key("sk-test-123");
        let b = TenantFingerprint::from_api_key("sk-test-123");
        assert_eq!(a, b);
        assert_eq!(a.as_str().len(), 64);
    }

    #[test]
    fn different_keys_yield_different_fingerprints() {
        let a = TenantFingerprint::from_api_key("sk-test-123");
        let b = TenantFingerprint::from_api_key("sk-test-456");
        assert_ne!(a, b);
    }

    #[test]
    fn identity_at_key_form_keeps_display_name() {
        let ctx = TenantContext::from_raw("alice@sk-test-123").unwrap();
        assert_eq!(ctx.identity.as_str(), "alice");
    }

    #[test]
    fn bare_key_falls_back_to_fingerprint_prefix() {
        let ctx = TenantContext::from_raw("sk-test-123").unwrap();
        assert_eq!(ctx.identity.as_str(), ctx.fingerprint.log_prefix());
    }

    #[test]
    fn empty_auth_is_rejected() {
        assert!(matches!(TenantContext::from_raw(""), Err(crate::Error::MissingAuth)));
    }

    #[test]
    fn token_with_whitespace_is_invalid_auth() {
        assert!(matches!(TenantContext::from_raw("sk-test 123"), Err(crate::Error::InvalidAuth { .. })));
    }

    #[test]
    fn token_with_control_characters_is_invalid_auth() {
        assert!(matches!(TenantContext::from_raw("sk-test\n123"), Err(crate::Error::InvalidAuth { .. })));
    }

    #[test]
    fn email_like_token_is_not_split() {
        let ctx = TenantContext::from_raw("user@example.com").unwrap();
        assert_eq!(ctx.identity.as_str(), ctx.fingerprint.log_prefix());
        assert_eq!(ctx.fingerprint, TenantFingerprint::from_api_key("user@example.com"));
    }

    #[test]
    fn key_shaped_left_half_is_not_treated_as_an_identity() {
        // Neither half gets to call itself the identity when the left half
        // is itself API-key shaped; the whole token is hashed as-is.
        let ctx = TenantContext::from_raw("sk-abc@sk-def").unwrap();
        assert_eq!(ctx.fingerprint, TenantFingerprint::from_api_key("sk-abc@sk-def"));
    }
}
