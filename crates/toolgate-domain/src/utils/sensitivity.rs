//!
//! Redaction placeholder shared by every `Debug` impl that hides a secret
//! field (API keys, tokens, passwords) in provider configuration.

/// Placeholder shown instead of sensitive data.
pub const REDACTED: &str = "REDACTED";
