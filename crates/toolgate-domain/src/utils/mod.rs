//!
//! **Documentation**: [docs/modules/domain.md](../../../../docs/modules/domain.md)
//!
//! Cross-crate utility modules: small, strict, dependency-light helpers with
//! no business logic of their own.

/// Content hashing for ingestion dedup.
pub mod id;
/// Error-detail verbosity parsing shared by logging configuration.
pub mod logging;
/// Canonical path utilities — strict, no fallbacks.
pub mod path;
/// Redaction of sensitive values in Debug/Display.
pub mod sensitivity;

pub use id::compute_content_hash;
pub use logging::{ErrorDetailsLevel, parse_error_details_level};
pub use sensitivity::REDACTED;
