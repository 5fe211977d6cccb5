//! Canonical schema model: every persisted table's DDL, aggregated from the
//! entities that implement [`types::HasTableSchema`], plus the single FTS5
//! virtual table over `chunk_lexical_rows`.
//!
//! **Documentation**: [docs/modules/domain.md](../../../../docs/modules/domain.md)

/// Builds the canonical [`types::Schema`] from the entity-owned DDL.
pub mod definition;
/// Canonical schema model types and DDL generation traits.
pub mod types;

pub use types::*;
