//! # Domain Layer
//!
//! Core business rules for a multi-tenant tool-invocation gateway: a virtual
//! file system with hybrid (semantic + lexical) search, and an agent memory
//! lifecycle built on top of it. Contains only entities, value objects, port
//! traits, and pure business rules — no transport, no SQL, no HTTP clients.
//!
//! ## Architecture
//!
//! | Component | Description |
//! |-----------|-------------|
//! | [`entities`] | Persisted and ephemeral domain entities |
//! | [`value_objects`] | Immutable, by-value types (IDs, tenant identity, config) |
//! | [`ports`] | Trait boundaries implemented by outer layers |
//! | [`constants`] | Domain-wide constants |
//! | [`error`] | The machine-stable domain error enum |
//! | [`schema`] | Canonical persistence schema, aggregated from entities |
//! | [`registry`] | Compile-time provider auto-registration (`linkme`) |
//!
//! ## Clean Architecture Principles
//!
//! - **Entities** are at the center with business rules
//! - **Value Objects** are immutable and compared by value
//! - **No external dependencies** — only standard library and core traits
//! - **Pure business logic** — no infrastructure or transport concerns
//!
//! ## Example
//!
//! ```
//! use toolgate_domain::entities::File;
//! use toolgate_domain::value_objects::{FileId, TenantFingerprint};
//!
//! let file = File {
//!     id: FileId::new(),
//!     tenant: TenantFingerprint::from_api_key("sk-example"),
//!     project: "demo".to_owned(),
//!     path: "/notes/today.md".to_owned(),
//!     content: "# Today".to_owned(),
//!     size_bytes: 8,
//!     version: 1,
//!     deleted_at: None,
//!     created_at: chrono::Utc::now(),
//!     updated_at: chrono::Utc::now(),
//! };
//! assert!(!file.is_deleted());
//! ```

/// Common macros, organized by domain area (entities, ports, schema, registry, logging, DI).
#[macro_use]
pub mod macros;

/// Domain-level constants
pub mod constants;
/// Core business entities with identity
pub mod entities;
/// Domain error types
pub mod error;
/// Logging facade decoupling domain from the concrete `tracing` backend
pub mod infra;
/// External provider and infrastructure port interfaces
pub mod ports;
/// Provider auto-registration registry
pub mod registry;
/// Canonical persistence schema, aggregated from entity DDL
pub mod schema;
/// Common utilities
pub mod utils;
/// Immutable value objects
pub mod value_objects;

// Re-export commonly used types for convenience.
pub use constants::*;
pub use entities::*;
pub use error::{Error, Result};
pub use schema::{
    ColumnDef, ColumnType, ForeignKeyDef, FtsDef, IndexDef, Schema, SchemaDdlGenerator, TableDef,
    UniqueConstraintDef,
};
pub use value_objects::*;
