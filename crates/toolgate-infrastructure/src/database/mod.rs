//! SQLite implementation of the domain's [`toolgate_domain::ports::infrastructure`]
//! database ports.

/// Canonical-schema → SQLite DDL rendering.
pub mod ddl;
/// Connection pool provider and `SqlExecutor`/`DatabaseTransaction` impls.
pub mod sqlite;

pub use ddl::SqliteSchemaDdlGenerator;
pub use sqlite::{SqliteDatabaseExecutor, SqliteDatabaseProvider, SqliteRow, SqliteTransaction};
