//! Aggregates the canonical [`Schema`] from each entity's own
//! [`HasTableSchema`] impl, plus the one FTS5 definition the lexical search
//! provider (C5) builds its virtual table from.
//!
//! **Documentation**: [docs/modules/domain.md](../../../../docs/modules/domain.md)

use super::types::{
    ForeignKeyDef, FtsDef, HasTableSchema, IndexDef, Schema, TableDef, UniqueConstraintDef,
};
use crate::entities::{CallLogEntry, Chunk, ChunkEmbedding, ChunkLexicalRow, File, IndexJob, TurnGuard};

struct SchemaEntry {
    table: fn() -> TableDef,
    indexes: fn() -> Vec<IndexDef>,
    foreign_keys: fn() -> Vec<ForeignKeyDef>,
    unique_constraints: fn() -> Vec<UniqueConstraintDef>,
}

/// Build a [`SchemaEntry`] from a type implementing [`HasTableSchema`].
macro_rules! from_entity {
    ($entity:ty) => {
        SchemaEntry {
            table: <$entity as HasTableSchema>::table_def,
            indexes: <$entity as HasTableSchema>::indexes,
            foreign_keys: <$entity as HasTableSchema>::foreign_keys,
            unique_constraints: <$entity as HasTableSchema>::unique_constraints,
        }
    };
}

const SCHEMA_ENTRIES: &[SchemaEntry] = &[
    from_entity!(File),
    from_entity!(Chunk),
    from_entity!(ChunkEmbedding),
    from_entity!(ChunkLexicalRow),
    from_entity!(IndexJob),
    from_entity!(TurnGuard),
    from_entity!(CallLogEntry),
];

impl Schema {
    /// Build the canonical full schema definition.
    #[must_use]
    pub fn definition() -> Self {
        Self {
            tables: Self::tables(),
            fts: Self::fts_def(),
            indexes: Self::indexes(),
            foreign_keys: Self::foreign_keys(),
            unique_constraints: Self::unique_constraints(),
        }
    }

    fn tables() -> Vec<TableDef> {
        SCHEMA_ENTRIES.iter().map(|entry| (entry.table)()).collect()
    }

    /// `chunk_lexical_rows.normalized_text` is the content source for the
    /// BM25 lexical index the hybrid search service (C5) queries alongside
    /// the vector store.
    fn fts_def() -> Option<FtsDef> {
        Some(FtsDef {
            virtual_table_name: "chunk_lexical_rows_fts".to_owned(),
            content_table: "chunk_lexical_rows".to_owned(),
            content_columns: vec!["normalized_text".to_owned()],
            id_column: "chunk_id".to_owned(),
        })
    }

    fn indexes() -> Vec<IndexDef> {
        SCHEMA_ENTRIES
            .iter()
            .flat_map(|entry| (entry.indexes)().into_iter())
            .collect()
    }

    fn foreign_keys() -> Vec<ForeignKeyDef> {
        SCHEMA_ENTRIES
            .iter()
            .flat_map(|entry| (entry.foreign_keys)().into_iter())
            .collect()
    }

    fn unique_constraints() -> Vec<UniqueConstraintDef> {
        SCHEMA_ENTRIES
            .iter()
            .flat_map(|entry| (entry.unique_constraints)().into_iter())
            .collect()
    }
}
