//! SQLite DDL generator for the canonical [`Schema`].
//!
//! Grounded on the teacher's `mcb-infrastructure/src/database/memory_provider.rs`:
//! the same table/FTS/trigger/index rendering, adapted to the richer
//! [`ColumnType`] set this domain's schema uses (`Real`, `Boolean`, `Blob`,
//! `Uuid`, `Timestamp` in addition to `Text`/`Integer`).

use toolgate_domain::schema::types::{
    ColumnDef, ColumnType, ForeignKeyDef, FtsDef, IndexDef, Schema, SchemaDdlGenerator, TableDef,
    UniqueConstraintDef,
};

/// Renders the canonical [`Schema`] into SQLite `CREATE TABLE`/`CREATE INDEX`/FTS5 DDL.
pub struct SqliteSchemaDdlGenerator;

fn column_type_sqlite(ty: &ColumnType) -> &'static str {
    match ty {
        ColumnType::Text | ColumnType::Json | ColumnType::Uuid => "TEXT",
        ColumnType::Integer | ColumnType::Boolean | ColumnType::Timestamp => "INTEGER",
        ColumnType::Real => "REAL",
        ColumnType::Blob => "BLOB",
    }
}

fn column_ddl(col: &ColumnDef, foreign_keys: &[&ForeignKeyDef]) -> String {
    let mut s = format!("{} {}", col.name, column_type_sqlite(&col.type_));
    if col.primary_key {
        s.push_str(" PRIMARY KEY");
        if col.auto_increment && matches!(col.type_, ColumnType::Integer) {
            s.push_str(" AUTOINCREMENT");
        }
    }
    if col.unique && !col.primary_key {
        s.push_str(" UNIQUE");
    }
    if col.not_null && !col.primary_key {
        s.push_str(" NOT NULL");
    }
    if let Some(fk) = foreign_keys.iter().find(|fk| fk.from_column == col.name) {
        s.push_str(&format!(" REFERENCES {}({})", fk.to_table, fk.to_column));
    }
    s
}

fn table_ddl(table: &TableDef, unique_constraints: &[&UniqueConstraintDef], foreign_keys: &[&ForeignKeyDef]) -> String {
    let mut parts: Vec<String> = table.columns.iter().map(|c| column_ddl(c, foreign_keys)).collect();
    for u in unique_constraints {
        parts.push(format!("UNIQUE({})", u.columns.join(", ")));
    }
    format!("CREATE TABLE IF NOT EXISTS {} ({})", table.name, parts.join(", "))
}

fn fts_ddl(fts: &FtsDef) -> String {
    let content_cols = fts.content_columns.join(", ");
    format!(
        "CREATE VIRTUAL TABLE IF NOT EXISTS {} USING fts5({}, {} UNINDEXED, content='{}', content_rowid='rowid')",
        fts.virtual_table_name, content_cols, fts.id_column, fts.content_table
    )
}

fn trigger_after_insert(fts: &FtsDef) -> String {
    let content_col = fts.content_columns.first().map_or("content", String::as_str);
    format!(
        "CREATE TRIGGER IF NOT EXISTS {vt}_ai AFTER INSERT ON {ct} BEGIN\n  INSERT INTO {vt}(rowid, {id}, {col}) VALUES (new.rowid, new.{id}, new.{col});\nEND;",
        vt = fts.virtual_table_name,
        ct = fts.content_table,
        id = fts.id_column,
        col = content_col,
    )
}

fn trigger_after_delete(fts: &FtsDef) -> String {
    format!(
        "CREATE TRIGGER IF NOT EXISTS {vt}_ad AFTER DELETE ON {ct} BEGIN\n  INSERT INTO {vt}({vt}, rowid, {id}, {col}) VALUES ('delete', old.rowid, old.{id}, old.{col});\nEND;",
        vt = fts.virtual_table_name,
        ct = fts.content_table,
        id = fts.id_column,
        col = fts.content_columns.first().map_or("content", String::as_str),
    )
}

fn trigger_after_update(fts: &FtsDef) -> String {
    let content_col = fts.content_columns.first().map_or("content", String::as_str);
    format!(
        "CREATE TRIGGER IF NOT EXISTS {vt}_au AFTER UPDATE ON {ct} BEGIN\n  INSERT INTO {vt}({vt}, rowid, {id}, {col}) VALUES ('delete', old.rowid, old.{id}, old.{col});\n  INSERT INTO {vt}(rowid, {id}, {col}) VALUES (new.rowid, new.{id}, new.{col});\nEND;",
        vt = fts.virtual_table_name,
        ct = fts.content_table,
        id = fts.id_column,
        col = content_col,
    )
}

fn index_ddl(idx: &IndexDef) -> String {
    format!("CREATE INDEX IF NOT EXISTS {} ON {}({})", idx.name, idx.table, idx.columns.join(", "))
}

impl SchemaDdlGenerator for SqliteSchemaDdlGenerator {
    fn generate_ddl(&self, schema: &Schema) -> Vec<String> {
        let mut stmts = Vec::new();
        for table in &schema.tables {
            let uniques: Vec<&UniqueConstraintDef> =
                schema.unique_constraints.iter().filter(|u| u.table == table.name).collect();
            let fks: Vec<&ForeignKeyDef> = schema.foreign_keys.iter().filter(|fk| fk.from_table == table.name).collect();
            stmts.push(table_ddl(table, &uniques, &fks));
        }
        if let Some(fts) = &schema.fts {
            stmts.push(fts_ddl(fts));
            stmts.push(trigger_after_insert(fts));
            stmts.push(trigger_after_delete(fts));
            stmts.push(trigger_after_update(fts));
        }
        for idx in &schema.indexes {
            stmts.push(index_ddl(idx));
        }
        stmts
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generates_a_statement_per_table_plus_fts_and_indexes() {
        let schema = Schema::definition();
        let ddl = SqliteSchemaDdlGenerator.generate_ddl(&schema);
        assert!(ddl.iter().any(|s| s.starts_with("CREATE TABLE IF NOT EXISTS files")));
        assert!(ddl.iter().any(|s| s.contains("USING fts5")));
        assert!(ddl.iter().any(|s| s.starts_with("CREATE INDEX")));
    }
}
