//! SQLite implementation of the [`DatabaseExecutor`]/[`DatabaseTransaction`] ports.
//!
//! Grounded on the teacher's `mcb-infrastructure/src/database/memory_provider.rs`
//! connection/DDL-application pattern, adapted to return the domain's own
//! driver-agnostic [`SqlExecutor`] surface instead of exposing `SqlitePool`
//! directly to repositories.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqliteRow as RawSqliteRow};
use sqlx::{Column, Row, Sqlite, SqlitePool};
use tokio::sync::Mutex;

use toolgate_domain::error::{Error, Result};
use toolgate_domain::ports::infrastructure::{
    DatabaseExecutor, DatabaseProvider, DatabaseTransaction, SqlExecutor, SqlParam, SqlRow,
};
use toolgate_domain::schema::types::{Schema, SchemaDdlGenerator};

use super::ddl::SqliteSchemaDdlGenerator;

fn map_sqlx_err(context: &str, e: sqlx::Error) -> Error {
    Error::internal_with_source(format!("sqlite: {context}"), e)
}

/// Row wrapper exposing the canonical [`SqlRow`] surface over a raw sqlx row.
pub struct SqliteRow(RawSqliteRow);

fn has_column(row: &RawSqliteRow, name: &str) -> bool {
    row.columns().iter().any(|c| c.name() == name)
}

impl SqlRow for SqliteRow {
    fn try_get_string(&self, name: &str) -> Result<Option<String>> {
        if !has_column(&self.0, name) {
            return Ok(None);
        }
        self.0.try_get::<Option<String>, _>(name).map_err(|e| map_sqlx_err("read string column", e))
    }

    fn try_get_i64(&self, name: &str) -> Result<Option<i64>> {
        if !has_column(&self.0, name) {
            return Ok(None);
        }
        self.0.try_get::<Option<i64>, _>(name).map_err(|e| map_sqlx_err("read i64 column", e))
    }

    fn try_get_f64(&self, name: &str) -> Result<Option<f64>> {
        if !has_column(&self.0, name) {
            return Ok(None);
        }
        self.0.try_get::<Option<f64>, _>(name).map_err(|e| map_sqlx_err("read f64 column", e))
    }

    fn try_get_bool(&self, name: &str) -> Result<Option<bool>> {
        if !has_column(&self.0, name) {
            return Ok(None);
        }
        self.0.try_get::<Option<i64>, _>(name).map(|v| v.map(|n| n != 0)).map_err(|e| map_sqlx_err("read bool column", e))
    }
}

fn bind_params<'q>(
    mut query: sqlx::query::Query<'q, Sqlite, sqlx::sqlite::SqliteArguments<'q>>,
    params: &'q [SqlParam],
) -> sqlx::query::Query<'q, Sqlite, sqlx::sqlite::SqliteArguments<'q>> {
    for param in params {
        query = match param {
            SqlParam::String(s) => query.bind(s.as_str()),
            SqlParam::I64(v) => query.bind(*v),
            SqlParam::F64(v) => query.bind(*v),
            SqlParam::Bool(v) => query.bind(*v),
            SqlParam::Null => query.bind(Option::<String>::None),
        };
    }
    query
}

async fn execute_on<'e, E>(executor: E, sql: &str, params: &[SqlParam]) -> Result<()>
where
    E: sqlx::Executor<'e, Database = Sqlite>,
{
    let query = bind_params(sqlx::query(sql), params);
    query.execute(executor).await.map_err(|e| map_sqlx_err("execute", e))?;
    Ok(())
}

async fn query_one_on<'e, E>(executor: E, sql: &str, params: &[SqlParam]) -> Result<Option<Arc<dyn SqlRow>>>
where
    E: sqlx::Executor<'e, Database = Sqlite>,
{
    let query = bind_params(sqlx::query(sql), params);
    let row = query.fetch_optional(executor).await.map_err(|e| map_sqlx_err("query_one", e))?;
    Ok(row.map(|r| Arc::new(SqliteRow(r)) as Arc<dyn SqlRow>))
}

async fn query_all_on<'e, E>(executor: E, sql: &str, params: &[SqlParam]) -> Result<Vec<Arc<dyn SqlRow>>>
where
    E: sqlx::Executor<'e, Database = Sqlite>,
{
    let query = bind_params(sqlx::query(sql), params);
    let rows = query.fetch_all(executor).await.map_err(|e| map_sqlx_err("query_all", e))?;
    Ok(rows.into_iter().map(|r| Arc::new(SqliteRow(r)) as Arc<dyn SqlRow>).collect())
}

/// An open SQLite transaction. Interior mutex lets the `&self`-shaped
/// [`SqlExecutor`] surface drive a driver transaction that otherwise needs `&mut`.
pub struct SqliteTransaction {
    inner: Mutex<Option<sqlx::Transaction<'static, Sqlite>>>,
}

#[async_trait]
impl SqlExecutor for SqliteTransaction {
    async fn execute(&self, sql: &str, params: &[SqlParam]) -> Result<()> {
        let mut guard = self.inner.lock().await;
        let tx = guard.as_mut().ok_or_else(|| Error::internal("transaction already finished"))?;
        execute_on(&mut **tx, sql, params).await
    }

    async fn query_one(&self, sql: &str, params: &[SqlParam]) -> Result<Option<Arc<dyn SqlRow>>> {
        let mut guard = self.inner.lock().await;
        let tx = guard.as_mut().ok_or_else(|| Error::internal("transaction already finished"))?;
        query_one_on(&mut **tx, sql, params).await
    }

    async fn query_all(&self, sql: &str, params: &[SqlParam]) -> Result<Vec<Arc<dyn SqlRow>>> {
        let mut guard = self.inner.lock().await;
        let tx = guard.as_mut().ok_or_else(|| Error::internal("transaction already finished"))?;
        query_all_on(&mut **tx, sql, params).await
    }
}

#[async_trait]
impl DatabaseTransaction for SqliteTransaction {
    async fn commit(self: Box<Self>) -> Result<()> {
        let tx = self.inner.into_inner().ok_or_else(|| Error::internal("transaction already finished"))?;
        tx.commit().await.map_err(|e| map_sqlx_err("commit", e))
    }

    async fn rollback(self: Box<Self>) -> Result<()> {
        if let Some(tx) = self.inner.into_inner() {
            tx.rollback().await.map_err(|e| map_sqlx_err("rollback", e))?;
        }
        Ok(())
    }
}

/// SQLite-backed [`DatabaseExecutor`], wrapping a connection pool.
pub struct SqliteDatabaseExecutor {
    pool: SqlitePool,
}

impl SqliteDatabaseExecutor {
    #[must_use]
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SqlExecutor for SqliteDatabaseExecutor {
    async fn execute(&self, sql: &str, params: &[SqlParam]) -> Result<()> {
        execute_on(&self.pool, sql, params).await
    }

    async fn query_one(&self, sql: &str, params: &[SqlParam]) -> Result<Option<Arc<dyn SqlRow>>> {
        query_one_on(&self.pool, sql, params).await
    }

    async fn query_all(&self, sql: &str, params: &[SqlParam]) -> Result<Vec<Arc<dyn SqlRow>>> {
        query_all_on(&self.pool, sql, params).await
    }
}

#[async_trait]
impl DatabaseExecutor for SqliteDatabaseExecutor {
    async fn begin(&self) -> Result<Box<dyn DatabaseTransaction>> {
        let tx = self.pool.begin().await.map_err(|e| map_sqlx_err("begin transaction", e))?;
        Ok(Box::new(SqliteTransaction { inner: Mutex::new(Some(tx)) }))
    }
}

async fn apply_schema(pool: &SqlitePool) -> Result<()> {
    let schema = Schema::definition();
    for statement in SqliteSchemaDdlGenerator.generate_ddl(&schema) {
        sqlx::query(&statement).execute(pool).await.map_err(|e| map_sqlx_err("apply schema DDL", e))?;
    }
    Ok(())
}

/// Opens SQLite pools and applies the canonical [`Schema`]'s DDL, per §6's
/// persisted-state requirement. Repositories never open connections directly.
pub struct SqliteDatabaseProvider;

#[async_trait]
impl DatabaseProvider for SqliteDatabaseProvider {
    async fn connect(&self, path: &Path) -> Result<Arc<dyn DatabaseExecutor>> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| Error::internal_with_source("create db directory", e))?;
            }
        }
        let options = SqliteConnectOptions::new().filename(path).create_if_missing(true);
        let pool = SqlitePool::connect_with(options).await.map_err(|e| map_sqlx_err("connect", e))?;
        apply_schema(&pool).await?;
        toolgate_domain::info!("database", "SQLite database ready", &path.display().to_string());
        Ok(Arc::new(SqliteDatabaseExecutor::new(pool)))
    }

    async fn connect_in_memory(&self) -> Result<Arc<dyn DatabaseExecutor>> {
        let options = SqliteConnectOptions::new().filename(":memory:").create_if_missing(true);
        let pool = SqlitePool::connect_with(options).await.map_err(|e| map_sqlx_err("connect in-memory", e))?;
        apply_schema(&pool).await?;
        toolgate_domain::debug!("database", "In-memory SQLite database ready");
        Ok(Arc::new(SqliteDatabaseExecutor::new(pool)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn connects_in_memory_and_applies_schema() {
        let executor = SqliteDatabaseProvider.connect_in_memory().await.unwrap();
        executor
            .execute("INSERT INTO files (id, tenant_fingerprint, project, path, content, size_bytes, version, created_at, updated_at) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
                &[
                    SqlParam::String(uuid::Uuid::new_v4().to_string()),
                    SqlParam::String("a".repeat(64)),
                    SqlParam::String("proj".to_owned()),
                    SqlParam::String("/a.txt".to_owned()),
                    SqlParam::String("hello".to_owned()),
                    SqlParam::I64(5),
                    SqlParam::I64(1),
                    SqlParam::I64(0),
                    SqlParam::I64(0),
                ])
            .await
            .unwrap();

        let row = executor.query_one("SELECT path FROM files WHERE path = ?", &[SqlParam::String("/a.txt".to_owned())]).await.unwrap();
        assert!(row.is_some());
        assert_eq!(row.unwrap().try_get_string("path").unwrap(), Some("/a.txt".to_owned()));
    }

    #[tokio::test]
    async fn transaction_rolls_back_on_explicit_rollback() {
        let executor = SqliteDatabaseProvider.connect_in_memory().await.unwrap();
        let tx = executor.begin().await.unwrap();
        tx.execute("INSERT INTO files (id, tenant_fingerprint, project, path, content, size_bytes, version, created_at, updated_at) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
            &[
                SqlParam::String(uuid::Uuid::new_v4().to_string()),
                SqlParam::String("b".repeat(64)),
                SqlParam::String("proj".to_owned()),
                SqlParam::String("/b.txt".to_owned()),
                SqlParam::String("hi".to_owned()),
                SqlParam::I64(2),
                SqlParam::I64(1),
                SqlParam::I64(0),
                SqlParam::I64(0),
            ])
            .await
            .unwrap();
        tx.rollback().await.unwrap();

        let row = executor.query_one("SELECT path FROM files WHERE path = ?", &[SqlParam::String("/b.txt".to_owned())]).await.unwrap();
        assert!(row.is_none());
    }
}
