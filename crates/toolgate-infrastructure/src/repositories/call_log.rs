//! SQLite implementation of [`CallLogRepository`] (C7 per-invocation audit trail).

use std::sync::Arc;

use async_trait::async_trait;

use toolgate_domain::entities::CallLogEntry;
use toolgate_domain::error::Result;
use toolgate_domain::ports::infrastructure::{DatabaseExecutor, SqlParam, SqlRow};
use toolgate_domain::ports::CallLogRepository;
use toolgate_domain::value_objects::{CallLogId, TenantFingerprint};

use super::convert::{column_i64, column_string, column_tenant, column_timestamp, column_u64};

fn row_to_entry(row: &Arc<dyn SqlRow>) -> Result<CallLogEntry> {
    Ok(CallLogEntry {
        id: CallLogId::from_string(&column_string(row, "id")?),
        tenant: column_tenant(row, "tenant_fingerprint")?,
        project: row.try_get_string("project")?,
        tool_name: column_string(row, "tool_name")?,
        redacted_params: serde_json::from_str(&column_string(row, "redacted_params_json")?)?,
        error_code: row.try_get_string("error_code")?,
        ok: column_i64(row, "ok")? != 0,
        duration_ms: column_u64(row, "duration_ms")?,
        created_at: column_timestamp(row, "created_at")?,
    })
}

/// SQLite-backed [`CallLogRepository`].
pub struct SqliteCallLogRepository {
    db: Arc<dyn DatabaseExecutor>,
}

impl SqliteCallLogRepository {
    #[must_use]
    pub fn new(db: Arc<dyn DatabaseExecutor>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl CallLogRepository for SqliteCallLogRepository {
    async fn insert(&self, entry: &CallLogEntry) -> Result<()> {
        let redacted_params_json = serde_json::to_string(&entry.redacted_params)?;
        self.db
            .execute(
                "INSERT INTO call_log_entries (id, tenant_fingerprint, project, tool_name, redacted_params_json, error_code, ok, duration_ms, created_at)
                 VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
                &[
                    SqlParam::String(entry.id.as_str()),
                    SqlParam::String(entry.tenant.as_str().to_owned()),
                    entry.project.clone().into(),
                    SqlParam::String(entry.tool_name.clone()),
                    SqlParam::String(redacted_params_json),
                    entry.error_code.clone().into(),
                    SqlParam::Bool(entry.ok),
                    SqlParam::I64(entry.duration_ms as i64),
                    SqlParam::I64(entry.created_at.timestamp()),
                ],
            )
            .await
    }

    async fn recent_for_tenant(&self, tenant: &TenantFingerprint, limit: usize) -> Result<Vec<CallLogEntry>> {
        let rows = self
            .db
            .query_all(
                "SELECT * FROM call_log_entries WHERE tenant_fingerprint = ? ORDER BY created_at DESC LIMIT ?",
                &[SqlParam::String(tenant.as_str().to_owned()), SqlParam::I64(limit as i64)],
            )
            .await?;
        rows.iter().map(row_to_entry).collect()
    }
}
