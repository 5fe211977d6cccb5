//! SQLite implementation of [`TurnGuardRepository`] (C6 idempotency table).

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;

use toolgate_domain::entities::TurnGuard;
use toolgate_domain::error::{Error, Result};
use toolgate_domain::ports::infrastructure::{DatabaseExecutor, SqlParam, SqlRow};
use toolgate_domain::ports::TurnGuardRepository;
use toolgate_domain::value_objects::{TenantFingerprint, TurnGuardId, TurnGuardStatus};

use super::convert::{column_string, column_tenant, column_timestamp};

fn status_to_str(status: TurnGuardStatus) -> &'static str {
    match status {
        TurnGuardStatus::Processing => "processing",
        TurnGuardStatus::Done => "done",
    }
}

fn status_from_str(s: &str) -> Result<TurnGuardStatus> {
    match s {
        "processing" => Ok(TurnGuardStatus::Processing),
        "done" => Ok(TurnGuardStatus::Done),
        other => Err(Error::internal(format!("unknown turn guard status: {other}"))),
    }
}

fn row_to_guard(row: &Arc<dyn SqlRow>) -> Result<TurnGuard> {
    Ok(TurnGuard {
        id: TurnGuardId::from_string(&column_string(row, "id")?),
        tenant: column_tenant(row, "tenant_fingerprint")?,
        project: column_string(row, "project")?,
        session_id: column_string(row, "session_id")?,
        turn_id: column_string(row, "turn_id")?,
        status: status_from_str(&column_string(row, "status")?)?,
        result_json: row.try_get_string("result_json")?,
        created_at: column_timestamp(row, "created_at")?,
        updated_at: column_timestamp(row, "updated_at")?,
    })
}

/// SQLite-backed [`TurnGuardRepository`].
pub struct SqliteTurnGuardRepository {
    db: Arc<dyn DatabaseExecutor>,
}

impl SqliteTurnGuardRepository {
    #[must_use]
    pub fn new(db: Arc<dyn DatabaseExecutor>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl TurnGuardRepository for SqliteTurnGuardRepository {
    async fn find(&self, tenant: &TenantFingerprint, project: &str, session_id: &str, turn_id: &str) -> Result<Option<TurnGuard>> {
        let row = self
            .db
            .query_one(
                "SELECT * FROM turn_guards WHERE tenant_fingerprint = ? AND project = ? AND session_id = ? AND turn_id = ?",
                &[
                    SqlParam::String(tenant.as_str().to_owned()),
                    SqlParam::String(project.to_owned()),
                    SqlParam::String(session_id.to_owned()),
                    SqlParam::String(turn_id.to_owned()),
                ],
            )
            .await?;
        row.as_ref().map(row_to_guard).transpose()
    }

    async fn start(&self, guard: &TurnGuard) -> Result<()> {
        let existing = self.find(&guard.tenant, &guard.project, &guard.session_id, &guard.turn_id).await?;
        if existing.is_some() {
            return Err(Error::AlreadyExists { path: format!("{}/{}/{}", guard.project, guard.session_id, guard.turn_id) });
        }
        self.db
            .execute(
                "INSERT INTO turn_guards (id, tenant_fingerprint, project, session_id, turn_id, status, result_json, created_at, updated_at)
                 VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
                &[
                    SqlParam::String(guard.id.as_str()),
                    SqlParam::String(guard.tenant.as_str().to_owned()),
                    SqlParam::String(guard.project.clone()),
                    SqlParam::String(guard.session_id.clone()),
                    SqlParam::String(guard.turn_id.clone()),
                    SqlParam::String(status_to_str(guard.status).to_owned()),
                    guard.result_json.clone().into(),
                    SqlParam::I64(guard.created_at.timestamp()),
                    SqlParam::I64(guard.updated_at.timestamp()),
                ],
            )
            .await
    }

    async fn complete(&self, id: TurnGuardId, result_json: &str) -> Result<()> {
        self.db
            .execute(
                "UPDATE turn_guards SET status = 'done', result_json = ?, updated_at = ? WHERE id = ?",
                &[SqlParam::String(result_json.to_owned()), SqlParam::I64(Utc::now().timestamp()), SqlParam::String(id.as_str())],
            )
            .await
    }

    async fn reclaim(&self, id: TurnGuardId) -> Result<()> {
        self.db
            .execute(
                "UPDATE turn_guards SET status = 'processing', result_json = NULL, updated_at = ? WHERE id = ?",
                &[SqlParam::I64(Utc::now().timestamp()), SqlParam::String(id.as_str())],
            )
            .await
    }
}
