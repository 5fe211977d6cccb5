//! Shared row → domain-entity conversions for the repository implementations.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use toolgate_domain::error::{Error, Result};
use toolgate_domain::ports::infrastructure::SqlRow;
use toolgate_domain::value_objects::TenantFingerprint;

pub fn column_string(row: &Arc<dyn SqlRow>, name: &str) -> Result<String> {
    row.try_get_string(name)?.ok_or_else(|| Error::internal(format!("column {name} was NULL")))
}

pub fn column_i64(row: &Arc<dyn SqlRow>, name: &str) -> Result<i64> {
    row.try_get_i64(name)?.ok_or_else(|| Error::internal(format!("column {name} was NULL")))
}

pub fn column_u64(row: &Arc<dyn SqlRow>, name: &str) -> Result<u64> {
    Ok(column_i64(row, name)?.max(0) as u64)
}

pub fn column_timestamp(row: &Arc<dyn SqlRow>, name: &str) -> Result<DateTime<Utc>> {
    let secs = column_i64(row, name)?;
    DateTime::from_timestamp(secs, 0).ok_or_else(|| Error::internal(format!("column {name} is not a valid timestamp")))
}

pub fn column_timestamp_opt(row: &Arc<dyn SqlRow>, name: &str) -> Result<Option<DateTime<Utc>>> {
    match row.try_get_i64(name)? {
        Some(secs) => Ok(Some(
            DateTime::from_timestamp(secs, 0).ok_or_else(|| Error::internal(format!("column {name} is not a valid timestamp")))?,
        )),
        None => Ok(None),
    }
}

pub fn column_tenant(row: &Arc<dyn SqlRow>, name: &str) -> Result<TenantFingerprint> {
    TenantFingerprint::from_hex(&column_string(row, name)?)
}

pub fn timestamp(dt: DateTime<Utc>) -> i64 {
    dt.timestamp()
}
