//! Database operations for the append-only `collection_logs` table.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::PgPool;
use wftrack_core::NewRunLog;

use crate::DbError;

/// A row from the `collection_logs` table.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct CollectionLogRow {
    pub id: i64,
    pub platform: String,
    /// The schema defines this as `INTEGER NOT NULL DEFAULT 0`.
    pub workflows_found: i32,
    pub status: String,
    pub error_message: Option<String>,
    pub timestamp: DateTime<Utc>,
}

/// Append one run-log entry and return its generated id.
///
/// # Errors
///
/// Returns [`DbError::InvalidValue`] if the item count does not fit the
/// column, or [`DbError::Sqlx`] if the insert fails.
pub async fn insert_collection_log(pool: &PgPool, log: &NewRunLog) -> Result<i64, DbError> {
    let workflows_found =
        i32::try_from(log.workflows_found).map_err(|_| DbError::InvalidValue {
            field: "workflows_found",
            value: i64::from(log.workflows_found),
        })?;

    let id: i64 = sqlx::query_scalar(
        "INSERT INTO collection_logs (platform, workflows_found, status, error_message, timestamp) \
         VALUES ($1, $2, $3, $4, $5) \
         RETURNING id",
    )
    .bind(log.platform.label())
    .bind(workflows_found)
    .bind(log.status.as_str())
    .bind(log.error_message.as_deref())
    .bind(log.timestamp)
    .fetch_one(pool)
    .await?;

    Ok(id)
}

/// List the most recent run-log entries, newest first.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_collection_logs(
    pool: &PgPool,
    limit: i64,
) -> Result<Vec<CollectionLogRow>, DbError> {
    let rows = sqlx::query_as::<_, CollectionLogRow>(
        "SELECT id, platform, workflows_found, status, error_message, timestamp \
         FROM collection_logs \
         ORDER BY timestamp DESC, id DESC \
         LIMIT $1",
    )
    .bind(limit.max(1))
    .fetch_all(pool)
    .await?;

    Ok(rows)
}
