//! Aggregate queries backing the stats endpoint.

use serde::Serialize;
use sqlx::PgPool;

use crate::collection_logs::{list_collection_logs, CollectionLogRow};
use crate::workflows::{list_workflows, WorkflowFilter, WorkflowRow, WorkflowSort};
use crate::DbError;

pub const TOP_WORKFLOWS_LIMIT: i64 = 10;
pub const RECENT_LOGS_LIMIT: i64 = 5;

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct PlatformStatsRow {
    pub platform: String,
    pub count: i64,
    /// `AVG` over an empty group is `NULL`; a platform only appears here when
    /// it has rows, so this is `Some` in practice.
    pub avg_engagement: Option<f64>,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct CountryStatsRow {
    pub country: String,
    pub count: i64,
}

/// Everything `GET /api/stats` reports.
#[derive(Debug, Clone)]
pub struct WorkflowStats {
    pub total_workflows: i64,
    pub platforms: Vec<PlatformStatsRow>,
    pub countries: Vec<CountryStatsRow>,
    pub top_workflows: Vec<WorkflowRow>,
    pub recent_collections: Vec<CollectionLogRow>,
}

/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn count_workflows(pool: &PgPool) -> Result<i64, DbError> {
    let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM workflows")
        .fetch_one(pool)
        .await?;
    Ok(total)
}

/// Row count and mean engagement per platform, largest platform first.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_platform_stats(pool: &PgPool) -> Result<Vec<PlatformStatsRow>, DbError> {
    let rows = sqlx::query_as::<_, PlatformStatsRow>(
        "SELECT platform, COUNT(*) AS count, AVG(engagement_score) AS avg_engagement \
         FROM workflows \
         GROUP BY platform \
         ORDER BY count DESC, platform ASC",
    )
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// Row count per country, largest first.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_country_stats(pool: &PgPool) -> Result<Vec<CountryStatsRow>, DbError> {
    let rows = sqlx::query_as::<_, CountryStatsRow>(
        "SELECT country, COUNT(*) AS count \
         FROM workflows \
         GROUP BY country \
         ORDER BY count DESC, country ASC",
    )
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_top_workflows(pool: &PgPool, limit: i64) -> Result<Vec<WorkflowRow>, DbError> {
    let page = list_workflows(
        pool,
        &WorkflowFilter::default(),
        WorkflowSort::Engagement,
        limit,
        0,
    )
    .await?;
    Ok(page.rows)
}

/// Gather the full stats snapshot. The individual reads are not wrapped in a
/// transaction; a collection running concurrently may skew totals slightly.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if any of the underlying queries fail.
pub async fn get_stats(pool: &PgPool) -> Result<WorkflowStats, DbError> {
    Ok(WorkflowStats {
        total_workflows: count_workflows(pool).await?,
        platforms: list_platform_stats(pool).await?,
        countries: list_country_stats(pool).await?,
        top_workflows: list_top_workflows(pool, TOP_WORKFLOWS_LIMIT).await?,
        recent_collections: list_collection_logs(pool, RECENT_LOGS_LIMIT).await?,
    })
}
