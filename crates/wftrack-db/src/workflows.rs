//! Database operations for the `workflows` table.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;
use wftrack_core::{IdentityKey, Platform, ViewRatios, WorkflowMetrics, WorkflowRecord};

use crate::DbError;

pub const DEFAULT_LIST_LIMIT: i64 = 100;
pub const MAX_LIST_LIMIT: i64 = 500;

const WORKFLOW_COLUMNS: &str = "id, public_id, name, platform, country, views, likes, comments, \
     replies, contributors, search_volume, trend_score, trend_change, like_to_view, \
     comment_to_view, reply_to_view, engagement_score, source_url, related_queries, \
     created_at, last_updated";

// ---------------------------------------------------------------------------
// Row types
// ---------------------------------------------------------------------------

/// A row from the `workflows` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct WorkflowRow {
    pub id: i64,
    pub public_id: Uuid,
    pub name: String,
    pub platform: String,
    pub country: String,
    pub views: i64,
    pub likes: i64,
    pub comments: i64,
    pub replies: i64,
    pub contributors: i64,
    pub search_volume: i64,
    pub trend_score: i32,
    pub trend_change: f64,
    pub like_to_view: f64,
    pub comment_to_view: f64,
    pub reply_to_view: f64,
    pub engagement_score: f64,
    pub source_url: Option<String>,
    pub related_queries: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub last_updated: DateTime<Utc>,
}

impl WorkflowRow {
    /// Convert into the domain record.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::UnknownPlatform`] if the stored label is not recognized.
    pub fn into_record(self) -> Result<WorkflowRecord, DbError> {
        let platform =
            Platform::from_label(&self.platform).ok_or(DbError::UnknownPlatform(self.platform))?;

        Ok(WorkflowRecord {
            key: IdentityKey {
                name: self.name,
                platform,
                country: self.country,
            },
            metrics: WorkflowMetrics {
                views: self.views,
                likes: self.likes,
                comments: self.comments,
                replies: self.replies,
                contributors: self.contributors,
                search_volume: self.search_volume,
                trend_score: self.trend_score,
                trend_change: self.trend_change,
            },
            ratios: ViewRatios {
                like_to_view: self.like_to_view,
                comment_to_view: self.comment_to_view,
                reply_to_view: self.reply_to_view,
            },
            engagement_score: self.engagement_score,
            source_url: self.source_url,
            related_queries: self.related_queries,
            created_at: self.created_at,
            last_updated: self.last_updated,
        })
    }
}

/// Result of [`upsert_workflow`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::FromRow)]
pub struct UpsertedWorkflow {
    pub id: i64,
    pub public_id: Uuid,
    /// `true` when the identity key was new, `false` when an existing row was updated.
    pub inserted: bool,
}

// ---------------------------------------------------------------------------
// Writes
// ---------------------------------------------------------------------------

/// Insert or update one workflow keyed on `(name, platform, country)`.
///
/// The conflict branch refreshes every metric, the score and `last_updated`,
/// and never touches `created_at` or `public_id`. The statement is atomic per
/// record, so two concurrent upserts of the same key still leave one row.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the statement fails.
pub async fn upsert_workflow(
    pool: &PgPool,
    record: &WorkflowRecord,
) -> Result<UpsertedWorkflow, DbError> {
    let row = sqlx::query_as::<_, UpsertedWorkflow>(
        "INSERT INTO workflows \
             (public_id, name, platform, country, views, likes, comments, replies, \
              contributors, search_volume, trend_score, trend_change, like_to_view, \
              comment_to_view, reply_to_view, engagement_score, source_url, related_queries, \
              created_at, last_updated) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, \
                 $18, $19, $20) \
         ON CONFLICT (name, platform, country) DO UPDATE SET \
             views = EXCLUDED.views, \
             likes = EXCLUDED.likes, \
             comments = EXCLUDED.comments, \
             replies = EXCLUDED.replies, \
             contributors = EXCLUDED.contributors, \
             search_volume = EXCLUDED.search_volume, \
             trend_score = EXCLUDED.trend_score, \
             trend_change = EXCLUDED.trend_change, \
             like_to_view = EXCLUDED.like_to_view, \
             comment_to_view = EXCLUDED.comment_to_view, \
             reply_to_view = EXCLUDED.reply_to_view, \
             engagement_score = EXCLUDED.engagement_score, \
             source_url = EXCLUDED.source_url, \
             related_queries = EXCLUDED.related_queries, \
             last_updated = EXCLUDED.last_updated \
         RETURNING id, public_id, (xmax = 0) AS inserted",
    )
    .bind(Uuid::new_v4())
    .bind(&record.key.name)
    .bind(record.key.platform.label())
    .bind(&record.key.country)
    .bind(record.metrics.views)
    .bind(record.metrics.likes)
    .bind(record.metrics.comments)
    .bind(record.metrics.replies)
    .bind(record.metrics.contributors)
    .bind(record.metrics.search_volume)
    .bind(record.metrics.trend_score)
    .bind(record.metrics.trend_change)
    .bind(record.ratios.like_to_view)
    .bind(record.ratios.comment_to_view)
    .bind(record.ratios.reply_to_view)
    .bind(record.engagement_score)
    .bind(record.source_url.as_deref())
    .bind(record.related_queries.as_slice())
    .bind(record.created_at)
    .bind(record.last_updated)
    .fetch_one(pool)
    .await?;

    Ok(row)
}

// ---------------------------------------------------------------------------
// Reads
// ---------------------------------------------------------------------------

/// Fetch a workflow by exact, case-sensitive identity key.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn get_workflow(pool: &PgPool, key: &IdentityKey) -> Result<Option<WorkflowRow>, DbError> {
    let row = sqlx::query_as::<_, WorkflowRow>(&format!(
        "SELECT {WORKFLOW_COLUMNS} FROM workflows \
         WHERE name = $1 AND platform = $2 AND country = $3"
    ))
    .bind(&key.name)
    .bind(key.platform.label())
    .bind(&key.country)
    .fetch_optional(pool)
    .await?;

    Ok(row)
}

/// Ordering for [`list_workflows`]. Always descending.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum WorkflowSort {
    #[default]
    Engagement,
    Views,
    Likes,
    Recent,
}

impl WorkflowSort {
    /// Parse a sort key; unknown or absent keys fall back to `Engagement`.
    #[must_use]
    pub fn parse_lenient(raw: Option<&str>) -> Self {
        match raw.map(|s| s.trim().to_ascii_lowercase()).as_deref() {
            Some("views") => Self::Views,
            Some("likes") => Self::Likes,
            Some("recent") => Self::Recent,
            _ => Self::Engagement,
        }
    }

    fn column(self) -> &'static str {
        match self {
            Self::Engagement => "engagement_score",
            Self::Views => "views",
            Self::Likes => "likes",
            Self::Recent => "last_updated",
        }
    }
}

/// Exact-match filters for [`list_workflows`]. `None` means unfiltered.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WorkflowFilter {
    /// Stored platform label, e.g. `"YouTube"`.
    pub platform: Option<String>,
    pub country: Option<String>,
}

impl WorkflowFilter {
    /// Build a filter from query-string values.
    ///
    /// Blank values and `"all"` mean no filter. Platform request keys
    /// (`youtube`, `forum`, `google`) are mapped to their stored label; any
    /// other platform string is matched verbatim.
    #[must_use]
    pub fn from_params(platform: Option<&str>, country: Option<&str>) -> Self {
        let active = |v: Option<&str>| -> Option<String> {
            v.map(str::trim)
                .filter(|s| !s.is_empty() && !s.eq_ignore_ascii_case("all"))
                .map(ToOwned::to_owned)
        };

        Self {
            platform: active(platform).map(|p| match p.parse::<Platform>() {
                Ok(known) => known.label().to_string(),
                Err(_) => p,
            }),
            country: active(country),
        }
    }
}

/// One page of [`list_workflows`] along with the unpaged match count.
#[derive(Debug, Clone)]
pub struct WorkflowPage {
    pub rows: Vec<WorkflowRow>,
    pub total: i64,
}

/// Clamp a requested page size into `1..=MAX_LIST_LIMIT`, defaulting to
/// [`DEFAULT_LIST_LIMIT`].
#[must_use]
pub fn clamp_limit(requested: Option<i64>) -> i64 {
    requested
        .unwrap_or(DEFAULT_LIST_LIMIT)
        .clamp(1, MAX_LIST_LIMIT)
}

/// List workflows matching `filter`, sorted descending by `sort` with ties
/// broken by `id DESC`.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if either query fails.
pub async fn list_workflows(
    pool: &PgPool,
    filter: &WorkflowFilter,
    sort: WorkflowSort,
    limit: i64,
    offset: i64,
) -> Result<WorkflowPage, DbError> {
    let rows = sqlx::query_as::<_, WorkflowRow>(&format!(
        "SELECT {WORKFLOW_COLUMNS} FROM workflows \
         WHERE ($1::text IS NULL OR platform = $1) \
           AND ($2::text IS NULL OR country = $2) \
         ORDER BY {} DESC, id DESC \
         LIMIT $3 OFFSET $4",
        sort.column()
    ))
    .bind(filter.platform.as_deref())
    .bind(filter.country.as_deref())
    .bind(clamp_limit(Some(limit)))
    .bind(offset.max(0))
    .fetch_all(pool)
    .await?;

    let total: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM workflows \
         WHERE ($1::text IS NULL OR platform = $1) \
           AND ($2::text IS NULL OR country = $2)",
    )
    .bind(filter.platform.as_deref())
    .bind(filter.country.as_deref())
    .fetch_one(pool)
    .await?;

    Ok(WorkflowPage { rows, total })
}
