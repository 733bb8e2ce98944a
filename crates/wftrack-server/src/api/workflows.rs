use axum::{
    extract::{Query, State},
    Extension, Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use wftrack_core::Platform;
use wftrack_db::{clamp_limit, WorkflowFilter, WorkflowRow, WorkflowSort};

use crate::middleware::RequestId;

use super::{map_db_error, round_to, ApiError, ApiResponse, AppState};

#[derive(Debug, Deserialize)]
pub(super) struct WorkflowsQuery {
    pub platform: Option<String>,
    pub country: Option<String>,
    pub sort: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

#[derive(Debug, Serialize)]
pub(super) struct WorkflowList {
    total: i64,
    count: usize,
    workflows: Vec<WorkflowItem>,
}

#[derive(Debug, Serialize)]
pub(super) struct WorkflowItem {
    id: Uuid,
    workflow: String,
    platform: String,
    country: String,
    popularity_metrics: PopularityMetrics,
    engagement_score: f64,
    source_url: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    related_queries: Vec<String>,
    created_at: DateTime<Utc>,
    last_updated: DateTime<Utc>,
}

/// Metrics relevant to the row's platform only.
#[derive(Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub(super) enum PopularityMetrics {
    Video {
        views: i64,
        likes: i64,
        comments: i64,
        like_to_view_ratio: f64,
        comment_to_view_ratio: f64,
    },
    Forum {
        views: i64,
        replies: i64,
        likes: i64,
        contributors: i64,
    },
    Trends {
        search_volume: i64,
        trend_score: i32,
        trend_change: f64,
    },
    Unknown {},
}

impl PopularityMetrics {
    fn from_row(row: &WorkflowRow) -> Self {
        match Platform::from_label(&row.platform) {
            Some(Platform::VideoPlatform) => Self::Video {
                views: row.views,
                likes: row.likes,
                comments: row.comments,
                like_to_view_ratio: round_to(row.like_to_view, 4),
                comment_to_view_ratio: round_to(row.comment_to_view, 4),
            },
            Some(Platform::Forum) => Self::Forum {
                views: row.views,
                replies: row.replies,
                likes: row.likes,
                contributors: row.contributors,
            },
            Some(Platform::TrendsService) => Self::Trends {
                search_volume: row.search_volume,
                trend_score: row.trend_score,
                trend_change: round_to(row.trend_change, 2),
            },
            None => {
                tracing::warn!(platform = %row.platform, id = row.id, "unknown platform label");
                Self::Unknown {}
            }
        }
    }
}

impl From<WorkflowRow> for WorkflowItem {
    fn from(row: WorkflowRow) -> Self {
        let popularity_metrics = PopularityMetrics::from_row(&row);
        Self {
            id: row.public_id,
            workflow: row.name,
            platform: row.platform,
            country: row.country,
            popularity_metrics,
            engagement_score: row.engagement_score,
            source_url: row.source_url,
            related_queries: row.related_queries,
            created_at: row.created_at,
            last_updated: row.last_updated,
        }
    }
}

pub(super) async fn list_workflows(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<WorkflowsQuery>,
) -> Result<Json<ApiResponse<WorkflowList>>, ApiError> {
    let filter = WorkflowFilter::from_params(query.platform.as_deref(), query.country.as_deref());
    let sort = WorkflowSort::parse_lenient(query.sort.as_deref());
    let limit = clamp_limit(query.limit);
    let offset = query.offset.unwrap_or(0).max(0);

    let page = wftrack_db::list_workflows(&state.pool, &filter, sort, limit, offset)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    let workflows: Vec<WorkflowItem> = page.rows.into_iter().map(WorkflowItem::from).collect();

    Ok(ApiResponse::ok(
        req_id.0,
        WorkflowList {
            total: page.total,
            count: workflows.len(),
            workflows,
        },
    ))
}

#[cfg(test)]
pub(super) mod tests {
    use super::*;

    pub(crate) fn row(platform: &str) -> WorkflowRow {
        let now = Utc::now();
        WorkflowRow {
            id: 7,
            public_id: Uuid::new_v4(),
            name: "Slack to Notion".to_string(),
            platform: platform.to_string(),
            country: "US".to_string(),
            views: 1000,
            likes: 50,
            comments: 10,
            replies: 4,
            contributors: 2,
            search_volume: 12_000,
            trend_score: 64,
            trend_change: 12.3456,
            like_to_view: 0.123_456,
            comment_to_view: 0.01,
            reply_to_view: 0.004,
            engagement_score: 22.1,
            source_url: Some("https://example.com/w".to_string()),
            related_queries: Vec::new(),
            created_at: now,
            last_updated: now,
        }
    }

    #[test]
    fn video_metrics_round_ratios_to_four_places() {
        assert_eq!(
            PopularityMetrics::from_row(&row("YouTube")),
            PopularityMetrics::Video {
                views: 1000,
                likes: 50,
                comments: 10,
                like_to_view_ratio: 0.1235,
                comment_to_view_ratio: 0.01,
            }
        );
    }

    #[test]
    fn trends_metrics_round_change_to_two_places() {
        let PopularityMetrics::Trends { trend_change, .. } =
            PopularityMetrics::from_row(&row("Google Trends"))
        else {
            panic!("expected trends metrics");
        };
        assert!((trend_change - 12.35).abs() < 1e-9);
    }

    #[test]
    fn forum_metrics_omit_ratios() {
        let item = WorkflowItem::from(row("Forum"));
        let json = serde_json::to_value(&item).expect("serialize");
        let metrics = json["popularity_metrics"].as_object().expect("object");
        assert_eq!(metrics.len(), 4);
        assert_eq!(metrics["replies"], 4);
        assert_eq!(json["workflow"], "Slack to Notion");
        assert!(json.get("related_queries").is_none());
    }

    #[test]
    fn unknown_platform_serializes_empty_metrics() {
        let item = WorkflowItem::from(row("Myspace"));
        let json = serde_json::to_value(&item).expect("serialize");
        assert_eq!(json["popularity_metrics"], serde_json::json!({}));
    }
}
