use axum::{extract::State, Extension, Json};
use serde::Serialize;
use wftrack_db::{CollectionLogRow, CountryStatsRow, PlatformStatsRow, WorkflowRow};

use crate::middleware::RequestId;

use super::{map_db_error, ApiError, ApiResponse, AppState};

#[derive(Debug, Serialize)]
pub(super) struct StatsData {
    total_workflows: i64,
    platforms: Vec<PlatformStatsRow>,
    countries: Vec<CountryStatsRow>,
    top_workflows: Vec<TopWorkflowItem>,
    recent_collections: Vec<CollectionLogRow>,
}

#[derive(Debug, Serialize)]
pub(super) struct TopWorkflowItem {
    workflow: String,
    platform: String,
    country: String,
    engagement_score: f64,
}

impl From<WorkflowRow> for TopWorkflowItem {
    fn from(row: WorkflowRow) -> Self {
        Self {
            workflow: row.name,
            platform: row.platform,
            country: row.country,
            engagement_score: row.engagement_score,
        }
    }
}

pub(super) async fn get_stats(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Result<Json<ApiResponse<StatsData>>, ApiError> {
    let stats = wftrack_db::get_stats(&state.pool)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    Ok(ApiResponse::ok(
        req_id.0,
        StatsData {
            total_workflows: stats.total_workflows,
            platforms: stats.platforms,
            countries: stats.countries,
            top_workflows: stats
                .top_workflows
                .into_iter()
                .map(TopWorkflowItem::from)
                .collect(),
            recent_collections: stats.recent_collections,
        },
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::workflows::tests::row;

    #[test]
    fn top_workflow_item_keeps_only_summary_fields() {
        let item = TopWorkflowItem::from(row("YouTube"));
        let json = serde_json::to_value(&item).expect("serialize");
        assert_eq!(json.as_object().map(serde_json::Map::len), Some(4));
        assert_eq!(json["platform"], "YouTube");
        assert!((json["engagement_score"].as_f64().unwrap() - 22.1).abs() < 1e-9);
    }
}
