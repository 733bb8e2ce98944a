use axum::{
    extract::{Query, State},
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use wftrack_db::CollectionLogRow;

use crate::middleware::RequestId;

use super::{map_db_error, ApiError, ApiResponse, AppState};

const DEFAULT_LOG_LIMIT: i64 = 20;
const MAX_LOG_LIMIT: i64 = 200;

#[derive(Debug, Deserialize)]
pub(super) struct CollectionsQuery {
    pub limit: Option<i64>,
}

#[derive(Debug, Serialize)]
pub(super) struct CollectionList {
    count: usize,
    collections: Vec<CollectionLogRow>,
}

fn normalize_log_limit(limit: Option<i64>) -> i64 {
    limit.unwrap_or(DEFAULT_LOG_LIMIT).clamp(1, MAX_LOG_LIMIT)
}

/// Recent run-log entries, newest first.
pub(super) async fn list_collections(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<CollectionsQuery>,
) -> Result<Json<ApiResponse<CollectionList>>, ApiError> {
    let collections =
        wftrack_db::list_collection_logs(&state.pool, normalize_log_limit(query.limit))
            .await
            .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    Ok(ApiResponse::ok(
        req_id.0,
        CollectionList {
            count: collections.len(),
            collections,
        },
    ))
}
