use axum::{body::Bytes, extract::State, Extension, Json};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use wftrack_collect::{run_collection, CollectionRequest, PlatformOutcome, RunSummary};

use crate::middleware::RequestId;

use super::{ApiError, ApiResponse, AppState};

/// Body of `POST /api/collect`. Both lists are optional.
#[derive(Debug, Default, Deserialize)]
pub(super) struct CollectBody {
    #[serde(default)]
    pub platforms: Vec<String>,
    #[serde(default)]
    pub countries: Vec<String>,
}

#[derive(Debug, Serialize)]
pub(super) struct CollectData {
    started_at: DateTime<Utc>,
    finished_at: DateTime<Utc>,
    workflows_found: u32,
    collections: Vec<PlatformOutcome>,
}

impl From<RunSummary> for CollectData {
    fn from(summary: RunSummary) -> Self {
        Self {
            started_at: summary.started_at,
            finished_at: summary.finished_at,
            workflows_found: summary.workflows_found(),
            collections: summary.platforms,
        }
    }
}

/// An empty body means "all platforms, default countries".
pub(super) fn parse_collect_body(
    request_id: &str,
    body: &[u8],
) -> Result<CollectionRequest, ApiError> {
    let parsed: CollectBody = if body.iter().all(u8::is_ascii_whitespace) {
        CollectBody::default()
    } else {
        serde_json::from_slice(body).map_err(|e| {
            ApiError::new(request_id, "bad_request", format!("invalid request body: {e}"))
        })?
    };

    CollectionRequest::parse(&parsed.platforms, &parsed.countries)
        .map_err(|e| ApiError::new(request_id, "validation_error", e.to_string()))
}

/// Run a collection synchronously and report per-platform outcomes.
///
/// Adapter failures do not fail the request; they appear in the matching
/// `collections` entry.
pub(super) async fn trigger_collection(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    body: Bytes,
) -> Result<Json<ApiResponse<CollectData>>, ApiError> {
    let request = parse_collect_body(&req_id.0, &body)?;

    tracing::info!(
        platforms = ?request.platforms,
        countries = ?request.countries,
        "manual collection triggered"
    );

    let summary = run_collection(&state.pool, &state.sources, &request, &state.pipeline).await;

    Ok(ApiResponse::ok(req_id.0, CollectData::from(summary)))
}

#[cfg(test)]
mod tests {
    use wftrack_core::Platform;

    use super::*;

    #[test]
    fn empty_body_uses_defaults() {
        let request = parse_collect_body("r", b"").expect("defaults");
        assert_eq!(request.platforms, Platform::ALL.to_vec());
        assert_eq!(request.countries, vec!["US".to_string(), "IN".to_string()]);

        let request = parse_collect_body("r", b"{}").expect("defaults");
        assert_eq!(request.platforms.len(), 3);
    }

    #[test]
    fn body_selects_platforms_and_countries() {
        let request =
            parse_collect_body("r", br#"{"platforms":["forum"],"countries":["GB"]}"#).unwrap();
        assert_eq!(request.platforms, vec![Platform::Forum]);
        assert_eq!(request.countries, vec!["GB".to_string()]);
    }

    #[test]
    fn unknown_platform_is_a_validation_error() {
        let err = parse_collect_body("r", br#"{"platforms":["tiktok"]}"#).unwrap_err();
        assert_eq!(err.code, "validation_error");
        assert!(err.error.contains("tiktok"));
    }

    #[test]
    fn malformed_json_is_a_bad_request() {
        let err = parse_collect_body("r", b"{not json").unwrap_err();
        assert_eq!(err.code, "bad_request");
        assert!(!err.success);
    }
}
