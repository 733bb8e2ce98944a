//! Raw and canonical workflow shapes, plus the mapping between them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::platform::Platform;
use crate::scoring::engagement_score;
use crate::ValidationError;

/// Country stored for observations that carry no geography.
pub const GLOBAL_COUNTRY: &str = "Global";

/// Workflow names longer than this are truncated (in characters, not bytes).
pub const MAX_NAME_CHARS: usize = 200;

/// One observation as handed over by a source adapter.
///
/// Every metric is optional because each platform only reports a subset;
/// absent metrics are treated as zero during normalization.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawWorkflowData {
    pub workflow_name: String,
    /// Platform label or request key, e.g. `"YouTube"` or `"youtube"`.
    pub platform: String,
    pub country: Option<String>,
    pub views: Option<i64>,
    pub likes: Option<i64>,
    pub comments: Option<i64>,
    pub replies: Option<i64>,
    pub contributors: Option<i64>,
    pub search_volume: Option<i64>,
    pub trend_score: Option<i32>,
    /// Percent change of search interest; negative values mean decline.
    pub trend_change: Option<f64>,
    pub source_url: Option<String>,
    pub related_queries: Vec<String>,
}

/// The canonical metric set shared by every platform.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct WorkflowMetrics {
    pub views: i64,
    pub likes: i64,
    pub comments: i64,
    pub replies: i64,
    pub contributors: i64,
    pub search_volume: i64,
    pub trend_score: i32,
    pub trend_change: f64,
}

/// Per-view engagement ratios. Each is in `[0, 1]` when `views > 0`, else `0`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ViewRatios {
    pub like_to_view: f64,
    pub comment_to_view: f64,
    pub reply_to_view: f64,
}

impl ViewRatios {
    #[must_use]
    pub fn from_metrics(metrics: &WorkflowMetrics) -> Self {
        Self {
            like_to_view: per_view(metrics.likes, metrics.views),
            comment_to_view: per_view(metrics.comments, metrics.views),
            reply_to_view: per_view(metrics.replies, metrics.views),
        }
    }
}

#[allow(clippy::cast_precision_loss)]
fn per_view(count: i64, views: i64) -> f64 {
    if views <= 0 {
        return 0.0;
    }
    (count as f64 / views as f64).clamp(0.0, 1.0)
}

/// The `(name, platform, country)` triple that identifies a stored workflow.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IdentityKey {
    pub name: String,
    pub platform: Platform,
    pub country: String,
}

/// A raw observation mapped onto the canonical schema and scored, but not yet
/// reconciled against storage.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedWorkflow {
    pub key: IdentityKey,
    pub metrics: WorkflowMetrics,
    pub ratios: ViewRatios,
    pub engagement_score: f64,
    pub source_url: Option<String>,
    pub related_queries: Vec<String>,
}

/// A reconciled workflow as it is persisted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WorkflowRecord {
    pub key: IdentityKey,
    pub metrics: WorkflowMetrics,
    pub ratios: ViewRatios,
    pub engagement_score: f64,
    pub source_url: Option<String>,
    pub related_queries: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub last_updated: DateTime<Utc>,
}

/// Map a raw adapter record onto the canonical schema and compute its score.
///
/// The score is always derived from the metrics carried by `raw`, never from
/// anything previously stored.
///
/// # Errors
///
/// Returns [`ValidationError`] when the name is blank, the platform label is
/// unknown, a count metric is negative, or `trend_change` is not finite.
pub fn normalize(raw: &RawWorkflowData) -> Result<NormalizedWorkflow, ValidationError> {
    let name = truncate_chars(raw.workflow_name.trim(), MAX_NAME_CHARS);
    if name.is_empty() {
        return Err(ValidationError::EmptyName);
    }

    let platform: Platform = raw.platform.parse()?;

    let country = raw
        .country
        .as_deref()
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .unwrap_or(GLOBAL_COUNTRY)
        .to_string();

    let trend_change = raw.trend_change.unwrap_or(0.0);
    if !trend_change.is_finite() {
        return Err(ValidationError::NonFiniteTrendChange { name });
    }

    let count = |field: &'static str, value: Option<i64>| -> Result<i64, ValidationError> {
        let value = value.unwrap_or(0);
        if value < 0 {
            return Err(ValidationError::NegativeMetric {
                name: name.clone(),
                field,
                value,
            });
        }
        Ok(value)
    };

    let metrics = WorkflowMetrics {
        views: count("views", raw.views)?,
        likes: count("likes", raw.likes)?,
        comments: count("comments", raw.comments)?,
        replies: count("replies", raw.replies)?,
        contributors: count("contributors", raw.contributors)?,
        search_volume: count("search_volume", raw.search_volume)?,
        trend_score: raw.trend_score.unwrap_or(0).max(0),
        trend_change,
    };

    let source_url = raw
        .source_url
        .as_deref()
        .map(str::trim)
        .filter(|u| !u.is_empty())
        .map(ToOwned::to_owned);

    Ok(NormalizedWorkflow {
        key: IdentityKey {
            name,
            platform,
            country,
        },
        ratios: ViewRatios::from_metrics(&metrics),
        engagement_score: engagement_score(platform, &metrics),
        metrics,
        source_url,
        related_queries: raw.related_queries.clone(),
    })
}

/// Truncate `s` to at most `max` characters without splitting a code point.
#[must_use]
pub fn truncate_chars(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        Some((idx, _)) => s[..idx].to_string(),
        None => s.to_string(),
    }
}

#[cfg(test)]
#[path = "workflows_test.rs"]
mod tests;
