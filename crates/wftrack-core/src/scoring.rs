//! Cross-platform engagement scorer.
//!
//! Each platform reports different metrics, so the weights below put them on
//! a roughly comparable scale. The score is never rounded here; rounding is a
//! presentation concern.

use crate::platform::Platform;
use crate::workflows::{RawWorkflowData, WorkflowMetrics};

const VIDEO_VIEW_WEIGHT: f64 = 0.0001;
const VIDEO_LIKE_WEIGHT: f64 = 0.4;
const VIDEO_COMMENT_WEIGHT: f64 = 0.2;

const FORUM_REPLY_WEIGHT: f64 = 40.0;
const FORUM_LIKE_WEIGHT: f64 = 30.0;
const FORUM_CONTRIBUTOR_WEIGHT: f64 = 20.0;
const FORUM_VIEW_WEIGHT: f64 = 0.01;

const TRENDS_VOLUME_WEIGHT: f64 = 0.7;
const TRENDS_MOMENTUM_WEIGHT: f64 = 300.0;

/// Score a workflow from its platform and current metrics.
///
/// - Video: `views*0.0001 + likes*0.4 + comments*0.2`, but `0` whenever
///   `views == 0` regardless of likes or comments.
/// - Forum: `replies*40 + likes*30 + contributors*20 + views*0.01`.
/// - Trends: `search_volume*0.7 + max(0, trend_change)*300`; declining
///   interest contributes nothing rather than a penalty.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn engagement_score(platform: Platform, metrics: &WorkflowMetrics) -> f64 {
    match platform {
        Platform::VideoPlatform => {
            if metrics.views > 0 {
                metrics.views as f64 * VIDEO_VIEW_WEIGHT
                    + metrics.likes as f64 * VIDEO_LIKE_WEIGHT
                    + metrics.comments as f64 * VIDEO_COMMENT_WEIGHT
            } else {
                0.0
            }
        }
        Platform::Forum => {
            metrics.replies as f64 * FORUM_REPLY_WEIGHT
                + metrics.likes as f64 * FORUM_LIKE_WEIGHT
                + metrics.contributors as f64 * FORUM_CONTRIBUTOR_WEIGHT
                + metrics.views as f64 * FORUM_VIEW_WEIGHT
        }
        Platform::TrendsService => {
            metrics.search_volume as f64 * TRENDS_VOLUME_WEIGHT
                + metrics.trend_change.max(0.0) * TRENDS_MOMENTUM_WEIGHT
        }
    }
}

/// Score a raw adapter record without validating it.
///
/// Unrecognized platform labels score `0`. Absent metrics count as zero.
#[must_use]
pub fn score_raw(raw: &RawWorkflowData) -> f64 {
    let Ok(platform) = raw.platform.parse::<Platform>() else {
        return 0.0;
    };
    let metrics = WorkflowMetrics {
        views: raw.views.unwrap_or(0),
        likes: raw.likes.unwrap_or(0),
        comments: raw.comments.unwrap_or(0),
        replies: raw.replies.unwrap_or(0),
        contributors: raw.contributors.unwrap_or(0),
        search_volume: raw.search_volume.unwrap_or(0),
        trend_score: raw.trend_score.unwrap_or(0),
        trend_change: raw.trend_change.unwrap_or(0.0),
    };
    engagement_score(platform, &metrics)
}
