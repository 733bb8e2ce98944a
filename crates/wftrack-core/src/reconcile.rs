//! Merge an incoming observation with whatever is already stored for its key.

use chrono::{DateTime, Utc};

use crate::workflows::{NormalizedWorkflow, WorkflowRecord};

/// Build the record to persist for `incoming`.
///
/// Every mutable field comes from `incoming`; only `created_at` survives from
/// `existing`. A first observation gets `created_at == last_updated == now`.
///
/// `existing` must share `incoming`'s identity key; callers look it up by key.
#[must_use]
pub fn reconcile(
    existing: Option<&WorkflowRecord>,
    incoming: NormalizedWorkflow,
    now: DateTime<Utc>,
) -> WorkflowRecord {
    debug_assert!(existing.is_none_or(|e| e.key == incoming.key));

    WorkflowRecord {
        created_at: existing.map_or(now, |e| e.created_at),
        last_updated: now,
        key: incoming.key,
        metrics: incoming.metrics,
        ratios: incoming.ratios,
        engagement_score: incoming.engagement_score,
        source_url: incoming.source_url,
        related_queries: incoming.related_queries,
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone};

    use super::*;
    use crate::workflows::{normalize, RawWorkflowData};

    fn forum_raw(views: i64, likes: i64) -> RawWorkflowData {
        RawWorkflowData {
            workflow_name: "X".to_string(),
            platform: "Forum".to_string(),
            country: Some("Global".to_string()),
            views: Some(views),
            replies: Some(3),
            likes: Some(likes),
            contributors: Some(2),
            ..RawWorkflowData::default()
        }
    }

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, 5, 2, 0, 0).unwrap()
    }

    #[test]
    fn first_observation_sets_created_at_to_now() {
        let incoming = normalize(&forum_raw(100, 4)).unwrap();
        let record = reconcile(None, incoming, t0());
        assert_eq!(record.created_at, t0());
        assert_eq!(record.last_updated, t0());
    }

    #[test]
    fn update_preserves_created_at_and_overwrites_metrics() {
        let first = reconcile(None, normalize(&forum_raw(100, 4)).unwrap(), t0());

        let later = t0() + Duration::days(1);
        let second = reconcile(Some(&first), normalize(&forum_raw(900, 12)).unwrap(), later);

        assert_eq!(second.created_at, t0());
        assert_eq!(second.last_updated, later);
        assert_eq!(second.metrics.views, 900);
        assert_eq!(second.metrics.likes, 12);
        assert!(second.engagement_score > first.engagement_score);
    }

    #[test]
    fn repeated_identical_input_differs_only_in_last_updated() {
        let raw = forum_raw(250, 7);
        let first = reconcile(None, normalize(&raw).unwrap(), t0());
        let second = reconcile(
            Some(&first),
            normalize(&raw).unwrap(),
            t0() + Duration::hours(6),
        );

        let mut aligned = second.clone();
        aligned.last_updated = first.last_updated;
        assert_eq!(aligned, first);
        assert_ne!(second.last_updated, first.last_updated);
    }

    #[test]
    fn created_at_survives_many_reconciliations() {
        let mut record = reconcile(None, normalize(&forum_raw(1, 0)).unwrap(), t0());
        for day in 1..=30 {
            let incoming = normalize(&forum_raw(day * 10, day)).unwrap();
            record = reconcile(Some(&record), incoming, t0() + Duration::days(day));
        }
        assert_eq!(record.created_at, t0());
        assert_eq!(record.metrics.views, 300);
    }
}
