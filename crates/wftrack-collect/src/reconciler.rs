//! Per-record insert-or-update against a [`WorkflowStore`].

use chrono::{DateTime, Utc};
use serde::Serialize;
use wftrack_core::{normalize, reconcile, RawWorkflowData};

use crate::store::WorkflowStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    Inserted,
    Updated,
    /// The record was invalid or the store failed; the reason was logged.
    Skipped,
}

/// Running counts of [`UpsertOutcome`]s.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct UpsertTally {
    pub inserted: u32,
    pub updated: u32,
    pub skipped: u32,
}

impl UpsertTally {
    pub fn record(&mut self, outcome: UpsertOutcome) {
        match outcome {
            UpsertOutcome::Inserted => self.inserted += 1,
            UpsertOutcome::Updated => self.updated += 1,
            UpsertOutcome::Skipped => self.skipped += 1,
        }
    }

    #[must_use]
    pub fn stored(&self) -> u32 {
        self.inserted + self.updated
    }
}

/// Normalize, score and persist one raw record, stamped with the current time.
///
/// Never fails: a bad record or a store error is logged and reported as
/// [`UpsertOutcome::Skipped`] so sibling records keep flowing.
pub async fn upsert_workflow<S>(store: &S, raw: &RawWorkflowData) -> UpsertOutcome
where
    S: WorkflowStore + ?Sized,
{
    upsert_workflow_at(store, raw, Utc::now()).await
}

/// [`upsert_workflow`] with an explicit clock.
pub async fn upsert_workflow_at<S>(
    store: &S,
    raw: &RawWorkflowData,
    now: DateTime<Utc>,
) -> UpsertOutcome
where
    S: WorkflowStore + ?Sized,
{
    let incoming = match normalize(raw) {
        Ok(wf) => wf,
        Err(e) => {
            tracing::warn!(
                platform = %raw.platform,
                workflow = %raw.workflow_name,
                error = %e,
                "skipping invalid workflow record"
            );
            return UpsertOutcome::Skipped;
        }
    };

    let existing = match store.find_workflow(&incoming.key).await {
        Ok(existing) => existing,
        Err(e) => {
            tracing::error!(
                platform = %incoming.key.platform,
                country = %incoming.key.country,
                workflow = %incoming.key.name,
                error = %e,
                "workflow lookup failed"
            );
            return UpsertOutcome::Skipped;
        }
    };

    let record = reconcile(existing.as_ref(), incoming, now);

    match store.save_workflow(&record).await {
        Ok(true) => UpsertOutcome::Inserted,
        Ok(false) => UpsertOutcome::Updated,
        Err(e) => {
            tracing::error!(
                platform = %record.key.platform,
                country = %record.key.country,
                workflow = %record.key.name,
                error = %e,
                "workflow save failed"
            );
            UpsertOutcome::Skipped
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone};
    use wftrack_core::{IdentityKey, Platform};

    use super::*;
    use crate::store::memory::MemoryStore;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 2, 1, 2, 0, 0).unwrap()
    }

    fn forum(name: &str, views: i64, likes: i64) -> RawWorkflowData {
        RawWorkflowData {
            workflow_name: name.to_string(),
            platform: "Forum".to_string(),
            country: Some("Global".to_string()),
            views: Some(views),
            replies: Some(3),
            likes: Some(likes),
            contributors: Some(2),
            source_url: Some(format!("https://community.n8n.io/t/{name}")),
            ..RawWorkflowData::default()
        }
    }

    fn key(name: &str) -> IdentityKey {
        IdentityKey {
            name: name.to_string(),
            platform: Platform::Forum,
            country: "Global".to_string(),
        }
    }

    #[tokio::test]
    async fn first_upsert_inserts_then_updates() {
        let store = MemoryStore::default();

        assert_eq!(
            upsert_workflow_at(&store, &forum("X", 100, 4), t0()).await,
            UpsertOutcome::Inserted
        );
        let later = t0() + Duration::days(2);
        assert_eq!(
            upsert_workflow_at(&store, &forum("X", 900, 20), later).await,
            UpsertOutcome::Updated
        );

        let stored = store.get(&key("X")).expect("stored");
        assert_eq!(store.len(), 1);
        assert_eq!(stored.created_at, t0());
        assert_eq!(stored.last_updated, later);
        assert_eq!(stored.metrics.views, 900);
        assert_eq!(stored.metrics.likes, 20);
    }

    #[tokio::test]
    async fn same_input_twice_is_idempotent_except_last_updated() {
        let store = MemoryStore::default();
        let raw = forum("Y", 250, 7);

        upsert_workflow_at(&store, &raw, t0()).await;
        let first = store.get(&key("Y")).unwrap();
        upsert_workflow_at(&store, &raw, t0() + Duration::minutes(5)).await;
        let mut second = store.get(&key("Y")).unwrap();

        assert_eq!(store.len(), 1);
        assert_ne!(second.last_updated, first.last_updated);
        second.last_updated = first.last_updated;
        assert_eq!(second, first);
    }

    #[tokio::test]
    async fn invalid_record_is_skipped() {
        let store = MemoryStore::default();
        let mut raw = forum("Z", 1, 1);
        raw.platform = "Myspace".to_string();

        assert_eq!(
            upsert_workflow_at(&store, &raw, t0()).await,
            UpsertOutcome::Skipped
        );
        assert_eq!(store.len(), 0);
    }

    #[tokio::test]
    async fn store_failure_is_swallowed() {
        let store = MemoryStore::failing_on("broken");
        assert_eq!(
            upsert_workflow_at(&store, &forum("broken", 1, 1), t0()).await,
            UpsertOutcome::Skipped
        );
        assert_eq!(
            upsert_workflow_at(&store, &forum("fine", 1, 1), t0()).await,
            UpsertOutcome::Inserted
        );
    }

    #[tokio::test]
    async fn lookup_failure_is_swallowed() {
        let store = MemoryStore {
            fail_lookups: true,
            ..MemoryStore::default()
        };
        assert_eq!(
            upsert_workflow_at(&store, &forum("A", 1, 1), t0()).await,
            UpsertOutcome::Skipped
        );
    }

    #[test]
    fn tally_counts_outcomes() {
        let mut tally = UpsertTally::default();
        tally.record(UpsertOutcome::Inserted);
        tally.record(UpsertOutcome::Updated);
        tally.record(UpsertOutcome::Updated);
        tally.record(UpsertOutcome::Skipped);
        assert_eq!(tally.stored(), 3);
        assert_eq!(tally.skipped, 1);
    }
}
