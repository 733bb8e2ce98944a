//! Storage seam used by the reconciler and the orchestrator.

use async_trait::async_trait;
use sqlx::PgPool;
use wftrack_core::{IdentityKey, NewRunLog, WorkflowRecord};

use crate::error::StoreError;

/// What the collector needs from persistence.
#[async_trait]
pub trait WorkflowStore: Send + Sync {
    /// Exact, case-sensitive lookup by identity key.
    async fn find_workflow(&self, key: &IdentityKey)
        -> Result<Option<WorkflowRecord>, StoreError>;

    /// Insert or update `record`. Returns `true` when the key was new.
    async fn save_workflow(&self, record: &WorkflowRecord) -> Result<bool, StoreError>;

    async fn append_run_log(&self, log: &NewRunLog) -> Result<(), StoreError>;
}

#[async_trait]
impl WorkflowStore for PgPool {
    async fn find_workflow(
        &self,
        key: &IdentityKey,
    ) -> Result<Option<WorkflowRecord>, StoreError> {
        let row = wftrack_db::get_workflow(self, key).await?;
        Ok(row.map(wftrack_db::WorkflowRow::into_record).transpose()?)
    }

    async fn save_workflow(&self, record: &WorkflowRecord) -> Result<bool, StoreError> {
        let upserted = wftrack_db::upsert_workflow(self, record).await?;
        Ok(upserted.inserted)
    }

    async fn append_run_log(&self, log: &NewRunLog) -> Result<(), StoreError> {
        wftrack_db::insert_collection_log(self, log).await?;
        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod memory {
    use std::collections::{HashMap, HashSet};
    use std::sync::Mutex;

    use super::*;

    /// In-process store for orchestrator and reconciler tests.
    #[derive(Default)]
    pub(crate) struct MemoryStore {
        pub(crate) records: Mutex<HashMap<IdentityKey, WorkflowRecord>>,
        pub(crate) logs: Mutex<Vec<NewRunLog>>,
        /// Names whose writes fail, to exercise error paths.
        pub(crate) failing_names: HashSet<String>,
        pub(crate) fail_lookups: bool,
    }

    impl MemoryStore {
        pub(crate) fn failing_on(name: &str) -> Self {
            Self {
                failing_names: HashSet::from([name.to_string()]),
                ..Self::default()
            }
        }

        pub(crate) fn len(&self) -> usize {
            self.records.lock().unwrap().len()
        }

        pub(crate) fn get(&self, key: &IdentityKey) -> Option<WorkflowRecord> {
            self.records.lock().unwrap().get(key).cloned()
        }

        pub(crate) fn logs(&self) -> Vec<NewRunLog> {
            self.logs.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl WorkflowStore for MemoryStore {
        async fn find_workflow(
            &self,
            key: &IdentityKey,
        ) -> Result<Option<WorkflowRecord>, StoreError> {
            if self.fail_lookups {
                return Err(StoreError::Unavailable("lookup disabled".to_string()));
            }
            Ok(self.get(key))
        }

        async fn save_workflow(&self, record: &WorkflowRecord) -> Result<bool, StoreError> {
            if self.failing_names.contains(&record.key.name) {
                return Err(StoreError::Unavailable(format!(
                    "write rejected for {}",
                    record.key.name
                )));
            }
            let mut records = self.records.lock().unwrap();
            Ok(records.insert(record.key.clone(), record.clone()).is_none())
        }

        async fn append_run_log(&self, log: &NewRunLog) -> Result<(), StoreError> {
            self.logs.lock().unwrap().push(log.clone());
            Ok(())
        }
    }
}
