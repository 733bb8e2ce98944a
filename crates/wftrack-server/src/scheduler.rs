//! Background job scheduler.
//!
//! Registers the periodic collection refresh and, when configured, kicks off
//! one run at startup.

use std::sync::Arc;

use tokio_cron_scheduler::{Job, JobScheduler, JobSchedulerError};
use wftrack_collect::{run_collection, CollectionRequest};

use crate::api::AppState;

/// Builds and starts the background job scheduler.
///
/// Returns the running [`JobScheduler`] handle, which must be kept alive
/// for the lifetime of the process. Dropping it shuts down all jobs.
///
/// # Errors
///
/// Returns [`JobSchedulerError`] if the scheduler cannot be initialised,
/// the cron expression is invalid, or the scheduler fails to start.
pub async fn build_scheduler(
    state: AppState,
    config: &wftrack_core::AppConfig,
) -> Result<JobScheduler, JobSchedulerError> {
    let scheduler = JobScheduler::new().await?;

    let request = Arc::new(CollectionRequest::all_platforms(&config.countries));
    scheduler
        .add(collection_job(&config.collect_cron, state, request)?)
        .await?;

    scheduler.start().await?;
    tracing::info!(cron = %config.collect_cron, "scheduler: collection job registered");
    Ok(scheduler)
}

/// Every platform over the configured countries, on `cron` (UTC).
fn collection_job(
    cron: &str,
    state: AppState,
    request: Arc<CollectionRequest>,
) -> Result<Job, JobSchedulerError> {
    Job::new_async(cron, move |_uuid, _lock| {
        let state = state.clone();
        let request = Arc::clone(&request);

        Box::pin(async move {
            tracing::info!("scheduler: starting collection run");
            run_scheduled(&state, &request).await;
        })
    })
}

/// Run one collection in the background without waiting for the first tick.
pub fn spawn_startup_run(state: AppState, countries: &[String]) {
    let request = CollectionRequest::all_platforms(countries);
    tokio::spawn(async move {
        tracing::info!("scheduler: running startup collection");
        run_scheduled(&state, &request).await;
    });
}

async fn run_scheduled(state: &AppState, request: &CollectionRequest) {
    let summary = run_collection(&state.pool, &state.sources, request, &state.pipeline).await;
    if summary.all_succeeded() {
        tracing::info!(
            workflows_found = summary.workflows_found(),
            "scheduler: collection run complete"
        );
    } else {
        let failed: Vec<String> = summary
            .platforms
            .iter()
            .filter(|p| p.status == wftrack_core::RunStatus::Error)
            .map(|p| p.platform.to_string())
            .collect();
        tracing::warn!(
            workflows_found = summary.workflows_found(),
            failed = ?failed,
            "scheduler: collection run finished with failed platforms"
        );
    }
}
