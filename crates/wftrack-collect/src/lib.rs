//! Workflow popularity collection.
//!
//! Pulls raw engagement data from the video platform, the community forum and
//! the search-trends service, normalizes and scores each record, and upserts it
//! by `(name, platform, country)`. Every run appends one log entry per
//! platform.

pub mod error;
pub mod pipeline;
pub mod reconciler;
pub mod sources;
pub mod store;

pub use error::{SourceError, StoreError};
pub use pipeline::{
    run_collection, CollectionRequest, CountryOutcome, PipelineOptions, PlatformOutcome,
    RunSummary, DEFAULT_COUNTRIES, DEFAULT_PLATFORM_KEYS,
};
pub use reconciler::{upsert_workflow, upsert_workflow_at, UpsertOutcome, UpsertTally};
pub use sources::{ForumSource, SourceSet, TrendsSource, WorkflowSource, YouTubeSource};
pub use store::WorkflowStore;
