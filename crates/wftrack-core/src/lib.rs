//! Domain types and pure logic shared by every wftrack crate.
//!
//! Nothing in here performs I/O: platform labels, raw-record normalization,
//! the engagement scorer, reconcile merging and per-run deduplication are all
//! deterministic functions so they can be tested without a database.

pub mod app_config;
pub mod config;
pub mod dedup;
pub mod platform;
pub mod reconcile;
pub mod run_log;
pub mod scoring;
pub mod workflows;

use thiserror::Error;

pub use app_config::{AppConfig, Environment};
pub use config::{load_app_config, load_app_config_from_env};
pub use dedup::dedup_by_source_url;
pub use platform::Platform;
pub use reconcile::reconcile;
pub use run_log::{NewRunLog, RunStatus};
pub use scoring::{engagement_score, score_raw};
pub use workflows::{
    normalize, truncate_chars, IdentityKey, NormalizedWorkflow, RawWorkflowData, ViewRatios,
    WorkflowMetrics, WorkflowRecord, GLOBAL_COUNTRY, MAX_NAME_CHARS,
};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}

/// Why a raw record was rejected before reaching storage.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("workflow name is empty")]
    EmptyName,

    #[error("unknown platform: {0}")]
    UnknownPlatform(String),

    #[error("negative {field} for workflow '{name}': {value}")]
    NegativeMetric {
        name: String,
        field: &'static str,
        value: i64,
    },

    #[error("trend_change for workflow '{name}' is not a finite number")]
    NonFiniteTrendChange { name: String },
}
