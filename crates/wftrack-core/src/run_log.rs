//! Outcome of one adapter invocation, as recorded in the run log.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::platform::Platform;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunStatus {
    Success,
    Error,
}

impl RunStatus {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            RunStatus::Success => "success",
            RunStatus::Error => "error",
        }
    }
}

impl std::fmt::Display for RunStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A run-log entry that has not been written yet.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewRunLog {
    pub platform: Platform,
    pub workflows_found: u32,
    pub status: RunStatus,
    pub error_message: Option<String>,
    pub timestamp: DateTime<Utc>,
}

impl NewRunLog {
    #[must_use]
    pub fn success(platform: Platform, workflows_found: u32, timestamp: DateTime<Utc>) -> Self {
        Self {
            platform,
            workflows_found,
            status: RunStatus::Success,
            error_message: None,
            timestamp,
        }
    }

    #[must_use]
    pub fn error(
        platform: Platform,
        workflows_found: u32,
        message: impl Into<String>,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            platform,
            workflows_found,
            status: RunStatus::Error,
            error_message: Some(message.into()),
            timestamp,
        }
    }
}
