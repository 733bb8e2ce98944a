use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::ValidationError;

/// The three external sources popularity signals are collected from.
///
/// Labels (`YouTube`, `Forum`, `Google Trends`) are what gets persisted and
/// returned by the API; request keys (`youtube`, `forum`, `google`) are what
/// callers use to ask for a collection run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Platform {
    #[serde(rename = "YouTube")]
    VideoPlatform,
    #[serde(rename = "Forum")]
    Forum,
    #[serde(rename = "Google Trends")]
    TrendsService,
}

impl Platform {
    /// Every platform, in the order a full collection run visits them.
    pub const ALL: [Platform; 3] = [
        Platform::VideoPlatform,
        Platform::Forum,
        Platform::TrendsService,
    ];

    /// Label stored in the database and exposed by the API.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Platform::VideoPlatform => "YouTube",
            Platform::Forum => "Forum",
            Platform::TrendsService => "Google Trends",
        }
    }

    /// Short key accepted by `POST /api/collect` and the CLI.
    #[must_use]
    pub fn request_key(self) -> &'static str {
        match self {
            Platform::VideoPlatform => "youtube",
            Platform::Forum => "forum",
            Platform::TrendsService => "google",
        }
    }

    /// Whether the source is queried once per country.
    ///
    /// The forum has no geography, so it runs once and stores `Global`.
    #[must_use]
    pub fn is_country_scoped(self) -> bool {
        !matches!(self, Platform::Forum)
    }

    /// Exact-match lookup on the stored label. Case-sensitive, so it is safe
    /// to use for identity keys.
    #[must_use]
    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.label() == label)
    }
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Platform {
    type Err = ValidationError;

    /// Accepts either the stored label or the request key; request keys are
    /// matched case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if let Some(platform) = Self::from_label(trimmed) {
            return Ok(platform);
        }
        match trimmed.to_ascii_lowercase().as_str() {
            "youtube" => Ok(Platform::VideoPlatform),
            "forum" => Ok(Platform::Forum),
            "google" | "google_trends" | "trends" => Ok(Platform::TrendsService),
            _ => Err(ValidationError::UnknownPlatform(s.to_string())),
        }
    }
}
