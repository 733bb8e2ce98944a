//! Source adapters: one per platform, all behind [`WorkflowSource`].

mod forum;
mod trends;
mod youtube;

use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::SeedableRng;
use wftrack_core::{AppConfig, Platform, RawWorkflowData};

use crate::error::SourceError;

pub use forum::{ForumSource, FORUM_CATEGORIES};
pub use trends::{geo_code, TrendsSource, TREND_KEYWORDS};
pub use youtube::{YouTubeSource, SEARCH_QUERIES};

/// A platform adapter.
///
/// Implementations return raw records already deduplicated by source URL.
/// Country-agnostic sources ignore `country`.
#[async_trait]
pub trait WorkflowSource: Send + Sync {
    fn platform(&self) -> Platform;

    async fn collect_workflows(&self, country: &str)
        -> Result<Vec<RawWorkflowData>, SourceError>;
}

/// The adapters available to a collection run, at most one per platform.
#[derive(Default)]
pub struct SourceSet {
    sources: Vec<Box<dyn WorkflowSource>>,
}

impl SourceSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the production adapters from configuration.
    ///
    /// The video adapter is always registered; without `YOUTUBE_API_KEY` its
    /// invocations fail with [`SourceError::MissingCredentials`].
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::Http`] if the HTTP client cannot be built.
    pub fn from_config(config: &AppConfig) -> Result<Self, SourceError> {
        let youtube = YouTubeSource::new(
            config.youtube_api_key.as_deref(),
            config.request_timeout_secs,
            &config.user_agent,
            config.youtube_max_results,
        )?;

        Ok(Self::new()
            .with_source(youtube)
            .with_source(ForumSource::new())
            .with_source(TrendsSource::new()))
    }

    /// Register `source`, replacing any adapter already set for its platform.
    #[must_use]
    pub fn with_source(mut self, source: impl WorkflowSource + 'static) -> Self {
        let platform = source.platform();
        self.sources.retain(|s| s.platform() != platform);
        self.sources.push(Box::new(source));
        self
    }

    #[must_use]
    pub fn get(&self, platform: Platform) -> Option<&dyn WorkflowSource> {
        self.sources
            .iter()
            .find(|s| s.platform() == platform)
            .map(Box::as_ref)
    }
}

/// RNG shared by the simulated adapters.
///
/// Seeded instances make their output reproducible in tests.
pub(crate) struct SharedRng(Mutex<StdRng>);

impl SharedRng {
    pub(crate) fn from_os() -> Self {
        Self(Mutex::new(StdRng::from_os_rng()))
    }

    pub(crate) fn seeded(seed: u64) -> Self {
        Self(Mutex::new(StdRng::seed_from_u64(seed)))
    }

    pub(crate) fn with<T>(&self, f: impl FnOnce(&mut StdRng) -> T) -> T {
        // A panic while sampling leaves the RNG usable; keep going.
        let mut rng = self.0.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut rng)
    }
}


#[cfg(test)]
mod tests {
    use super::testing::StaticSource;
    use super::*;

    #[test]
    fn with_source_replaces_same_platform() {
        let set = SourceSet::new()
            .with_source(StaticSource::new(Platform::Forum))
            .with_source(StaticSource::new(Platform::Forum).failing("Global", "x"));
        assert_eq!(set.sources.len(), 1);
        assert!(set.get(Platform::Forum).is_some());
        assert!(set.get(Platform::TrendsService).is_none());
    }

    #[test]
    fn seeded_rng_is_reproducible() {
        use rand::Rng;
        let a = SharedRng::seeded(7).with(|r| r.random_range(0..1_000_000));
        let b = SharedRng::seeded(7).with(|r| r.random_range(0..1_000_000));
        assert_eq!(a, b);
    }
}
