//! Collection orchestration: adapters → reconciler → run log.

use std::collections::BTreeSet;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use wftrack_core::{NewRunLog, Platform, RunStatus, ValidationError, GLOBAL_COUNTRY};

use crate::error::SourceError;
use crate::reconciler::{upsert_workflow, UpsertTally};
use crate::sources::SourceSet;
use crate::store::WorkflowStore;

/// Platforms requested when the caller does not name any.
pub const DEFAULT_PLATFORM_KEYS: [&str; 3] = ["youtube", "forum", "google"];
/// Countries requested when the caller does not name any.
pub const DEFAULT_COUNTRIES: [&str; 2] = ["US", "IN"];

/// Which platforms and countries one run covers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectionRequest {
    /// Deduplicated, in collection order.
    pub platforms: Vec<Platform>,
    pub countries: Vec<String>,
}

impl CollectionRequest {
    /// Build a request from platform keys and country codes.
    ///
    /// Empty lists fall back to [`DEFAULT_PLATFORM_KEYS`] and
    /// [`DEFAULT_COUNTRIES`]. Platforms are always visited in the fixed order
    /// video, forum, trends regardless of the order given.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::UnknownPlatform`] for an unrecognized key.
    pub fn parse<P, C>(platform_keys: &[P], countries: &[C]) -> Result<Self, ValidationError>
    where
        P: AsRef<str>,
        C: AsRef<str>,
    {
        let platforms: BTreeSet<Platform> = if platform_keys.is_empty() {
            Platform::ALL.into_iter().collect()
        } else {
            platform_keys
                .iter()
                .map(|key| key.as_ref().parse::<Platform>())
                .collect::<Result<_, _>>()?
        };

        let mut unique_countries: Vec<String> = Vec::new();
        for country in countries {
            let country = country.as_ref().trim();
            if !country.is_empty() && !unique_countries.iter().any(|c| c == country) {
                unique_countries.push(country.to_string());
            }
        }
        if unique_countries.is_empty() {
            unique_countries = DEFAULT_COUNTRIES.iter().map(ToString::to_string).collect();
        }

        Ok(Self {
            platforms: platforms.into_iter().collect(),
            countries: unique_countries,
        })
    }

    /// Every platform over `countries`.
    #[must_use]
    pub fn all_platforms(countries: &[String]) -> Self {
        Self {
            platforms: Platform::ALL.to_vec(),
            countries: countries.to_vec(),
        }
    }

    /// Countries the adapter for `platform` is invoked with.
    #[must_use]
    pub fn countries_for(&self, platform: Platform) -> Vec<String> {
        if platform.is_country_scoped() {
            self.countries.clone()
        } else {
            vec![GLOBAL_COUNTRY.to_string()]
        }
    }
}

#[derive(Debug, Clone)]
pub struct PipelineOptions {
    /// Pause between consecutive platforms.
    pub platform_delay: Duration,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            platform_delay: Duration::from_secs(5),
        }
    }
}

/// Result of one adapter invocation.
#[derive(Debug, Clone, Serialize)]
pub struct CountryOutcome {
    pub country: String,
    /// Records the adapter returned.
    pub count: u32,
    #[serde(flatten)]
    pub tally: UpsertTally,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl CountryOutcome {
    #[must_use]
    pub fn failed(&self) -> bool {
        self.error.is_some()
    }
}

/// Result of one platform, matching the run-log entry written for it.
#[derive(Debug, Clone, Serialize)]
pub struct PlatformOutcome {
    pub platform: Platform,
    pub status: RunStatus,
    pub workflows_found: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    pub countries: Vec<CountryOutcome>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub platforms: Vec<PlatformOutcome>,
}

impl RunSummary {
    #[must_use]
    pub fn workflows_found(&self) -> u32 {
        self.platforms.iter().map(|p| p.workflows_found).sum()
    }

    #[must_use]
    pub fn all_succeeded(&self) -> bool {
        self.platforms
            .iter()
            .all(|p| p.status == RunStatus::Success)
    }
}

/// Run one collection pass.
///
/// Platforms run sequentially in request order with `options.platform_delay`
/// between them. Each country is an independent adapter call: a failing
/// country is recorded and the next one still runs. Every platform gets
/// exactly one run-log entry, whose status is `error` only when all of its
/// countries failed.
///
/// Never fails; store and adapter errors are logged and reflected in the
/// returned summary.
pub async fn run_collection<S>(
    store: &S,
    sources: &SourceSet,
    request: &CollectionRequest,
    options: &PipelineOptions,
) -> RunSummary
where
    S: WorkflowStore + ?Sized,
{
    let started_at = Utc::now();
    let mut platforms = Vec::with_capacity(request.platforms.len());

    for (idx, &platform) in request.platforms.iter().enumerate() {
        if idx > 0 && !options.platform_delay.is_zero() {
            tokio::time::sleep(options.platform_delay).await;
        }

        let outcome = collect_platform(store, sources, request, platform).await;

        let log = NewRunLog {
            platform,
            workflows_found: outcome.workflows_found,
            status: outcome.status,
            error_message: outcome.error_message.clone(),
            timestamp: Utc::now(),
        };
        if let Err(e) = store.append_run_log(&log).await {
            tracing::error!(platform = %platform, error = %e, "failed to write run log");
        }

        platforms.push(outcome);
    }

    let summary = RunSummary {
        started_at,
        finished_at: Utc::now(),
        platforms,
    };
    tracing::info!(
        platforms = summary.platforms.len(),
        workflows_found = summary.workflows_found(),
        all_succeeded = summary.all_succeeded(),
        "collection run finished"
    );
    summary
}

async fn collect_platform<S>(
    store: &S,
    sources: &SourceSet,
    request: &CollectionRequest,
    platform: Platform,
) -> PlatformOutcome
where
    S: WorkflowStore + ?Sized,
{
    let countries = request.countries_for(platform);
    let mut outcomes = Vec::with_capacity(countries.len());

    let Some(source) = sources.get(platform) else {
        tracing::error!(platform = %platform, "no source registered");
        let message = SourceError::NotConfigured(platform.to_string()).to_string();
        return PlatformOutcome {
            platform,
            status: RunStatus::Error,
            workflows_found: 0,
            error_message: Some(message.clone()),
            countries: countries
                .into_iter()
                .map(|country| CountryOutcome {
                    country,
                    count: 0,
                    tally: UpsertTally::default(),
                    error: Some(message.clone()),
                })
                .collect(),
        };
    };

    for country in countries {
        tracing::info!(platform = %platform, country = %country, "collecting");
        match source.collect_workflows(&country).await {
            Ok(items) => {
                let mut tally = UpsertTally::default();
                for item in &items {
                    tally.record(upsert_workflow(store, item).await);
                }
                tracing::info!(
                    platform = %platform,
                    country = %country,
                    found = items.len(),
                    inserted = tally.inserted,
                    updated = tally.updated,
                    skipped = tally.skipped,
                    "country collected"
                );
                outcomes.push(CountryOutcome {
                    country,
                    count: u32::try_from(items.len()).unwrap_or(u32::MAX),
                    tally,
                    error: None,
                });
            }
            Err(e) => {
                tracing::error!(
                    platform = %platform,
                    country = %country,
                    error = %e,
                    "collection failed"
                );
                outcomes.push(CountryOutcome {
                    country,
                    count: 0,
                    tally: UpsertTally::default(),
                    error: Some(e.to_string()),
                });
            }
        }
    }

    summarize_platform(platform, outcomes)
}

fn summarize_platform(platform: Platform, countries: Vec<CountryOutcome>) -> PlatformOutcome {
    let workflows_found = countries
        .iter()
        .fold(0_u32, |acc, c| acc.saturating_add(c.count));

    let failures: Vec<String> = countries
        .iter()
        .filter_map(|c| c.error.as_ref().map(|e| format!("{}: {e}", c.country)))
        .collect();

    let status = if !countries.is_empty() && countries.iter().all(CountryOutcome::failed) {
        RunStatus::Error
    } else {
        RunStatus::Success
    };

    PlatformOutcome {
        platform,
        status,
        workflows_found,
        error_message: (!failures.is_empty()).then(|| failures.join("; ")),
        countries,
    }
}

#[cfg(test)]
#[path = "pipeline_test.rs"]
mod tests;
