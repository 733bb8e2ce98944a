//! Search-trends adapter.
//!
//! Produces simulated interest data for a fixed keyword list. Growth ranges
//! depend on the keyword's category and search volume scales with the trend
//! score tier, so the output has a plausible shape.

use std::ops::RangeInclusive;

use async_trait::async_trait;
use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};
use rand::Rng;
use wftrack_core::{Platform, RawWorkflowData, GLOBAL_COUNTRY};

use super::{SharedRng, WorkflowSource};
use crate::error::SourceError;

pub const TREND_KEYWORDS: [&str; 15] = [
    "n8n automation",
    "n8n workflow",
    "n8n integration",
    "workflow automation",
    "n8n tutorial",
    "n8n webhook",
    "n8n api",
    "no code automation",
    "n8n slack",
    "n8n google sheets",
    "n8n notion",
    "n8n discord",
    "n8n telegram",
    "n8n airtable",
    "n8n zapier alternative",
];

const EXPLORE_URL: &str = "https://trends.google.com/trends/explore";

const KNOWN_GEOS: [&str; 9] = ["US", "GB", "DE", "FR", "CA", "AU", "IN", "BR", "JP"];

/// Geo parameter for a country. `Global` means worldwide (empty); countries
/// the service is not queried for fall back to `US`.
#[must_use]
pub fn geo_code(country: &str) -> &'static str {
    if country == GLOBAL_COUNTRY {
        return "";
    }
    KNOWN_GEOS
        .iter()
        .find(|geo| **geo == country)
        .copied()
        .unwrap_or("US")
}

fn trend_change_range(keyword: &str) -> RangeInclusive<f64> {
    let keyword = keyword.to_lowercase();
    if ["slack", "discord", "notion"]
        .iter()
        .any(|k| keyword.contains(k))
    {
        15.0..=45.0
    } else if keyword.contains("webhook") || keyword.contains("api") {
        -5.0..=25.0
    } else if keyword.contains("tutorial") {
        10.0..=35.0
    } else {
        -12.0..=28.0
    }
}

fn volume_multiplier_range(trend_score: i32) -> RangeInclusive<i64> {
    match trend_score {
        s if s > 70 => 800..=1800,
        s if s > 40 => 500..=1200,
        _ => 200..=800,
    }
}

fn round_one_decimal(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

fn explore_url(keyword: &str, country: &str) -> String {
    format!(
        "{EXPLORE_URL}?q={}&geo={}",
        utf8_percent_encode(keyword, NON_ALPHANUMERIC),
        geo_code(country)
    )
}

pub struct TrendsSource {
    rng: SharedRng,
}

impl Default for TrendsSource {
    fn default() -> Self {
        Self::new()
    }
}

impl TrendsSource {
    #[must_use]
    pub fn new() -> Self {
        Self {
            rng: SharedRng::from_os(),
        }
    }

    #[must_use]
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: SharedRng::seeded(seed),
        }
    }

    fn sample_keyword(&self, keyword: &str, country: &str) -> RawWorkflowData {
        let (trend_score, trend_change, search_volume) = self.rng.with(|rng| {
            let score: i32 = rng.random_range(25..=90);
            let change = rng.random_range(trend_change_range(keyword));
            let volume = i64::from(score) * rng.random_range(volume_multiplier_range(score));
            (score, round_one_decimal(change), volume)
        });

        RawWorkflowData {
            workflow_name: format!("{keyword} automation workflow"),
            platform: Platform::TrendsService.label().to_string(),
            country: Some(country.to_string()),
            search_volume: Some(search_volume),
            trend_score: Some(trend_score),
            trend_change: Some(trend_change),
            source_url: Some(explore_url(keyword, country)),
            related_queries: vec![
                format!("{keyword} tutorial"),
                format!("{keyword} guide"),
                format!("how to {keyword}"),
            ],
            ..RawWorkflowData::default()
        }
    }
}

#[async_trait]
impl WorkflowSource for TrendsSource {
    fn platform(&self) -> Platform {
        Platform::TrendsService
    }

    /// One record per keyword, highest trend score first.
    async fn collect_workflows(
        &self,
        country: &str,
    ) -> Result<Vec<RawWorkflowData>, SourceError> {
        tracing::info!(country, "starting trends collection");

        let mut items: Vec<RawWorkflowData> = TREND_KEYWORDS
            .iter()
            .map(|keyword| self.sample_keyword(keyword, country))
            .collect();
        items.sort_by_key(|item| std::cmp::Reverse(item.trend_score.unwrap_or(0)));

        tracing::info!(country, count = items.len(), "trends collection finished");
        Ok(items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn geo_code_maps_known_and_unknown_countries() {
        assert_eq!(geo_code("IN"), "IN");
        assert_eq!(geo_code("Global"), "");
        assert_eq!(geo_code("NZ"), "US");
    }

    #[test]
    fn explore_url_encodes_keyword() {
        assert_eq!(
            explore_url("no code automation", "GB"),
            "https://trends.google.com/trends/explore?q=no%20code%20automation&geo=GB"
        );
        assert!(explore_url("n8n api", "Global").ends_with("&geo="));
    }

    #[test]
    fn trend_change_range_follows_keyword_category() {
        assert_eq!(trend_change_range("n8n slack"), 15.0..=45.0);
        assert_eq!(trend_change_range("n8n webhook"), -5.0..=25.0);
        assert_eq!(trend_change_range("n8n tutorial"), 10.0..=35.0);
        assert_eq!(trend_change_range("workflow automation"), -12.0..=28.0);
    }

    #[test]
    fn volume_tiers() {
        assert_eq!(volume_multiplier_range(71), 800..=1800);
        assert_eq!(volume_multiplier_range(70), 500..=1200);
        assert_eq!(volume_multiplier_range(40), 200..=800);
    }

    #[test]
    fn rounding_keeps_one_decimal() {
        assert!((round_one_decimal(12.345) - 12.3).abs() < 1e-9);
        assert!((round_one_decimal(-4.96) + 5.0).abs() < 1e-9);
    }

    #[tokio::test]
    async fn collect_returns_one_item_per_keyword_sorted_by_score() {
        let source = TrendsSource::seeded(5);
        let items = source.collect_workflows("IN").await.unwrap();

        assert_eq!(items.len(), TREND_KEYWORDS.len());
        let scores: Vec<i32> = items.iter().map(|i| i.trend_score.unwrap()).collect();
        assert!(scores.windows(2).all(|w| w[0] >= w[1]));

        for item in &items {
            assert_eq!(item.platform, "Google Trends");
            assert_eq!(item.country.as_deref(), Some("IN"));
            assert!(item.workflow_name.ends_with(" automation workflow"));
            assert_eq!(item.related_queries.len(), 3);
            let score = item.trend_score.unwrap();
            assert!((25..=90).contains(&score));
            let volume = item.search_volume.unwrap();
            assert!(volume >= i64::from(score) * 200);
            assert!(volume <= i64::from(score) * 1800);
        }
    }
}
