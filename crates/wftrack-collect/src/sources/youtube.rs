//! Video platform adapter backed by the YouTube Data API v3.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use wftrack_core::{dedup_by_source_url, truncate_chars, Platform, RawWorkflowData, MAX_NAME_CHARS};

use super::WorkflowSource;
use crate::error::SourceError;

const DEFAULT_BASE_URL: &str = "https://www.googleapis.com/youtube/v3/";
const WATCH_URL_PREFIX: &str = "https://www.youtube.com/watch?v=";

/// Searches issued for every country, one API search each.
pub const SEARCH_QUERIES: [&str; 20] = [
    "n8n automation workflow",
    "n8n tutorial",
    "n8n integration",
    "n8n slack automation",
    "n8n google sheets",
    "n8n airtable",
    "n8n webhook",
    "n8n discord bot",
    "n8n telegram bot",
    "n8n gmail automation",
    "n8n notion integration",
    "n8n api workflow",
    "n8n schedule automation",
    "n8n data sync",
    "n8n crm automation",
    "n8n email automation",
    "n8n database workflow",
    "n8n scraping",
    "n8n twitter automation",
    "n8n instagram automation",
];

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    items: Vec<SearchItem>,
}

#[derive(Debug, Deserialize)]
struct SearchItem {
    id: SearchItemId,
}

#[derive(Debug, Deserialize)]
struct SearchItemId {
    #[serde(rename = "videoId")]
    video_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct VideosResponse {
    #[serde(default)]
    items: Vec<VideoItem>,
}

#[derive(Debug, Deserialize)]
struct VideoItem {
    id: String,
    snippet: VideoSnippet,
    #[serde(default)]
    statistics: VideoStatistics,
}

#[derive(Debug, Deserialize)]
struct VideoSnippet {
    title: String,
}

/// Counts arrive as decimal strings; hidden counts are simply absent.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct VideoStatistics {
    view_count: Option<String>,
    like_count: Option<String>,
    comment_count: Option<String>,
}

fn parse_count(raw: Option<&str>) -> i64 {
    raw.and_then(|s| s.trim().parse::<i64>().ok()).unwrap_or(0)
}

/// Client for the YouTube search and videos endpoints.
///
/// Use [`YouTubeSource::new`] for production or
/// [`YouTubeSource::with_base_url`] to point at a mock server in tests.
pub struct YouTubeSource {
    client: Client,
    api_key: Option<String>,
    base_url: Url,
    max_results: u32,
}

impl YouTubeSource {
    /// # Errors
    ///
    /// Returns [`SourceError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(
        api_key: Option<&str>,
        timeout_secs: u64,
        user_agent: &str,
        max_results: u32,
    ) -> Result<Self, SourceError> {
        Self::with_base_url(api_key, timeout_secs, user_agent, max_results, DEFAULT_BASE_URL)
    }

    /// # Errors
    ///
    /// Returns [`SourceError::Http`] if the client cannot be constructed, or
    /// [`SourceError::Api`] if `base_url` is not a valid URL.
    pub fn with_base_url(
        api_key: Option<&str>,
        timeout_secs: u64,
        user_agent: &str,
        max_results: u32,
        base_url: &str,
    ) -> Result<Self, SourceError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;

        // Exactly one trailing slash, so `join("search")` appends a segment.
        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let base_url = Url::parse(&normalised)
            .map_err(|e| SourceError::Api(format!("invalid base URL '{base_url}': {e}")))?;

        Ok(Self {
            client,
            api_key: api_key.map(str::to_owned).filter(|k| !k.trim().is_empty()),
            base_url,
            max_results,
        })
    }

    /// Run one search query for `country` and return the matching videos
    /// with their statistics.
    ///
    /// # Errors
    ///
    /// - [`SourceError::MissingCredentials`] without an API key.
    /// - [`SourceError::Http`] on network failure or a non-2xx status.
    /// - [`SourceError::Deserialize`] if a response has an unexpected shape.
    pub async fn search_videos(
        &self,
        query: &str,
        country: &str,
    ) -> Result<Vec<RawWorkflowData>, SourceError> {
        let api_key = self.api_key()?;
        let max_results = self.max_results.to_string();

        let url = self.build_url(
            "search",
            &[
                ("part", "snippet"),
                ("q", query),
                ("type", "video"),
                ("maxResults", &max_results),
                ("regionCode", country),
                ("relevanceLanguage", "en"),
                ("order", "viewCount"),
                ("key", api_key),
            ],
        )?;
        let search: SearchResponse = self.request_json(&url, "search").await?;

        let ids: Vec<String> = search
            .items
            .into_iter()
            .filter_map(|item| item.id.video_id)
            .collect();
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        self.video_details(&ids, country).await
    }

    async fn video_details(
        &self,
        ids: &[String],
        country: &str,
    ) -> Result<Vec<RawWorkflowData>, SourceError> {
        let api_key = self.api_key()?;
        let joined = ids.join(",");
        let url = self.build_url(
            "videos",
            &[("part", "snippet,statistics"), ("id", &joined), ("key", api_key)],
        )?;
        let videos: VideosResponse = self.request_json(&url, "videos").await?;

        Ok(videos
            .items
            .into_iter()
            .map(|item| RawWorkflowData {
                workflow_name: truncate_chars(&item.snippet.title, MAX_NAME_CHARS),
                platform: Platform::VideoPlatform.label().to_string(),
                country: Some(country.to_string()),
                views: Some(parse_count(item.statistics.view_count.as_deref())),
                likes: Some(parse_count(item.statistics.like_count.as_deref())),
                comments: Some(parse_count(item.statistics.comment_count.as_deref())),
                source_url: Some(format!("{WATCH_URL_PREFIX}{}", item.id)),
                ..RawWorkflowData::default()
            })
            .collect())
    }

    fn api_key(&self) -> Result<&str, SourceError> {
        self.api_key
            .as_deref()
            .ok_or(SourceError::MissingCredentials("YOUTUBE_API_KEY"))
    }

    fn build_url(&self, endpoint: &str, params: &[(&str, &str)]) -> Result<Url, SourceError> {
        let mut url = self
            .base_url
            .join(endpoint)
            .map_err(|e| SourceError::Api(format!("invalid endpoint '{endpoint}': {e}")))?;
        url.query_pairs_mut().extend_pairs(params);
        Ok(url)
    }

    async fn request_json<T: DeserializeOwned>(
        &self,
        url: &Url,
        context: &str,
    ) -> Result<T, SourceError> {
        let response = self.client.get(url.clone()).send().await?;
        let response = response.error_for_status()?;
        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| SourceError::Deserialize {
            context: context.to_string(),
            source: e,
        })
    }
}

#[async_trait]
impl WorkflowSource for YouTubeSource {
    fn platform(&self) -> Platform {
        Platform::VideoPlatform
    }

    /// Run every search query for `country` and merge the results.
    ///
    /// A failing query is logged and contributes nothing. If every query
    /// fails, the last error is returned so the run is recorded as failed.
    async fn collect_workflows(
        &self,
        country: &str,
    ) -> Result<Vec<RawWorkflowData>, SourceError> {
        self.api_key()?;
        tracing::info!(country, "starting YouTube collection");

        let mut all = Vec::new();
        let mut last_error = None;
        let mut succeeded = 0_usize;

        for query in SEARCH_QUERIES {
            match self.search_videos(query, country).await {
                Ok(items) => {
                    tracing::debug!(country, query, count = items.len(), "YouTube query done");
                    succeeded += 1;
                    all.extend(items);
                }
                Err(e) => {
                    tracing::warn!(country, query, error = %e, "YouTube query failed");
                    last_error = Some(e);
                }
            }
        }

        if succeeded == 0 {
            if let Some(e) = last_error {
                return Err(e);
            }
        }

        let unique = dedup_by_source_url(all);
        tracing::info!(country, count = unique.len(), "YouTube collection finished");
        Ok(unique)
    }
}
