//! YouTube Data API v3 client.
//!
//! Two-stage lookup: a search call returns candidate video ids for the
//! query, then a details call batches those ids to pull engagement
//! counters. The API serializes counters as strings; absent counters
//! (e.g. likes hidden by the uploader) default to 0.

use std::collections::BTreeMap;
use std::time::Duration;

use serde::Deserialize;

use wfpulse_core::{Country, Metrics, Platform, RawRecord, YouTubeMetrics};

use crate::error::IngestError;
use crate::sources::USER_AGENT;

const DEFAULT_BASE_URL: &str = "https://www.googleapis.com/youtube/v3";

/// Hard ceiling on one search page; the API itself allows at most 50.
const MAX_RESULTS_CEILING: u32 = 50;

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    items: Vec<SearchItem>,
}

#[derive(Debug, Deserialize)]
struct SearchItem {
    #[serde(default)]
    id: SearchItemId,
}

#[derive(Debug, Default, Deserialize)]
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
    #[serde(default)]
    snippet: Snippet,
    #[serde(default)]
    statistics: Statistics,
}

#[derive(Debug, Default, Deserialize)]
struct Snippet {
    title: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct Statistics {
    #[serde(rename = "viewCount")]
    view_count: Option<String>,
    #[serde(rename = "likeCount")]
    like_count: Option<String>,
    #[serde(rename = "commentCount")]
    comment_count: Option<String>,
}

fn parse_count(raw: Option<&str>) -> u64 {
    raw.and_then(|s| s.parse().ok()).unwrap_or(0)
}

/// Client for the YouTube Data v3 `search` and `videos` endpoints.
///
/// Constructed without an API key the client is inert: [`YouTubeClient::fetch`]
/// returns an empty list without issuing any request.
pub struct YouTubeClient {
    client: reqwest::Client,
    api_key: Option<String>,
    base_url: String,
}

impl YouTubeClient {
    /// Creates a client pointed at the production API.
    ///
    /// # Errors
    ///
    /// Returns [`IngestError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(api_key: Option<String>, timeout_secs: u64) -> Result<Self, IngestError> {
        Self::with_base_url(api_key, timeout_secs, DEFAULT_BASE_URL)
    }

    /// Creates a client with a custom base URL (for testing with wiremock).
    ///
    /// # Errors
    ///
    /// Returns [`IngestError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn with_base_url(
        api_key: Option<String>,
        timeout_secs: u64,
        base_url: &str,
    ) -> Result<Self, IngestError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self {
            client,
            api_key,
            base_url: base_url.trim_end_matches('/').to_owned(),
        })
    }

    /// Fetches up to `max_results` videos matching `query` in `country`,
    /// with engagement counters resolved through the details endpoint.
    ///
    /// Without a configured API key this is a no-op returning `Ok(vec![])`.
    ///
    /// # Errors
    ///
    /// - [`IngestError::Http`] on network failure.
    /// - [`IngestError::UnexpectedStatus`] on a non-2xx response.
    /// - [`IngestError::Deserialize`] if a response body does not match the
    ///   expected shape.
    pub async fn fetch(
        &self,
        country: Country,
        query: &str,
        max_results: u32,
    ) -> Result<Vec<RawRecord>, IngestError> {
        let Some(api_key) = self.api_key.as_deref() else {
            tracing::info!("YOUTUBE_API_KEY not set; skipping YouTube fetch");
            return Ok(Vec::new());
        };

        let max_results = max_results.min(MAX_RESULTS_CEILING);
        let ids = self
            .search_video_ids(api_key, country, query, max_results)
            .await?;
        if ids.is_empty() {
            tracing::info!(country = %country, query, "YouTube search returned no video ids");
            return Ok(Vec::new());
        }

        tracing::debug!(country = %country, ids = ids.len(), "fetching YouTube video details");
        let videos = self.fetch_video_details(api_key, &ids).await?;

        Ok(videos
            .into_iter()
            .map(|video| to_record(video, country, query))
            .collect())
    }

    async fn search_video_ids(
        &self,
        api_key: &str,
        country: Country,
        query: &str,
        max_results: u32,
    ) -> Result<Vec<String>, IngestError> {
        let url = format!("{}/search", self.base_url);
        let response = self
            .client
            .get(&url)
            .query(&[
                ("part", "snippet"),
                ("q", query),
                ("type", "video"),
                ("maxResults", &max_results.to_string()),
                ("regionCode", country.code()),
                ("key", api_key),
            ])
            .send()
            .await?;

        let search: SearchResponse = decode(response, "YouTube search").await?;
        Ok(search
            .items
            .into_iter()
            .filter_map(|item| item.id.video_id)
            .collect())
    }

    async fn fetch_video_details(
        &self,
        api_key: &str,
        ids: &[String],
    ) -> Result<Vec<VideoItem>, IngestError> {
        let url = format!("{}/videos", self.base_url);
        let response = self
            .client
            .get(&url)
            .query(&[
                ("part", "statistics,snippet"),
                ("id", &ids.join(",")),
                ("key", api_key),
            ])
            .send()
            .await?;

        let videos: VideosResponse = decode(response, "YouTube videos").await?;
        Ok(videos.items)
    }
}

async fn decode<T: serde::de::DeserializeOwned>(
    response: reqwest::Response,
    context: &str,
) -> Result<T, IngestError> {
    let status = response.status();
    if !status.is_success() {
        return Err(IngestError::UnexpectedStatus {
            url: response.url().to_string(),
            status,
        });
    }
    let body = response.text().await?;
    serde_json::from_str(&body).map_err(|e| IngestError::Deserialize {
        context: context.to_owned(),
        source: e,
    })
}

fn to_record(video: VideoItem, country: Country, query: &str) -> RawRecord {
    let metrics = YouTubeMetrics::new(
        parse_count(video.statistics.view_count.as_deref()),
        parse_count(video.statistics.like_count.as_deref()),
        parse_count(video.statistics.comment_count.as_deref()),
    );

    let mut source_metadata = BTreeMap::new();
    source_metadata.insert(
        "video_id".to_owned(),
        serde_json::Value::String(video.id.clone()),
    );

    RawRecord {
        workflow: video.snippet.title.unwrap_or_else(|| query.to_owned()),
        platform: Platform::YouTube,
        metrics: Metrics::YouTube(metrics),
        country,
        score: None,
        source_url: Some(format!("https://www.youtube.com/watch?v={}", video.id)),
        source_metadata,
    }
}
