//! Discourse forum client.
//!
//! Combines the "latest created" and "top of week" listings, dedupes by
//! topic id, and enriches the head of the combined list with per-topic
//! detail payloads. Detail fetches are a cost-control measure: topics past
//! the detail limit still appear in the output with listing-only metrics.

use std::collections::{BTreeMap, HashMap};
use std::time::Duration;

use serde::Deserialize;

use wfpulse_core::{Country, ForumMetrics, Metrics, Platform, RawRecord};

use crate::error::IngestError;
use crate::sources::USER_AGENT;

#[derive(Debug, Clone, Deserialize)]
struct TopicSummary {
    id: u64,
    title: Option<String>,
    reply_count: Option<u64>,
    like_count: Option<u64>,
    participant_count: Option<u64>,
    views: Option<u64>,
}

/// `/latest.json` nests topics under `topic_list`; some listing variants
/// return a bare `topics` array. Accept both.
#[derive(Debug, Deserialize)]
struct ListingResponse {
    topic_list: Option<TopicList>,
    topics: Option<Vec<TopicSummary>>,
}

#[derive(Debug, Deserialize)]
struct TopicList {
    #[serde(default)]
    topics: Vec<TopicSummary>,
}

impl ListingResponse {
    fn into_topics(self) -> Vec<TopicSummary> {
        self.topic_list
            .map(|list| list.topics)
            .or(self.topics)
            .unwrap_or_default()
    }
}

#[derive(Debug, Deserialize)]
struct TopicDetail {
    reply_count: Option<u64>,
    like_count: Option<u64>,
    views: Option<u64>,
    details: Option<DetailSection>,
}

#[derive(Debug, Deserialize)]
struct DetailSection {
    participants: Option<Vec<serde_json::Value>>,
    posters: Option<Vec<serde_json::Value>>,
}

impl TopicDetail {
    /// Number of distinct people seen in the detail payload: the
    /// `participants` array when it has entries, else `posters`.
    fn participant_count(&self) -> u64 {
        let Some(details) = &self.details else {
            return 0;
        };
        let count = details
            .participants
            .as_ref()
            .filter(|p| !p.is_empty())
            .or(details.posters.as_ref())
            .map_or(0, Vec::len);
        count as u64
    }
}

/// Read-only client for a Discourse forum.
pub struct ForumClient {
    client: reqwest::Client,
    base_url: String,
}

impl ForumClient {
    /// Creates a client for the forum at `base_url`.
    ///
    /// # Errors
    ///
    /// Returns [`IngestError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(base_url: &str, timeout_secs: u64) -> Result<Self, IngestError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_owned(),
        })
    }

    /// Fetches up to `max_topics` deduplicated topics, enriching the first
    /// `detail_limit` of them with per-topic detail payloads.
    ///
    /// Either listing failing degrades to an empty contribution from that
    /// listing; a failed detail fetch falls back to listing metrics. Both
    /// are logged, neither aborts the fetch.
    ///
    /// # Errors
    ///
    /// Currently only [`IngestError::Http`] from client construction paths;
    /// listing and detail failures are absorbed as partial results.
    pub async fn fetch(
        &self,
        country: Country,
        max_topics: usize,
        detail_limit: usize,
    ) -> Result<Vec<RawRecord>, IngestError> {
        let latest = self.listing("/latest.json?order=created").await;
        let top_week = self.listing("/top/weekly.json").await;

        // Dedup by id, first-seen order; a duplicate's later occurrence
        // (top-of-week) supplies the metrics for that slot.
        let mut order: Vec<u64> = Vec::new();
        let mut by_id: HashMap<u64, TopicSummary> = HashMap::new();
        for topic in latest.into_iter().chain(top_week) {
            if !by_id.contains_key(&topic.id) {
                order.push(topic.id);
            }
            by_id.insert(topic.id, topic);
        }
        order.truncate(max_topics);

        let mut details: HashMap<u64, TopicDetail> = HashMap::new();
        for id in order.iter().take(detail_limit) {
            match self.topic_detail(*id).await {
                Ok(detail) => {
                    details.insert(*id, detail);
                }
                Err(e) => {
                    tracing::debug!(
                        topic = id,
                        error = %e,
                        "topic detail fetch failed; falling back to listing metrics"
                    );
                }
            }
        }

        let records = order
            .iter()
            .filter_map(|id| by_id.remove(id))
            .map(|topic| {
                let detail = details.get(&topic.id);
                to_record(&topic, detail, country, &self.base_url)
            })
            .collect::<Vec<_>>();

        tracing::debug!(country = %country, topics = records.len(), "collected forum topics");
        Ok(records)
    }

    /// One listing endpoint; failure degrades to an empty list for this
    /// listing only so the other listing still contributes.
    async fn listing(&self, path: &str) -> Vec<TopicSummary> {
        match self.get_listing(path).await {
            Ok(topics) => {
                tracing::debug!(path, topics = topics.len(), "fetched forum listing");
                topics
            }
            Err(e) => {
                tracing::warn!(path, error = %e, "forum listing fetch failed");
                Vec::new()
            }
        }
    }

    async fn get_listing(&self, path: &str) -> Result<Vec<TopicSummary>, IngestError> {
        let url = format!("{}{path}", self.base_url);
        let response = self.client.get(&url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(IngestError::UnexpectedStatus { url, status });
        }
        let body = response.text().await?;
        let listing: ListingResponse =
            serde_json::from_str(&body).map_err(|e| IngestError::Deserialize {
                context: format!("forum listing {path}"),
                source: e,
            })?;
        Ok(listing.into_topics())
    }

    async fn topic_detail(&self, id: u64) -> Result<TopicDetail, IngestError> {
        let url = format!("{}/t/{id}.json", self.base_url);
        let response = self.client.get(&url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(IngestError::UnexpectedStatus { url, status });
        }
        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| IngestError::Deserialize {
            context: format!("forum topic {id}"),
            source: e,
        })
    }
}

fn to_record(
    topic: &TopicSummary,
    detail: Option<&TopicDetail>,
    country: Country,
    base_url: &str,
) -> RawRecord {
    let replies = topic
        .reply_count
        .or_else(|| detail.and_then(|d| d.reply_count))
        .unwrap_or(0);
    let likes = topic
        .like_count
        .or_else(|| detail.and_then(|d| d.like_count))
        .unwrap_or(0);
    let views = topic
        .views
        .or_else(|| detail.and_then(|d| d.views))
        .unwrap_or(0);

    // Two participant signals can disagree (the listing counts the whole
    // topic, the detail payload only the first page); take the larger.
    let contributors = topic
        .participant_count
        .unwrap_or(0)
        .max(detail.map_or(0, TopicDetail::participant_count));

    let mut source_metadata = BTreeMap::new();
    source_metadata.insert("topic_id".to_owned(), serde_json::Value::from(topic.id));

    RawRecord {
        workflow: topic
            .title
            .clone()
            .unwrap_or_else(|| "n8n workflow discussion".to_owned()),
        platform: Platform::Forum,
        metrics: Metrics::Forum(ForumMetrics::new(views, replies, likes, contributors)),
        country,
        score: None,
        source_url: Some(format!("{base_url}/t/{}", topic.id)),
        source_metadata,
    }
}
