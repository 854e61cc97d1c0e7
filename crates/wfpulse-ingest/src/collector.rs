//! Collection orchestration.
//!
//! One collector run walks every configured country and drives the three
//! platform clients sequentially — country-major, platform-minor — which
//! bounds load on the external services and keeps output ordering
//! deterministic. A failed platform contributes nothing; it never discards
//! what the other platforms returned.

use wfpulse_core::{AppConfig, Country, RawRecord, WorkflowRecord};

use crate::error::IngestError;
use crate::scoring;
use crate::sources::{ForumClient, TrendsClient, YouTubeClient};

/// Videos requested per YouTube search.
pub const YOUTUBE_MAX_RESULTS: u32 = 50;

/// Combined-listing cap for the forum fetch.
pub const FORUM_MAX_TOPICS: usize = 40;

/// Topics enriched with a per-topic detail payload.
pub const FORUM_DETAIL_LIMIT: usize = 20;

/// Drives all platform fetchers and assembles the scored snapshot contents.
pub struct Collector {
    countries: Vec<Country>,
    search_query: String,
    keywords: Vec<String>,
    youtube: YouTubeClient,
    forum: ForumClient,
    trends: TrendsClient,
}

impl Collector {
    /// Builds a collector with clients wired from `config`.
    ///
    /// # Errors
    ///
    /// Returns [`IngestError::Http`] if an HTTP client cannot be constructed.
    pub fn from_config(config: &AppConfig) -> Result<Self, IngestError> {
        Ok(Self::new(
            config.countries.clone(),
            config.search_query.clone(),
            config.trend_keywords(),
            YouTubeClient::new(config.youtube_api_key.clone(), config.http_timeout_secs)?,
            ForumClient::new(&config.discourse_base_url, config.http_timeout_secs)?,
            TrendsClient::from_config(config),
        ))
    }

    /// Builds a collector from pre-constructed clients (tests point these
    /// at mock servers).
    #[must_use]
    pub fn new(
        countries: Vec<Country>,
        search_query: String,
        keywords: Vec<String>,
        youtube: YouTubeClient,
        forum: ForumClient,
        trends: TrendsClient,
    ) -> Self {
        Self {
            countries,
            search_query,
            keywords,
            youtube,
            forum,
            trends,
        }
    }

    /// Runs one full collection across all countries and platforms and
    /// returns the flattened, fully scored record list.
    ///
    /// Never fails: every fetcher error is logged and degraded to an empty
    /// contribution for that (country, platform) pair.
    pub async fn collect_all(&self) -> Vec<WorkflowRecord> {
        let mut raw: Vec<RawRecord> = Vec::new();

        for &country in &self.countries {
            tracing::info!(country = %country, "collecting platform signals");

            match self
                .youtube
                .fetch(country, &self.search_query, YOUTUBE_MAX_RESULTS)
                .await
            {
                Ok(records) => {
                    tracing::info!(country = %country, count = records.len(), "collected YouTube records");
                    raw.extend(records);
                }
                Err(e) => {
                    tracing::warn!(country = %country, source = "youtube", error = %e, "YouTube fetch failed");
                }
            }

            match self
                .forum
                .fetch(country, FORUM_MAX_TOPICS, FORUM_DETAIL_LIMIT)
                .await
            {
                Ok(records) => {
                    tracing::info!(country = %country, count = records.len(), "collected forum records");
                    raw.extend(records);
                }
                Err(e) => {
                    tracing::warn!(country = %country, source = "forum", error = %e, "forum fetch failed");
                }
            }

            match self.trends.fetch(country, &self.keywords).await {
                Ok(records) => {
                    tracing::info!(country = %country, count = records.len(), "collected search-interest records");
                    raw.extend(records);
                }
                Err(e) => {
                    tracing::warn!(country = %country, source = "trends", error = %e, "search-interest fetch failed");
                }
            }
        }

        let total = raw.len();
        let scored = enrich(raw);
        tracing::info!(total, "collection complete");
        scored
    }
}

/// Score every record that arrived unscored; trends records pass through
/// with the score they were emitted with.
fn enrich(raw: Vec<RawRecord>) -> Vec<WorkflowRecord> {
    raw.into_iter()
        .map(|mut record| {
            let score = match record.score {
                Some(score) => score,
                None => scoring::compute_popularity(&mut record.metrics),
            };
            record.into_scored(score)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use wfpulse_core::{Metrics, Platform, YouTubeMetrics};

    use super::*;

    fn unscored(workflow: &str) -> RawRecord {
        RawRecord {
            workflow: workflow.to_owned(),
            platform: Platform::YouTube,
            metrics: Metrics::YouTube(YouTubeMetrics::new(100_000, 1_000, 100)),
            country: Country::Us,
            score: None,
            source_url: None,
            source_metadata: BTreeMap::new(),
        }
    }

    #[test]
    fn enrich_scores_unscored_records() {
        let scored = enrich(vec![unscored("a"), unscored("b")]);
        assert_eq!(scored.len(), 2);
        for record in &scored {
            assert!((0.0..=1.0).contains(&record.popularity_score));
            let Metrics::YouTube(m) = &record.popularity_metrics else {
                panic!("expected youtube metrics");
            };
            assert!(m.like_to_view_ratio.is_some());
        }
    }

    #[test]
    fn enrich_preserves_existing_scores() {
        let mut record = unscored("pre-scored");
        record.score = Some(0.875);
        let scored = enrich(vec![record]);
        assert!((scored[0].popularity_score - 0.875).abs() < f64::EPSILON);
        // Pass-through means no ratio augmentation either.
        let Metrics::YouTube(m) = &scored[0].popularity_metrics else {
            panic!("expected youtube metrics");
        };
        assert!(m.like_to_view_ratio.is_none());
    }
}
