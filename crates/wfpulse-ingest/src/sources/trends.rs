//! Search-interest client.
//!
//! Talks to an interest-over-time gateway in batches of three keywords —
//! the upstream per-request ceiling — with a fresh session per batch and
//! mandatory pauses around each request to stay under the service's rate
//! limits. Records are scored inline: the series math is cheapest to finish
//! while the series is in hand.

use std::collections::{BTreeMap, HashMap};
use std::time::Duration;

use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};
use serde::Deserialize;

use wfpulse_core::{AppConfig, Country, GoogleMetrics, Metrics, Platform, RawRecord};

use crate::error::IngestError;
use crate::retry::retry_with_backoff;
use crate::scoring;
use crate::sources::USER_AGENT;

/// Upstream keyword ceiling per interest-over-time request.
const BATCH_SIZE: usize = 3;

/// Fixed trailing window requested from the gateway.
const TIMEFRAME: &str = "today 12-m";

/// Points of the series tail averaged into `interest_score`.
const INTEREST_WINDOW: usize = 14;

#[derive(Debug, Deserialize)]
struct InterestResponse {
    /// Keyword → interest values over the requested window, oldest first.
    #[serde(default)]
    series: HashMap<String, Vec<f64>>,
}

/// Client for the interest-over-time gateway.
///
/// Without a configured gateway URL the client is inert and
/// [`TrendsClient::fetch`] returns an empty list.
pub struct TrendsClient {
    gateway_url: Option<String>,
    proxy_http: Option<String>,
    proxy_https: Option<String>,
    retries: u32,
    backoff_base_ms: u64,
    pre_request_pause: Duration,
    batch_pause: Duration,
    timeout_secs: u64,
}

impl TrendsClient {
    #[must_use]
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            gateway_url: config.trends_api_url.clone(),
            proxy_http: config.trends_proxy_http.clone(),
            proxy_https: config.trends_proxy_https.clone(),
            retries: config.trends_retries,
            backoff_base_ms: config.trends_backoff_base_ms,
            pre_request_pause: Duration::from_millis(config.trends_pre_request_pause_ms),
            batch_pause: Duration::from_millis(config.trends_batch_pause_ms),
            timeout_secs: config.http_timeout_secs,
        }
    }

    /// Creates a client with explicit pauses, for tests that must not sleep.
    #[must_use]
    pub fn with_pauses(
        gateway_url: Option<String>,
        timeout_secs: u64,
        pre_request_pause: Duration,
        batch_pause: Duration,
    ) -> Self {
        Self {
            gateway_url,
            proxy_http: None,
            proxy_https: None,
            retries: 0,
            backoff_base_ms: 0,
            pre_request_pause,
            batch_pause,
            timeout_secs,
        }
    }

    /// Fetches interest series for `keywords` in `country` and emits one
    /// already-scored record per keyword the gateway returned data for.
    ///
    /// A failed batch is logged and skipped; later batches still run. The
    /// post-batch pause applies regardless of outcome.
    ///
    /// # Errors
    ///
    /// Only client-construction failures surface; per-batch request errors
    /// are absorbed.
    pub async fn fetch(
        &self,
        country: Country,
        keywords: &[String],
    ) -> Result<Vec<RawRecord>, IngestError> {
        let Some(gateway) = self.gateway_url.as_deref() else {
            tracing::info!("TRENDS_API_URL not set; skipping search-interest fetch");
            return Ok(Vec::new());
        };

        let mut records = Vec::new();
        for batch in keywords.chunks(BATCH_SIZE) {
            match self.fetch_batch(gateway, country, batch).await {
                Ok(batch_records) => {
                    tracing::debug!(
                        country = %country,
                        keywords = batch.len(),
                        records = batch_records.len(),
                        "processed search-interest batch"
                    );
                    records.extend(batch_records);
                }
                Err(e) => {
                    tracing::warn!(
                        country = %country,
                        keywords = ?batch,
                        error = %e,
                        "search-interest batch failed; continuing with next batch"
                    );
                }
            }

            // Mandatory inter-batch pause, success or not, to stay under
            // the upstream rate limit.
            tokio::time::sleep(self.batch_pause).await;
        }

        Ok(records)
    }

    async fn fetch_batch(
        &self,
        gateway: &str,
        country: Country,
        keywords: &[String],
    ) -> Result<Vec<RawRecord>, IngestError> {
        // Fresh session per batch; reusing one across batches trips the
        // upstream's session heuristics.
        let client = self.build_client()?;
        let url = format!("{}/interest-over-time", gateway.trim_end_matches('/'));

        tokio::time::sleep(self.pre_request_pause).await;

        let response: InterestResponse =
            retry_with_backoff(self.retries, self.backoff_base_ms, || {
                let client = client.clone();
                let url = url.clone();
                let joined = keywords.join(",");
                async move {
                    let response = client
                        .get(&url)
                        .query(&[
                            ("keywords", joined.as_str()),
                            ("geo", country.code()),
                            ("timeframe", TIMEFRAME),
                        ])
                        .send()
                        .await?;
                    let status = response.status();
                    if !status.is_success() {
                        return Err(IngestError::UnexpectedStatus { url, status });
                    }
                    let body = response.text().await?;
                    serde_json::from_str(&body).map_err(|e| IngestError::Deserialize {
                        context: "interest-over-time".to_owned(),
                        source: e,
                    })
                }
            })
            .await?;

        let mut records = Vec::new();
        for keyword in keywords {
            let Some(values) = response.series.get(keyword) else {
                tracing::debug!(keyword, "gateway returned no series for keyword");
                continue;
            };
            records.push(to_record(keyword, values, country));
        }
        Ok(records)
    }

    fn build_client(&self) -> Result<reqwest::Client, IngestError> {
        let mut builder = reqwest::Client::builder()
            .timeout(Duration::from_secs(self.timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(USER_AGENT);

        if let Some(proxy) = &self.proxy_http {
            builder = builder.proxy(reqwest::Proxy::http(proxy)?);
        }
        if let Some(proxy) = &self.proxy_https {
            builder = builder.proxy(reqwest::Proxy::https(proxy)?);
        }

        Ok(builder.build()?)
    }
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    #[allow(clippy::cast_precision_loss)]
    let denom = values.len() as f64;
    values.iter().sum::<f64>() / denom
}

fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

fn round4(x: f64) -> f64 {
    (x * 10_000.0).round() / 10_000.0
}

/// Mean of the trailing [`INTEREST_WINDOW`] points, clamped to the series
/// length.
fn interest_score(values: &[f64]) -> f64 {
    let window = values.len().min(INTEREST_WINDOW);
    round2(mean(&values[values.len() - window..]))
}

/// Fractional change between the mean of the last 30 points and the mean of
/// the 30 points before them. Series shorter than 60 points carry no trend.
fn trend_30d_change(values: &[f64]) -> f64 {
    if values.len() < 60 {
        return 0.0;
    }
    let last30 = mean(&values[values.len() - 30..]);
    let prev30 = mean(&values[values.len() - 60..values.len() - 30]);
    if prev30 == 0.0 {
        return 0.0;
    }
    round4((last30 - prev30) / prev30)
}

fn explore_url(keyword: &str, country: Country) -> String {
    let date = utf8_percent_encode(TIMEFRAME, NON_ALPHANUMERIC);
    let q = utf8_percent_encode(keyword, NON_ALPHANUMERIC);
    format!(
        "https://trends.google.com/trends/explore?date={date}&q={q}&geo={}",
        country.code()
    )
}

fn to_record(keyword: &str, values: &[f64], country: Country) -> RawRecord {
    let mut metrics = Metrics::Google(GoogleMetrics {
        interest_score: interest_score(values),
        trend_30d_change: trend_30d_change(values),
        monthly_search_volume: None,
    });
    let score = scoring::compute_popularity(&mut metrics);

    let mut source_metadata = BTreeMap::new();
    source_metadata.insert(
        "keyword".to_owned(),
        serde_json::Value::String(keyword.to_owned()),
    );
    source_metadata.insert(
        "timeframe".to_owned(),
        serde_json::Value::String(TIMEFRAME.to_owned()),
    );

    RawRecord {
        workflow: keyword.to_owned(),
        platform: Platform::Google,
        metrics,
        country,
        score: Some(score),
        source_url: Some(explore_url(keyword, country)),
        source_metadata,
    }
}
