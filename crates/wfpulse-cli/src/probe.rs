//! Manual source diagnostics, outside the collection pipeline.
//!
//! Fires one small request at each configured source and prints what came
//! back, so credential and connectivity problems can be checked without
//! touching the snapshot.

use wfpulse_core::{AppConfig, Country, Metrics, RawRecord};
use wfpulse_ingest::{ForumClient, TrendsClient, YouTubeClient};

/// Search-page size for the video probe.
const PROBE_RESULTS: u32 = 5;

/// Listing depth for the forum probe.
const PROBE_TOPICS: usize = 5;

pub async fn run(config: &AppConfig) -> anyhow::Result<()> {
    let country = config.countries.first().copied().unwrap_or(Country::Us);
    println!("probing sources for {country}\n");

    probe_youtube(config, country).await;
    probe_forum(config, country).await;
    probe_trends(config, country).await;

    Ok(())
}

async fn probe_youtube(config: &AppConfig, country: Country) {
    println!("== YouTube ==");
    let client = match YouTubeClient::new(config.youtube_api_key.clone(), config.http_timeout_secs)
    {
        Ok(client) => client,
        Err(e) => {
            println!("  client error: {e}\n");
            return;
        }
    };

    match client
        .fetch(country, &config.search_query, PROBE_RESULTS)
        .await
    {
        Ok(records) if records.is_empty() => {
            println!("  no results (is YOUTUBE_API_KEY set?)\n");
        }
        Ok(records) => print_records(&records),
        Err(e) => println!("  fetch error: {e}\n"),
    }
}

async fn probe_forum(config: &AppConfig, country: Country) {
    println!("== Forum ({}) ==", config.discourse_base_url);
    let client = match ForumClient::new(&config.discourse_base_url, config.http_timeout_secs) {
        Ok(client) => client,
        Err(e) => {
            println!("  client error: {e}\n");
            return;
        }
    };

    match client.fetch(country, PROBE_TOPICS, PROBE_TOPICS).await {
        Ok(records) if records.is_empty() => println!("  no topics returned\n"),
        Ok(records) => print_records(&records),
        Err(e) => println!("  fetch error: {e}\n"),
    }
}

async fn probe_trends(config: &AppConfig, country: Country) {
    println!("== Search interest ==");
    if config.trends_api_url.is_none() {
        println!("  skipped (TRENDS_API_URL not set)\n");
        return;
    }

    let keywords: Vec<String> = config.trend_keywords().into_iter().take(3).collect();
    let client = TrendsClient::from_config(config);

    match client.fetch(country, &keywords).await {
        Ok(records) if records.is_empty() => println!("  no series returned\n"),
        Ok(records) => print_records(&records),
        Err(e) => println!("  fetch error: {e}\n"),
    }
}

fn print_records(records: &[RawRecord]) {
    for record in records {
        let summary = match &record.metrics {
            Metrics::YouTube(m) => {
                format!("views {}, likes {}, comments {}", m.views, m.likes, m.comments)
            }
            Metrics::Forum(m) => format!(
                "views {}, replies {}, likes {}, contributors {}",
                m.views, m.replies, m.likes, m.contributors
            ),
            Metrics::Google(m) => format!(
                "interest {}, 30d change {}",
                m.interest_score, m.trend_30d_change
            ),
        };
        println!("  - {} ({summary})", record.workflow);
    }
    println!();
}
