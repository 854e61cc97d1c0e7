//! Integration tests for `ForumClient` using wiremock HTTP mocks.

use wfpulse_ingest::ForumClient;

use wfpulse_core::{Country, Metrics};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn test_client(base_url: &str) -> ForumClient {
    ForumClient::new(base_url, 30).expect("client construction should not fail")
}

fn topic(id: u64, views: u64) -> serde_json::Value {
    serde_json::json!({
        "id": id,
        "title": format!("Topic {id}"),
        "reply_count": 5,
        "like_count": 10,
        "participant_count": 3,
        "views": views
    })
}

fn listing(topics: Vec<serde_json::Value>) -> serde_json::Value {
    serde_json::json!({ "topic_list": { "topics": topics } })
}

async fn mount_latest(server: &MockServer, topics: Vec<serde_json::Value>) {
    Mock::given(method("GET"))
        .and(path("/latest.json"))
        .and(query_param("order", "created"))
        .respond_with(ResponseTemplate::new(200).set_body_json(listing(topics)))
        .mount(server)
        .await;
}

async fn mount_top_weekly(server: &MockServer, topics: Vec<serde_json::Value>) {
    Mock::given(method("GET"))
        .and(path("/top/weekly.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(listing(topics)))
        .mount(server)
        .await;
}

fn topic_ids(records: &[wfpulse_core::RawRecord]) -> Vec<u64> {
    records
        .iter()
        .map(|r| r.source_metadata["topic_id"].as_u64().unwrap())
        .collect()
}

#[tokio::test]
async fn merges_listings_dedups_by_id_in_first_seen_order() {
    let server = MockServer::start().await;
    mount_latest(&server, vec![topic(1, 100), topic(2, 100)]).await;
    mount_top_weekly(&server, vec![topic(2, 999), topic(3, 100)]).await;

    let client = test_client(&server.uri());
    // detail_limit 0: listing metrics only, no /t/{id}.json traffic.
    let records = client.fetch(Country::Us, 40, 0).await.unwrap();

    assert_eq!(topic_ids(&records), vec![1, 2, 3]);
    // The duplicate keeps its first-seen slot but the weekly listing's
    // metrics win for it.
    let Metrics::Forum(m) = &records[1].metrics else {
        panic!("expected forum metrics");
    };
    assert_eq!(m.views, 999);
}

#[tokio::test]
async fn one_listing_failing_degrades_to_the_other() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/latest.json"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    mount_top_weekly(&server, vec![topic(7, 100), topic(8, 100)]).await;

    let client = test_client(&server.uri());
    let records = client.fetch(Country::Us, 40, 0).await.unwrap();

    assert_eq!(topic_ids(&records), vec![7, 8]);
}

#[tokio::test]
async fn both_listings_failing_yields_empty_not_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/latest.json"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/top/weekly.json"))
        .respond_with(ResponseTemplate::new(502))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let records = client.fetch(Country::Us, 40, 0).await.unwrap();
    assert!(records.is_empty());
}

#[tokio::test]
async fn truncates_combined_listing_to_max_topics() {
    let server = MockServer::start().await;
    mount_latest(&server, (1..=5).map(|id| topic(id, 100)).collect()).await;
    mount_top_weekly(&server, vec![]).await;

    let client = test_client(&server.uri());
    let records = client.fetch(Country::Us, 3, 0).await.unwrap();
    assert_eq!(topic_ids(&records), vec![1, 2, 3]);
}

#[tokio::test]
async fn detail_payload_raises_contributor_count() {
    let server = MockServer::start().await;
    mount_latest(&server, vec![topic(1, 100), topic(2, 100)]).await;
    mount_top_weekly(&server, vec![]).await;

    // Topic 1: detail reports 6 participants, more than the listing's 3.
    Mock::given(method("GET"))
        .and(path("/t/1.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "details": { "participants": [ {}, {}, {}, {}, {}, {} ] }
        })))
        .expect(1)
        .mount(&server)
        .await;

    // detail_limit 1: topic 2 must not get a detail request; its metrics
    // come from the listing alone and it still appears in the output.
    let client = test_client(&server.uri());
    let records = client.fetch(Country::Us, 40, 1).await.unwrap();

    assert_eq!(topic_ids(&records), vec![1, 2]);
    let Metrics::Forum(m) = &records[0].metrics else {
        panic!("expected forum metrics");
    };
    assert_eq!(m.contributors, 6);
    let Metrics::Forum(m) = &records[1].metrics else {
        panic!("expected forum metrics");
    };
    assert_eq!(m.contributors, 3);

    let detail_requests = server
        .received_requests()
        .await
        .unwrap()
        .into_iter()
        .filter(|r| r.url.path().starts_with("/t/"))
        .count();
    assert_eq!(detail_requests, 1);
}

#[tokio::test]
async fn failed_detail_fetch_keeps_topic_with_listing_metrics() {
    let server = MockServer::start().await;
    mount_latest(&server, vec![topic(5, 123)]).await;
    mount_top_weekly(&server, vec![]).await;
    Mock::given(method("GET"))
        .and(path("/t/5.json"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let records = client.fetch(Country::In, 40, 20).await.unwrap();

    assert_eq!(records.len(), 1);
    let Metrics::Forum(m) = &records[0].metrics else {
        panic!("expected forum metrics");
    };
    assert_eq!(m.views, 123);
    assert_eq!(records[0].source_url.as_deref().unwrap(), format!("{}/t/5", server.uri()));
}
