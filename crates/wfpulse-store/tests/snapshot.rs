//! Integration tests for `SnapshotStore` against a real temp directory.

use std::collections::BTreeMap;
use std::fs;

use wfpulse_store::SnapshotStore;

use wfpulse_core::{
    Country, ForumMetrics, GoogleMetrics, Metrics, Platform, WorkflowRecord, YouTubeMetrics,
};

fn sample_records() -> Vec<WorkflowRecord> {
    vec![
        WorkflowRecord {
            workflow: "Automate Slack with n8n".to_owned(),
            platform: Platform::YouTube,
            popularity_metrics: Metrics::YouTube(YouTubeMetrics {
                views: 5000,
                likes: 200,
                comments: 40,
                like_to_view_ratio: Some(0.04),
                comment_to_view_ratio: Some(0.008),
            }),
            country: Country::Us,
            popularity_score: 0.2455,
            source_url: Some("https://www.youtube.com/watch?v=vid-1".to_owned()),
            source_metadata: BTreeMap::new(),
        },
        WorkflowRecord {
            workflow: "Webhook loops".to_owned(),
            platform: Platform::Forum,
            popularity_metrics: Metrics::Forum(ForumMetrics {
                views: 800,
                replies: 4,
                likes: 9,
                contributors: 5,
                reply_to_view_ratio: Some(0.005),
                like_to_view_ratio: Some(0.01125),
            }),
            country: Country::Us,
            popularity_score: 0.036333,
            source_url: Some("https://community.n8n.io/t/11".to_owned()),
            source_metadata: BTreeMap::new(),
        },
        WorkflowRecord {
            workflow: "n8n Slack integration".to_owned(),
            platform: Platform::Google,
            popularity_metrics: Metrics::Google(GoogleMetrics {
                interest_score: 30.0,
                trend_30d_change: 0.0,
                monthly_search_volume: None,
            }),
            country: Country::In,
            popularity_score: 0.19,
            source_url: None,
            source_metadata: BTreeMap::new(),
        },
    ]
}

#[test]
fn save_then_load_round_trips_in_order() {
    let dir = tempfile::tempdir().unwrap();
    let store = SnapshotStore::new(dir.path().join("workflows.json"));

    let records = sample_records();
    store.save_all(&records).unwrap();

    assert_eq!(store.load_all(), records);
}

#[test]
fn empty_snapshot_round_trips() {
    let dir = tempfile::tempdir().unwrap();
    let store = SnapshotStore::new(dir.path().join("workflows.json"));

    store.save_all(&[]).unwrap();
    assert!(store.load_all().is_empty());
}

#[test]
fn missing_file_loads_as_empty() {
    let dir = tempfile::tempdir().unwrap();
    let store = SnapshotStore::new(dir.path().join("nope.json"));
    assert!(store.load_all().is_empty());
}

#[test]
fn corrupt_file_loads_as_empty() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("workflows.json");
    fs::write(&path, "{ definitely not an array").unwrap();

    let store = SnapshotStore::new(&path);
    assert!(store.load_all().is_empty());
}

#[test]
fn non_array_json_loads_as_empty() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("workflows.json");
    fs::write(&path, r#"{"workflow": "not a sequence"}"#).unwrap();

    let store = SnapshotStore::new(&path);
    assert!(store.load_all().is_empty());
}

#[test]
fn save_creates_missing_parent_directories() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested/deeper/workflows.json");

    let store = SnapshotStore::new(&path);
    store.save_all(&sample_records()).unwrap();

    assert!(path.exists());
    assert_eq!(store.load_all().len(), 3);
}

#[test]
fn save_replaces_prior_snapshot_wholesale() {
    let dir = tempfile::tempdir().unwrap();
    let store = SnapshotStore::new(dir.path().join("workflows.json"));

    store.save_all(&sample_records()).unwrap();
    store.save_all(&sample_records()[..1]).unwrap();

    let records = store.load_all();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].workflow, "Automate Slack with n8n");
}

#[test]
fn save_leaves_no_temp_files_behind() {
    let dir = tempfile::tempdir().unwrap();
    let store = SnapshotStore::new(dir.path().join("workflows.json"));
    store.save_all(&sample_records()).unwrap();

    let entries: Vec<_> = fs::read_dir(dir.path())
        .unwrap()
        .map(|e| e.unwrap().file_name())
        .collect();
    assert_eq!(entries, vec!["workflows.json"]);
}

#[test]
fn stats_counts_by_platform_and_country() {
    let dir = tempfile::tempdir().unwrap();
    let store = SnapshotStore::new(dir.path().join("workflows.json"));
    store.save_all(&sample_records()).unwrap();

    let stats = store.stats();
    assert_eq!(stats.total, 3);
    assert_eq!(stats.by_platform.get("YouTube"), Some(&1));
    assert_eq!(stats.by_platform.get("Forum"), Some(&1));
    assert_eq!(stats.by_platform.get("Google"), Some(&1));
    assert_eq!(stats.by_country.get("US"), Some(&2));
    assert_eq!(stats.by_country.get("IN"), Some(&1));
}

#[test]
fn stats_on_missing_file_is_all_zero() {
    let dir = tempfile::tempdir().unwrap();
    let store = SnapshotStore::new(dir.path().join("nope.json"));

    let stats = store.stats();
    assert_eq!(stats.total, 0);
    assert!(stats.by_platform.is_empty());
    assert!(stats.by_country.is_empty());
}

#[test]
fn persisted_shape_matches_the_published_contract() {
    let dir = tempfile::tempdir().unwrap();
    let store = SnapshotStore::new(dir.path().join("workflows.json"));
    store.save_all(&sample_records()).unwrap();

    let raw = fs::read_to_string(store.path()).unwrap();
    let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
    let first = &value.as_array().unwrap()[0];
    for field in [
        "workflow",
        "platform",
        "popularity_metrics",
        "country",
        "popularity_score",
        "source_url",
        "source_metadata",
    ] {
        assert!(first.get(field).is_some(), "missing field {field}");
    }
}
