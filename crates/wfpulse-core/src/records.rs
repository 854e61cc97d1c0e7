use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// External signal source a record was observed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Platform {
    YouTube,
    Forum,
    Google,
}

impl Platform {
    /// Parse a platform name as it appears on the wire (`"YouTube"`,
    /// `"Forum"`, `"Google"`). Returns `None` for anything else.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "YouTube" => Some(Self::YouTube),
            "Forum" => Some(Self::Forum),
            "Google" => Some(Self::Google),
            _ => None,
        }
    }

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::YouTube => "YouTube",
            Self::Forum => "Forum",
            Self::Google => "Google",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// ISO region code a record was collected for.
///
/// The set is closed here but extension only requires a new variant; all
/// parsing goes through [`Country::from_code`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Country {
    #[serde(rename = "US")]
    Us,
    #[serde(rename = "IN")]
    In,
}

impl Country {
    /// Parse an ISO region code, case-insensitively. Returns `None` for
    /// codes outside the supported set.
    #[must_use]
    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim().to_ascii_uppercase().as_str() {
            "US" => Some(Self::Us),
            "IN" => Some(Self::In),
            _ => None,
        }
    }

    #[must_use]
    pub fn code(self) -> &'static str {
        match self {
            Self::Us => "US",
            Self::In => "IN",
        }
    }
}

impl fmt::Display for Country {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Engagement counters for a YouTube video.
///
/// Ratio fields are absent until the record passes through scoring and are
/// always present afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YouTubeMetrics {
    pub views: u64,
    pub likes: u64,
    pub comments: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub like_to_view_ratio: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment_to_view_ratio: Option<f64>,
}

impl YouTubeMetrics {
    #[must_use]
    pub fn new(views: u64, likes: u64, comments: u64) -> Self {
        Self {
            views,
            likes,
            comments,
            like_to_view_ratio: None,
            comment_to_view_ratio: None,
        }
    }
}

/// Engagement counters for a forum topic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForumMetrics {
    pub views: u64,
    pub replies: u64,
    pub likes: u64,
    pub contributors: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reply_to_view_ratio: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub like_to_view_ratio: Option<f64>,
}

impl ForumMetrics {
    #[must_use]
    pub fn new(views: u64, replies: u64, likes: u64, contributors: u64) -> Self {
        Self {
            views,
            replies,
            likes,
            contributors,
            reply_to_view_ratio: None,
            like_to_view_ratio: None,
        }
    }
}

/// Search-interest measurements for a keyword.
///
/// `monthly_search_volume` is only populated by richer offline sources; the
/// live gateway path leaves it unset and scoring treats it as 0.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GoogleMetrics {
    pub interest_score: f64,
    pub trend_30d_change: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub monthly_search_volume: Option<f64>,
}

/// Platform-specific metric payload.
///
/// Closed variant set rather than an open map: each platform's fields are
/// fixed and typo-proof, and the wire shape (untagged object) stays
/// compatible with the persisted snapshot format. Deserialization
/// discriminates on required fields — `comments` (YouTube), `contributors`
/// (Forum), `interest_score` (Google) — which are mutually exclusive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Metrics {
    YouTube(YouTubeMetrics),
    Forum(ForumMetrics),
    Google(GoogleMetrics),
}

impl Metrics {
    /// Platform this payload belongs to.
    #[must_use]
    pub fn platform(&self) -> Platform {
        match self {
            Self::YouTube(_) => Platform::YouTube,
            Self::Forum(_) => Platform::Forum,
            Self::Google(_) => Platform::Google,
        }
    }
}

/// One scored observation of a workflow/keyword on one platform in one
/// country. This is the exact shape persisted in the snapshot file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowRecord {
    pub workflow: String,
    pub platform: Platform,
    pub popularity_metrics: Metrics,
    pub country: Country,
    /// Always in `[0.0, 1.0]`.
    pub popularity_score: f64,
    pub source_url: Option<String>,
    #[serde(default)]
    pub source_metadata: BTreeMap<String, serde_json::Value>,
}

/// A fetcher observation before enrichment.
///
/// `score` is `None` for YouTube and forum output; the trends fetcher scores
/// its records in place and emits them with `Some`.
#[derive(Debug, Clone)]
pub struct RawRecord {
    pub workflow: String,
    pub platform: Platform,
    pub metrics: Metrics,
    pub country: Country,
    pub score: Option<f64>,
    pub source_url: Option<String>,
    pub source_metadata: BTreeMap<String, serde_json::Value>,
}

impl RawRecord {
    /// Finalize into a persistable record with the given score.
    #[must_use]
    pub fn into_scored(self, score: f64) -> WorkflowRecord {
        WorkflowRecord {
            workflow: self.workflow,
            platform: self.platform,
            popularity_metrics: self.metrics,
            country: self.country,
            popularity_score: score,
            source_url: self.source_url,
            source_metadata: self.source_metadata,
        }
    }
}

#[cfg(test)]
#[path = "records_test.rs"]
mod tests;
