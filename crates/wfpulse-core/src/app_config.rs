use std::net::SocketAddr;
use std::path::PathBuf;

use crate::records::Country;

/// Process-wide configuration, loaded once at startup.
///
/// Credentials are optional: a missing YouTube key or trends gateway URL
/// disables that fetcher rather than failing startup.
#[derive(Clone)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    pub log_level: String,
    /// Path of the persisted snapshot file.
    pub data_file: PathBuf,
    /// Five-field cron expression (minute hour day month day-of-week).
    pub cron_schedule: String,
    /// Region codes collected on every refresh, in collection order.
    pub countries: Vec<Country>,
    pub search_query: String,
    pub youtube_api_key: Option<String>,
    pub discourse_base_url: String,
    // Accepted for completeness; the read-only listing endpoints used by the
    // forum fetcher do not require them.
    pub discourse_api_key: Option<String>,
    pub discourse_api_username: Option<String>,
    /// Interest-over-time gateway. Unset disables the trends fetcher.
    pub trends_api_url: Option<String>,
    pub trends_proxy_http: Option<String>,
    pub trends_proxy_https: Option<String>,
    pub trends_retries: u32,
    pub trends_backoff_base_ms: u64,
    /// Raw comma-separated keyword list; see [`AppConfig::trend_keywords`].
    pub trends_keywords: String,
    pub trends_pre_request_pause_ms: u64,
    pub trends_batch_pause_ms: u64,
    pub http_timeout_secs: u64,
}

impl AppConfig {
    /// Keyword list for the trends fetcher: comma-split, trimmed, blanks
    /// discarded.
    #[must_use]
    pub fn trend_keywords(&self) -> Vec<String> {
        self.trends_keywords
            .split(',')
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .map(ToOwned::to_owned)
            .collect()
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("bind_addr", &self.bind_addr)
            .field("log_level", &self.log_level)
            .field("data_file", &self.data_file)
            .field("cron_schedule", &self.cron_schedule)
            .field("countries", &self.countries)
            .field("search_query", &self.search_query)
            .field(
                "youtube_api_key",
                &self.youtube_api_key.as_ref().map(|_| "[redacted]"),
            )
            .field("discourse_base_url", &self.discourse_base_url)
            .field(
                "discourse_api_key",
                &self.discourse_api_key.as_ref().map(|_| "[redacted]"),
            )
            .field("discourse_api_username", &self.discourse_api_username)
            .field("trends_api_url", &self.trends_api_url)
            .field("trends_proxy_http", &self.trends_proxy_http)
            .field("trends_proxy_https", &self.trends_proxy_https)
            .field("trends_retries", &self.trends_retries)
            .field("trends_backoff_base_ms", &self.trends_backoff_base_ms)
            .field("trends_keywords", &self.trends_keywords)
            .field(
                "trends_pre_request_pause_ms",
                &self.trends_pre_request_pause_ms,
            )
            .field("trends_batch_pause_ms", &self.trends_batch_pause_ms)
            .field("http_timeout_secs", &self.http_timeout_secs)
            .finish()
    }
}
