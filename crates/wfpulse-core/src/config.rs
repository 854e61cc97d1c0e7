use thiserror::Error;

use crate::app_config::AppConfig;
use crate::records::Country;

/// Default keyword set tracked on the search-interest platform.
const DEFAULT_TRENDS_KEYWORDS: &str = "n8n Slack integration,n8n WhatsApp reminders,\
n8n Google Sheets,n8n Gmail automation,n8n Notion integration,n8n Telegram bot,\
n8n Airtable,n8n Trello,n8n Jira,n8n Shopify,n8n Stripe,n8n Zoom,n8n Calendly,\
n8n Dropbox,n8n Google Drive,n8n GitHub issues,n8n RSS,n8n Zendesk,n8n OpenAI,\
n8n Facebook leads";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if any value fails to parse.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the
/// process, without touching `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if any value fails to parse.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup.
///
/// The parsing/validation logic is decoupled from the actual environment so
/// tests can drive it with a plain `HashMap` lookup.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::net::SocketAddr;
    use std::path::PathBuf;

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let optional = |var: &str| -> Option<String> {
        lookup(var).ok().filter(|v| !v.trim().is_empty())
    };

    let parse_addr = |var: &str, default: &str| -> Result<SocketAddr, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<SocketAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: e.to_string(),
            })
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u32>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u64>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let bind_addr = parse_addr("WFPULSE_BIND_ADDR", "0.0.0.0:3000")?;
    let log_level = or_default("WFPULSE_LOG_LEVEL", "info");
    let data_file = PathBuf::from(or_default("WFPULSE_DATA_FILE", "./data/workflows.json"));
    let cron_schedule = or_default("WFPULSE_CRON_SCHEDULE", "0 3 * * *");
    let countries = parse_countries(&or_default("WFPULSE_COUNTRIES", "US,IN"))?;
    let search_query = or_default("WFPULSE_SEARCH_QUERY", "n8n workflow");

    let youtube_api_key = optional("YOUTUBE_API_KEY");
    let discourse_base_url = or_default("DISCOURSE_BASE_URL", "https://community.n8n.io");
    let discourse_api_key = optional("DISCOURSE_API_KEY");
    let discourse_api_username = optional("DISCOURSE_API_USERNAME");

    let trends_api_url = optional("TRENDS_API_URL");
    let trends_proxy_http = optional("TRENDS_PROXY_HTTP");
    let trends_proxy_https = optional("TRENDS_PROXY_HTTPS");
    let trends_retries = parse_u32("TRENDS_RETRIES", "2")?;
    let trends_backoff_base_ms = parse_u64("TRENDS_BACKOFF_BASE_MS", "500")?;
    let trends_keywords = or_default("TRENDS_KEYWORDS", DEFAULT_TRENDS_KEYWORDS);
    let trends_pre_request_pause_ms = parse_u64("TRENDS_PRE_REQUEST_PAUSE_MS", "2000")?;
    let trends_batch_pause_ms = parse_u64("TRENDS_BATCH_PAUSE_MS", "8000")?;

    let http_timeout_secs = parse_u64("WFPULSE_HTTP_TIMEOUT_SECS", "20")?;

    Ok(AppConfig {
        bind_addr,
        log_level,
        data_file,
        cron_schedule,
        countries,
        search_query,
        youtube_api_key,
        discourse_base_url,
        discourse_api_key,
        discourse_api_username,
        trends_api_url,
        trends_proxy_http,
        trends_proxy_https,
        trends_retries,
        trends_backoff_base_ms,
        trends_keywords,
        trends_pre_request_pause_ms,
        trends_batch_pause_ms,
        http_timeout_secs,
    })
}

/// Parse a comma-separated region-code list into [`Country`] values.
///
/// A typo here would otherwise surface as a silently empty collection run,
/// so unknown codes fail startup instead.
fn parse_countries(raw: &str) -> Result<Vec<Country>, ConfigError> {
    let mut countries = Vec::new();
    for code in raw.split(',').map(str::trim).filter(|c| !c.is_empty()) {
        let country = Country::from_code(code).ok_or_else(|| ConfigError::InvalidEnvVar {
            var: "WFPULSE_COUNTRIES".to_string(),
            reason: format!("unsupported region code '{code}'"),
        })?;
        if !countries.contains(&country) {
            countries.push(country);
        }
    }
    if countries.is_empty() {
        return Err(ConfigError::InvalidEnvVar {
            var: "WFPULSE_COUNTRIES".to_string(),
            reason: "at least one region code is required".to_string(),
        });
    }
    Ok(countries)
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
