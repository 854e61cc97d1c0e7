//! Shared domain types and configuration for wfpulse.
//!
//! Defines the [`WorkflowRecord`] shape persisted in the snapshot file, the
//! closed [`Platform`]/[`Country`] enums, per-platform metric structs, and
//! the env-driven [`AppConfig`] loader.

mod app_config;
mod config;
mod records;

pub use app_config::AppConfig;
pub use config::{load_app_config, load_app_config_from_env, ConfigError};
pub use records::{
    Country, ForumMetrics, GoogleMetrics, Metrics, Platform, RawRecord, WorkflowRecord,
    YouTubeMetrics,
};
