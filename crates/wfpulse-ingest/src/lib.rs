//! Ingestion-and-scoring pipeline for wfpulse.
//!
//! Pulls popularity signals from YouTube, a Discourse forum, and a
//! search-interest gateway, normalizes them into [`wfpulse_core::RawRecord`]s,
//! scores each with a platform-specific heuristic in `[0, 1]`, and merges
//! everything into one flat record list per refresh. Source failures are
//! isolated: a dead platform contributes nothing instead of aborting the run.

pub mod collector;
pub mod error;
pub mod scoring;
pub mod sources;

mod retry;

pub use collector::Collector;
pub use error::IngestError;
pub use sources::{ForumClient, TrendsClient, YouTubeClient};
