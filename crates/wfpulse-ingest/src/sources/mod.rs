//! Platform source clients.

mod forum;
mod trends;
mod youtube;

pub use forum::ForumClient;
pub use trends::TrendsClient;
pub use youtube::YouTubeClient;

/// User agent sent on all outbound source requests.
pub(crate) const USER_AGENT: &str = "Mozilla/5.0 (compatible; wfpulse-bot/0.1)";
