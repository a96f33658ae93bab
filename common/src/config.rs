use std::env;

/// History endpoint of the local hub, filtered to the moment sensor.
pub const DEFAULT_FEED_URL: &str =
    "http://localhost:8123/api/history/period?filter_entity_id=sensor.current_moment";

#[derive(Debug, Clone)]
pub struct FeedConfig {
    /// Full feed URL, query string included.
    pub url: String,
    /// Static bearer token; None means the hub accepts unauthenticated reads.
    pub token: Option<String>,
}

impl FeedConfig {
    pub fn from_env() -> Self {
        let url = env::var("MOMENT_FEED_URL").unwrap_or_else(|_| DEFAULT_FEED_URL.to_string());
        let token = env::var("MOMENT_FEED_TOKEN")
            .ok()
            .filter(|t| !t.trim().is_empty());

        Self { url, token }
    }
}
