use crate::config::FeedConfig;
use crate::error::FetchError;
use crate::feed::HistoryFeed;
use async_trait::async_trait;
use reqwest::header::{CACHE_CONTROL, CONTENT_TYPE, PRAGMA};
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;

/// HTTP client for the hub's history endpoint.
pub struct MomentFeedClient {
    client: Client,
    url: String,
    token: Option<String>,
}

impl MomentFeedClient {
    pub fn new(config: &FeedConfig) -> Result<Self, FetchError> {
        let client = Client::builder().timeout(Duration::from_secs(30)).build()?;

        Ok(Self {
            client,
            url: config.url.clone(),
            token: config.token.clone(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl HistoryFeed for MomentFeedClient {
    async fn fetch_history(&self) -> Result<Value, FetchError> {
        // Every trigger is a fresh round trip; tell any intermediary cache
        // to stay out of the way.
        let mut request = self
            .client
            .get(&self.url)
            .header(CACHE_CONTROL, "no-cache")
            .header(PRAGMA, "no-cache")
            .header(CONTENT_TYPE, "application/json");

        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(FetchError::Status {
                status: status.as_u16(),
                body,
            });
        }

        Ok(response.json::<Value>().await?)
    }
}
