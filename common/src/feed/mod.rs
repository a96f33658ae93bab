use crate::error::FetchError;
use async_trait::async_trait;
use serde_json::Value;

/// Source of raw history payloads. The orchestrator only sees this trait,
/// so tests can script payloads without a hub on the network.
#[async_trait]
pub trait HistoryFeed {
    async fn fetch_history(&self) -> Result<Value, FetchError>;
}

mod client;
pub use client::MomentFeedClient;
