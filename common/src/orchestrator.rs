use crate::aggregate::aggregate;
use crate::error::{DecodeError, FetchError};
use crate::feed::HistoryFeed;
use crate::flatten::flatten_history;
use crate::models::{CategoryCounts, Record};
use chrono::{DateTime, Utc};
use serde_json::Value;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::{error, info};

/// Everything one successful fetch cycle publishes. Records and counts are
/// always built from the same payload; the snapshot is the unit of
/// publication, so consumers can never observe a mixed pair.
#[derive(Debug, Clone, PartialEq)]
pub struct HistorySnapshot {
    pub records: Vec<Record>,
    pub counts: CategoryCounts,
    pub fetched_at: DateTime<Utc>,
}

impl HistorySnapshot {
    pub fn from_payload(payload: &Value) -> Result<Self, DecodeError> {
        let records = flatten_history(payload)?;
        let counts = aggregate(&records);

        Ok(Self {
            records,
            counts,
            fetched_at: Utc::now(),
        })
    }
}

/// Tagged result of one fetch cycle, delivered back to the control thread.
#[derive(Debug)]
pub enum FetchOutcome {
    Published {
        fetch_id: u64,
        snapshot: HistorySnapshot,
    },
    Failed {
        fetch_id: u64,
        error: FetchError,
    },
}

/// Owns the feed and runs fetch cycles. One orchestrator per screen or
/// session; there is no process-wide queue.
///
/// `trigger` is re-entrant on purpose: overlapping triggers produce
/// independent in-flight fetches, and whichever outcome arrives last wins
/// once applied. In-flight fetches cannot be cancelled; the fetch id only
/// identifies cycles in the logs.
pub struct FetchOrchestrator {
    feed: Arc<dyn HistoryFeed + Send + Sync>,
    outcomes: UnboundedSender<FetchOutcome>,
    next_fetch_id: AtomicU64,
}

impl FetchOrchestrator {
    pub fn new(
        feed: Arc<dyn HistoryFeed + Send + Sync>,
    ) -> (Self, UnboundedReceiver<FetchOutcome>) {
        let (tx, rx) = mpsc::unbounded_channel();

        let orchestrator = Self {
            feed,
            outcomes: tx,
            next_fetch_id: AtomicU64::new(1),
        };

        (orchestrator, rx)
    }

    /// Starts one fetch cycle and returns its id without waiting for it.
    pub fn trigger(&self) -> u64 {
        let fetch_id = self.next_fetch_id.fetch_add(1, Ordering::Relaxed);
        let feed = Arc::clone(&self.feed);
        let outcomes = self.outcomes.clone();

        tokio::spawn(async move {
            let outcome = match run_fetch(feed.as_ref()).await {
                Ok(snapshot) => FetchOutcome::Published { fetch_id, snapshot },
                Err(error) => FetchOutcome::Failed { fetch_id, error },
            };

            // The receiver is gone once the consuming screen closed; the
            // cycle result has nowhere to go then.
            let _ = outcomes.send(outcome);
        });

        fetch_id
    }
}

async fn run_fetch(feed: &dyn HistoryFeed) -> Result<HistorySnapshot, FetchError> {
    let payload = feed.fetch_history().await?;
    Ok(HistorySnapshot::from_payload(&payload)?)
}

/// Control-thread holder of the last published snapshot. A failed cycle is
/// logged and leaves the previous snapshot in place.
#[derive(Default)]
pub struct PublishedState {
    snapshot: Option<HistorySnapshot>,
    last_error: Option<String>,
}

impl PublishedState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn apply(&mut self, outcome: FetchOutcome) {
        match outcome {
            FetchOutcome::Published { fetch_id, snapshot } => {
                info!(
                    "fetch #{} published {} records ({} counted)",
                    fetch_id,
                    snapshot.records.len(),
                    snapshot.counts.total()
                );
                self.snapshot = Some(snapshot);
                self.last_error = None;
            }
            FetchOutcome::Failed { fetch_id, error } => {
                error!("fetch #{} failed: {}", fetch_id, error);
                self.last_error = Some(error.to_string());
            }
        }
    }

    pub fn snapshot(&self) -> Option<&HistorySnapshot> {
        self.snapshot.as_ref()
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }
}
