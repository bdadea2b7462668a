//! Per-user fan-out of upload progress events.
//!
//! Every user id gets its own bounded broadcast channel, created on first
//! subscribe. Publishing only reaches receivers that exist right now: there is
//! no queue and a subscriber that connects late, or lags past the channel
//! capacity, simply misses events.

use dashmap::DashMap;
use futures::{Stream, StreamExt};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tokio_stream::wrappers::BroadcastStream;
use tracing::{debug, trace};

pub const DEFAULT_CHANNEL_CAPACITY: usize = 64;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UploadStage {
    Uploading,
    Processing,
    Completed,
    Failed,
}

impl UploadStage {
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressEvent {
    pub upload_id: String,
    pub stage: UploadStage,
    /// 0..=100
    pub percent: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ProgressEvent {
    pub fn new(upload_id: impl Into<String>, stage: UploadStage, percent: u8) -> Self {
        Self {
            upload_id: upload_id.into(),
            stage,
            percent: percent.min(100),
            message: None,
        }
    }

    pub fn completed(upload_id: impl Into<String>) -> Self {
        Self::new(upload_id, UploadStage::Completed, 100)
    }

    pub fn failed(upload_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(upload_id, UploadStage::Failed, 0).with_message(message)
    }

    #[must_use]
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

#[derive(Debug)]
pub struct ProgressRelay {
    channels: DashMap<String, broadcast::Sender<ProgressEvent>>,
    capacity: usize,
}

impl Default for ProgressRelay {
    fn default() -> Self {
        Self::new(DEFAULT_CHANNEL_CAPACITY)
    }
}

impl ProgressRelay {
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            channels: DashMap::new(),
            capacity: capacity.max(1),
        }
    }

    pub fn subscribe(&self, user_id: &str) -> broadcast::Receiver<ProgressEvent> {
        self.channels
            .entry(user_id.to_owned())
            .or_insert_with(|| broadcast::channel(self.capacity).0)
            .subscribe()
    }

    /// Lagged receivers skip the dropped events instead of ending the stream.
    pub fn subscribe_stream(&self, user_id: &str) -> impl Stream<Item = ProgressEvent> + use<> {
        BroadcastStream::new(self.subscribe(user_id)).filter_map(|res| async move { res.ok() })
    }

    /// Returns how many receivers got the event. Zero means it was dropped.
    pub fn publish(&self, user_id: &str, event: ProgressEvent) -> usize {
        let delivered = match self.channels.get(user_id) {
            Some(tx) => tx.send(event).unwrap_or(0),
            None => 0,
        };
        if delivered == 0 {
            self.channels.remove_if(user_id, |_, tx| tx.receiver_count() == 0);
            trace!(user_id, "progress event dropped, no subscribers");
        }
        delivered
    }

    pub fn subscriber_count(&self, user_id: &str) -> usize {
        self.channels
            .get(user_id)
            .map_or(0, |tx| tx.receiver_count())
    }

    /// Drops channels whose receivers are all gone. Returns how many were removed.
    pub fn prune(&self) -> usize {
        let before = self.channels.len();
        self.channels.retain(|_, tx| tx.receiver_count() > 0);
        let removed = before.saturating_sub(self.channels.len());
        if removed > 0 {
            debug!(removed, "pruned idle progress channels");
        }
        removed
    }

    #[must_use]
    pub fn active_users(&self) -> Vec<String> {
        let mut users: Vec<String> = self
            .channels
            .iter()
            .filter(|e| e.value().receiver_count() > 0)
            .map(|e| e.key().clone())
            .collect();
        users.sort();
        users
    }
}
