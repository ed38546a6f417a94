use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use axum::body::Bytes;
use axum::extract::ws::Message;
use serde_json::Value;
use tokio::sync::{mpsc, Notify, RwLock};

/// Channel sender half for pushing messages to a stream subscriber.
pub type StreamSender = mpsc::UnboundedSender<Message>;

/// Lifecycle of a result stream.
///
/// `Created` (announced to the caller) -> `Started` (a client subscribed)
/// -> `ChunkDelivered` -> `Ended`; the slot is removed right after `Ended`.
/// A stream that nobody subscribed to goes straight from `Created` to
/// `ChunkDelivered`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamState {
    Created,
    Started,
    ChunkDelivered,
    Ended,
}

/// Why a subscription was refused.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SubscribeError {
    #[error("Unknown stream: {0}")]
    NotFound(String),
    #[error("Stream {0} already has a subscriber")]
    AlreadySubscribed(String),
}

struct StreamSlot {
    state: StreamState,
    /// Present while a client is connected.
    sender: Option<StreamSender>,
    subscribed: Arc<Notify>,
}

/// Registry of in-flight result streams keyed by stream ID.
///
/// Thread-safe via interior `RwLock`; wrap in `Arc` and share it between
/// the MCP handler, the stream WebSocket handler and the background tasks.
pub struct StreamRegistry {
    streams: RwLock<HashMap<String, StreamSlot>>,
}

impl StreamRegistry {
    pub fn new() -> Self {
        Self {
            streams: RwLock::new(HashMap::new()),
        }
    }

    /// Register a new stream and return its ID.
    pub async fn create(&self) -> String {
        let stream_id = uuid::Uuid::new_v4().to_string();
        let slot = StreamSlot {
            state: StreamState::Created,
            sender: None,
            subscribed: Arc::new(Notify::new()),
        };
        self.streams.write().await.insert(stream_id.clone(), slot);
        stream_id
    }

    /// Attach the single subscriber of a stream.
    ///
    /// Only allowed while the stream is still `Created`.
    pub async fn subscribe(
        &self,
        stream_id: &str,
    ) -> Result<mpsc::UnboundedReceiver<Message>, SubscribeError> {
        let mut streams = self.streams.write().await;
        let slot = streams
            .get_mut(stream_id)
            .ok_or_else(|| SubscribeError::NotFound(stream_id.to_string()))?;
        if slot.state != StreamState::Created {
            return Err(SubscribeError::AlreadySubscribed(stream_id.to_string()));
        }

        let (tx, rx) = mpsc::unbounded_channel();
        slot.sender = Some(tx);
        slot.state = StreamState::Started;
        slot.subscribed.notify_one();
        Ok(rx)
    }

    /// Detach the subscriber (client went away). The stream keeps its state
    /// so later publishes become no-ops.
    pub async fn unsubscribe(&self, stream_id: &str) {
        if let Some(slot) = self.streams.write().await.get_mut(stream_id) {
            slot.sender = None;
        }
    }

    /// Wait up to `grace` for a client to subscribe. Returns whether one did.
    pub async fn wait_for_subscriber(&self, stream_id: &str, grace: Duration) -> bool {
        let notify = {
            let streams = self.streams.read().await;
            match streams.get(stream_id) {
                Some(slot) if slot.state == StreamState::Created => Arc::clone(&slot.subscribed),
                Some(_) => return true,
                None => return false,
            }
        };
        tokio::time::timeout(grace, notify.notified()).await.is_ok()
    }

    /// Publish the stream's single result or error chunk.
    ///
    /// Returns `false` if a chunk was already published or the stream has
    /// ended. With no subscriber the chunk is dropped but still counts.
    pub async fn publish_chunk(&self, stream_id: &str, chunk: &Value) -> bool {
        let mut streams = self.streams.write().await;
        let Some(slot) = streams.get_mut(stream_id) else {
            return false;
        };
        if !matches!(slot.state, StreamState::Created | StreamState::Started) {
            tracing::warn!(stream_id, state = ?slot.state, "Refusing second chunk on stream");
            return false;
        }
        slot.state = StreamState::ChunkDelivered;
        send(slot, chunk);
        true
    }

    /// Publish `stream/end`, close the subscriber and drop the stream.
    pub async fn end(&self, stream_id: &str, end: &Value) {
        let Some(mut slot) = self.streams.write().await.remove(stream_id) else {
            return;
        };
        slot.state = StreamState::Ended;
        send(&slot, end);
        if let Some(sender) = slot.sender.take() {
            let _ = sender.send(Message::Close(None));
        }
        tracing::debug!(stream_id, "Stream closed");
    }

    pub async fn state(&self, stream_id: &str) -> Option<StreamState> {
        self.streams.read().await.get(stream_id).map(|s| s.state)
    }

    /// Number of streams not yet ended.
    pub async fn stream_count(&self) -> usize {
        self.streams.read().await.len()
    }

    /// Send a Ping frame to every subscriber.
    pub async fn ping_all(&self) {
        let streams = self.streams.read().await;
        for slot in streams.values() {
            if let Some(sender) = &slot.sender {
                let _ = sender.send(Message::Ping(Bytes::new()));
            }
        }
    }

    /// Send a Close frame to every subscriber, then clear the map.
    pub async fn shutdown_all(&self) {
        let mut streams = self.streams.write().await;
        let count = streams.len();
        for slot in streams.values() {
            if let Some(sender) = &slot.sender {
                let _ = sender.send(Message::Close(None));
            }
        }
        streams.clear();
        tracing::info!(count, "Closed all result streams");
    }
}

impl Default for StreamRegistry {
    fn default() -> Self {
        Self::new()
    }
}

fn send(slot: &StreamSlot, value: &Value) {
    if let Some(sender) = &slot.sender {
        let _ = sender.send(Message::Text(value.to_string().into()));
    }
}
