//! Unit tests for `StreamRegistry`.
//!
//! These exercise the result stream lifecycle directly, without performing
//! any HTTP upgrades: single subscriber, single chunk, end and shutdown.

use std::time::Duration;

use axum::extract::ws::Message;
use genimage_api::ws::{StreamRegistry, StreamState, SubscribeError};
use serde_json::json;

// ---------------------------------------------------------------------------
// Test: a new stream is announced in the Created state
// ---------------------------------------------------------------------------

#[tokio::test]
async fn create_registers_stream() {
    let registry = StreamRegistry::new();
    let id = registry.create().await;

    assert_eq!(registry.state(&id).await, Some(StreamState::Created));
    assert_eq!(registry.stream_count().await, 1);
}

// ---------------------------------------------------------------------------
// Test: only one subscriber per stream, unknown IDs refused
// ---------------------------------------------------------------------------

#[tokio::test]
async fn second_subscriber_is_refused() {
    let registry = StreamRegistry::new();
    let id = registry.create().await;

    let _rx = registry.subscribe(&id).await.unwrap();
    assert_eq!(registry.state(&id).await, Some(StreamState::Started));

    let err = registry.subscribe(&id).await.unwrap_err();
    assert_eq!(err, SubscribeError::AlreadySubscribed(id));
}

#[tokio::test]
async fn unknown_stream_is_refused() {
    let registry = StreamRegistry::new();
    let err = registry.subscribe("nope").await.unwrap_err();
    assert_eq!(err, SubscribeError::NotFound("nope".to_string()));
}

// ---------------------------------------------------------------------------
// Test: chunk, end and close arrive in order, then the stream is gone
// ---------------------------------------------------------------------------

#[tokio::test]
async fn end_delivers_final_message_and_close() {
    let registry = StreamRegistry::new();
    let id = registry.create().await;
    let mut rx = registry.subscribe(&id).await.unwrap();

    assert!(registry.publish_chunk(&id, &json!({"method": "stream/chunk"})).await);
    registry.end(&id, &json!({"method": "stream/end"})).await;

    assert!(matches!(rx.recv().await, Some(Message::Text(t)) if t.as_str().contains("stream/chunk")));
    assert!(matches!(rx.recv().await, Some(Message::Text(t)) if t.as_str().contains("stream/end")));
    assert!(matches!(rx.recv().await, Some(Message::Close(None))));

    assert_eq!(registry.state(&id).await, None);
    assert_eq!(registry.stream_count().await, 0);
    assert!(!registry.publish_chunk(&id, &json!({})).await);
}

// ---------------------------------------------------------------------------
// Test: a chunk published with nobody listening still counts
// ---------------------------------------------------------------------------

#[tokio::test]
async fn unsubscribed_stream_accepts_one_chunk() {
    let registry = StreamRegistry::new();
    let id = registry.create().await;

    assert!(!registry.wait_for_subscriber(&id, Duration::from_millis(10)).await);
    assert!(registry.publish_chunk(&id, &json!({"n": 1})).await);
    assert_eq!(registry.state(&id).await, Some(StreamState::ChunkDelivered));

    // Too late to subscribe once the chunk is out.
    assert!(registry.subscribe(&id).await.is_err());
}

// ---------------------------------------------------------------------------
// Test: a subscriber arriving during the grace period is seen
// ---------------------------------------------------------------------------

#[tokio::test]
async fn wait_for_subscriber_wakes_on_subscription() {
    let registry = std::sync::Arc::new(StreamRegistry::new());
    let id = registry.create().await;

    let waiter = {
        let registry = registry.clone();
        let id = id.clone();
        tokio::spawn(async move { registry.wait_for_subscriber(&id, Duration::from_secs(5)).await })
    };
    tokio::time::sleep(Duration::from_millis(20)).await;
    let _rx = registry.subscribe(&id).await.unwrap();

    assert!(waiter.await.unwrap());
}

// ---------------------------------------------------------------------------
// Test: shutdown_all closes subscribers and clears the registry
// ---------------------------------------------------------------------------

#[tokio::test]
async fn shutdown_all_closes_everything() {
    let registry = StreamRegistry::new();
    let first = registry.create().await;
    registry.create().await;
    let mut rx = registry.subscribe(&first).await.unwrap();

    registry.shutdown_all().await;

    assert!(matches!(rx.recv().await, Some(Message::Close(None))));
    assert_eq!(registry.stream_count().await, 0);
}
