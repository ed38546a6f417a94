use std::sync::Arc;

use axum::extract::ws::{CloseFrame, Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Path, State};
use axum::response::IntoResponse;
use futures::{SinkExt, StreamExt};

use crate::state::AppState;
use crate::ws::streams::StreamRegistry;

/// Close code sent when the stream ID is unknown or already taken.
const CLOSE_POLICY_VIOLATION: u16 = 1008;

/// GET /ws/stream/{stream_id} -- subscribe to one result stream.
pub async fn stream_ws_handler(
    ws: WebSocketUpgrade,
    Path(stream_id): Path<String>,
    State(state): State<AppState>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, stream_id, state.streams))
}

/// Manage a single subscriber connection after upgrade.
///
/// Forwards everything the registry publishes for `stream_id` and closes
/// once the registry sends the final Close frame.
async fn handle_socket(socket: WebSocket, stream_id: String, streams: Arc<StreamRegistry>) {
    let (mut sink, mut stream) = socket.split();

    let mut rx = match streams.subscribe(&stream_id).await {
        Ok(rx) => rx,
        Err(e) => {
            tracing::warn!(stream_id = %stream_id, error = %e, "Stream subscription refused");
            let frame = CloseFrame {
                code: CLOSE_POLICY_VIOLATION,
                reason: e.to_string().into(),
            };
            let _ = sink.send(Message::Close(Some(frame))).await;
            return;
        }
    };
    tracing::info!(stream_id = %stream_id, "Stream subscriber connected");

    let sender_stream_id = stream_id.clone();
    let send_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            let closing = matches!(msg, Message::Close(_));
            if sink.send(msg).await.is_err() {
                tracing::debug!(stream_id = %sender_stream_id, "Stream sink closed");
                break;
            }
            if closing {
                break;
            }
        }
    });

    // Subscribers have nothing to say; only watch for disconnects.
    while let Some(result) = stream.next().await {
        match result {
            Ok(Message::Close(_)) => break,
            Ok(Message::Pong(_)) => {
                tracing::trace!(stream_id = %stream_id, "Pong received");
            }
            Ok(_) => {}
            Err(e) => {
                tracing::debug!(stream_id = %stream_id, error = %e, "Stream receive error");
                break;
            }
        }
    }

    streams.unsubscribe(&stream_id).await;
    send_task.abort();
    tracing::info!(stream_id = %stream_id, "Stream subscriber disconnected");
}
