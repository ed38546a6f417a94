//! WebSocket client for connecting to a ComfyUI instance.
//!
//! [`ComfyUIClient`] holds the connection configuration for a single
//! ComfyUI instance.  Call [`ComfyUIClient::connect`] to establish a
//! live [`ComfyUIConnection`] over WebSocket.

use genimage_core::types::DbId;
use tokio_tungstenite::{connect_async, MaybeTlsStream};

use crate::api::ComfyUIApi;

pub type ComfyUIStream = tokio_tungstenite::WebSocketStream<MaybeTlsStream<tokio::net::TcpStream>>;

/// Configuration handle for a ComfyUI instance.
///
/// Stores the WebSocket and HTTP API URLs needed to communicate with
/// one ComfyUI server. Create a [`ComfyUIConnection`] by calling
/// [`connect`](Self::connect).
#[derive(Debug, Clone)]
pub struct ComfyUIClient {
    instance_id: DbId,
    ws_url: String,
    api_url: String,
}

/// A live WebSocket connection to a ComfyUI instance.
///
/// Holds the underlying `WebSocketStream` plus the identifiers needed
/// to correlate messages with the prompts this client submits.
pub struct ComfyUIConnection {
    /// Internal database ID of the ComfyUI instance row.
    pub instance_id: DbId,
    /// Unique client ID sent during the WebSocket handshake.
    pub client_id: String,
    /// The raw WebSocket stream for reading/writing frames.
    pub ws_stream: ComfyUIStream,
}

impl ComfyUIClient {
    /// Create a client from the instance's HTTP base URL.
    ///
    /// The WebSocket URL is derived by swapping the scheme
    /// (`http` → `ws`, `https` → `wss`).
    pub fn new(instance_id: DbId, base_url: &str) -> Self {
        let api_url = base_url.trim_end_matches('/').to_string();
        let ws_url = websocket_url(&api_url);
        Self {
            instance_id,
            ws_url,
            api_url,
        }
    }

    /// Database row ID of this ComfyUI instance.
    pub fn instance_id(&self) -> DbId {
        self.instance_id
    }

    /// WebSocket base URL (e.g. `ws://host:8188`).
    pub fn ws_url(&self) -> &str {
        &self.ws_url
    }

    /// HTTP API base URL (e.g. `http://host:8188`).
    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    /// REST client for the same instance, sharing `http`'s connection pool.
    pub fn api(&self, http: &reqwest::Client) -> ComfyUIApi {
        ComfyUIApi::with_client(http.clone(), self.api_url.clone())
    }

    /// Connect to the ComfyUI WebSocket endpoint.
    ///
    /// Generates a unique `client_id` (UUID v4) and appends it as a
    /// query parameter so that ComfyUI can address messages back to
    /// this specific client.
    pub async fn connect(&self) -> Result<ComfyUIConnection, ComfyUIClientError> {
        let client_id = uuid::Uuid::new_v4().to_string();
        let url = format!("{}/ws?clientId={}", self.ws_url, client_id);

        let (ws_stream, _response) = connect_async(&url).await.map_err(|e| {
            ComfyUIClientError::Connection(format!(
                "Failed to connect to ComfyUI at {}: {e}",
                self.ws_url
            ))
        })?;

        tracing::debug!(
            instance_id = self.instance_id,
            client_id = %client_id,
            "Connected to ComfyUI at {}",
            self.ws_url,
        );

        Ok(ComfyUIConnection {
            instance_id: self.instance_id,
            client_id,
            ws_stream,
        })
    }
}

/// `http(s)://host` → `ws(s)://host`. Other schemes pass through.
fn websocket_url(api_url: &str) -> String {
    if let Some(rest) = api_url.strip_prefix("https://") {
        format!("wss://{rest}")
    } else if let Some(rest) = api_url.strip_prefix("http://") {
        format!("ws://{rest}")
    } else {
        api_url.to_string()
    }
}

/// Errors that can occur when working with the WebSocket client.
#[derive(Debug, thiserror::Error)]
pub enum ComfyUIClientError {
    /// Failed to establish the initial WebSocket connection.
    #[error("Connection error: {0}")]
    Connection(String),

    /// A protocol-level error on an already-established connection.
    #[error("Protocol error: {0}")]
    Protocol(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ws_url_follows_http_scheme() {
        let client = ComfyUIClient::new(1, "http://gpu:8188/");
        assert_eq!(client.api_url(), "http://gpu:8188");
        assert_eq!(client.ws_url(), "ws://gpu:8188");
    }

    #[test]
    fn ws_url_follows_https_scheme() {
        let client = ComfyUIClient::new(2, "https://comfy.example.com");
        assert_eq!(client.ws_url(), "wss://comfy.example.com");
        assert_eq!(client.instance_id(), 2);
    }
}
