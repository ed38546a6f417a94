use std::sync::Arc;
use std::time::Duration;

use tokio_util::task::TaskTracker;

use crate::config::ServerConfig;
use crate::ws::StreamRegistry;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: genimage_db::DbPool,
    pub config: Arc<ServerConfig>,
    /// Result streams announced by `tools/call`.
    pub streams: Arc<StreamRegistry>,
    /// Background tool runs, awaited on shutdown.
    pub tasks: TaskTracker,
    /// Shared HTTP client for ComfyUI and Ollama requests and image downloads.
    pub http: reqwest::Client,
}

/// Outbound HTTP client. Every request is bounded by `timeout` unless the
/// caller sets a tighter one per request.
pub fn http_client(timeout: Duration) -> Result<reqwest::Client, reqwest::Error> {
    reqwest::Client::builder().timeout(timeout).build()
}
