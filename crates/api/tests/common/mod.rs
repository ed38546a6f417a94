#![allow(dead_code)]

use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Path as UrlPath, Query, State};
use axum::http::{Method, Request, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing;
use axum::{Json, Router};
use futures::StreamExt;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use sqlx::sqlite::SqlitePoolOptions;
use tempfile::TempDir;
use tokio::sync::Mutex;
use tokio_util::task::TaskTracker;
use tower::ServiceExt;

use genimage_api::config::ServerConfig;
use genimage_api::router::build_app_router;
use genimage_api::state::{http_client, AppState};
use genimage_api::ws::StreamRegistry;
use genimage_db::DbPool;

// ---------------------------------------------------------------------------
// Application under test
// ---------------------------------------------------------------------------

/// Fresh in-memory database with all migrations applied.
///
/// A single never-recycled connection keeps the in-memory database alive
/// for the whole test.
pub async fn test_pool() -> DbPool {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect("sqlite::memory:")
        .await
        .unwrap();
    genimage_db::run_migrations(&pool).await.unwrap();
    pool
}

/// Build a test `ServerConfig` with safe defaults and short timeouts.
pub fn test_config(workflows_dir: &Path, outputs_dir: &Path) -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        database_url: "sqlite::memory:".to_string(),
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        generation_timeout_secs: 10,
        queue_probe_timeout_secs: 2,
        ollama_timeout_secs: 5,
        workflows_dir: workflows_dir.to_path_buf(),
        outputs_dir: outputs_dir.to_path_buf(),
    }
}

/// The full application over an in-memory database and throw-away
/// workflow and output directories.
pub struct TestApp {
    pub state: AppState,
    workflows: TempDir,
    outputs: TempDir,
}

impl TestApp {
    pub async fn new() -> Self {
        let workflows = tempfile::tempdir().unwrap();
        let outputs = tempfile::tempdir().unwrap();
        let config = test_config(workflows.path(), outputs.path());

        let state = AppState {
            pool: test_pool().await,
            http: http_client(config.request_timeout()).unwrap(),
            config: Arc::new(config),
            streams: Arc::new(StreamRegistry::new()),
            tasks: TaskTracker::new(),
        };

        Self {
            state,
            workflows,
            outputs,
        }
    }

    pub fn pool(&self) -> &DbPool {
        &self.state.pool
    }

    /// Router with the same middleware stack production uses.
    pub fn router(&self) -> Router {
        build_app_router(self.state.clone(), &self.state.config)
    }

    pub fn outputs_dir(&self) -> &Path {
        self.outputs.path()
    }

    pub fn write_workflow(&self, filename: &str, workflow: &Value) {
        let path = self.workflows.path().join(filename);
        std::fs::write(path, serde_json::to_vec_pretty(workflow).unwrap()).unwrap();
    }

    /// Serve the router on an ephemeral port, for tests that need a real
    /// socket (stream subscriptions).
    pub async fn serve(&self) -> SocketAddr {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let app = self.router();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        addr
    }

    /// Wait for every background tool run to finish.
    pub async fn drain_tasks(&self) {
        self.state.tasks.close();
        tokio::time::timeout(Duration::from_secs(15), self.state.tasks.wait())
            .await
            .expect("background tool runs did not finish");
    }
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

pub async fn body_json(response: Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn send(app: Router, method: Method, uri: &str, body: Option<Value>) -> Response {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(json) => {
            builder = builder.header("content-type", "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };
    app.oneshot(builder.body(body).unwrap()).await.unwrap()
}

pub async fn get(app: Router, uri: &str) -> Response {
    send(app, Method::GET, uri, None).await
}

pub async fn post(app: Router, uri: &str) -> Response {
    send(app, Method::POST, uri, None).await
}

pub async fn post_json(app: Router, uri: &str, body: Value) -> Response {
    send(app, Method::POST, uri, Some(body)).await
}

pub async fn put_json(app: Router, uri: &str, body: Value) -> Response {
    send(app, Method::PUT, uri, Some(body)).await
}

pub async fn delete(app: Router, uri: &str) -> Response {
    send(app, Method::DELETE, uri, None).await
}

/// POST a raw body to `/mcp`. JSON-RPC errors still come back as 200.
pub async fn post_mcp_raw(app: Router, body: &str) -> Value {
    let request = Request::builder()
        .method(Method::POST)
        .uri("/mcp")
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    body_json(response).await
}

pub async fn post_mcp(app: Router, body: Value) -> Value {
    post_mcp_raw(app, &body.to_string()).await
}

/// `tools/call` request envelope.
pub fn tool_call(id: i64, name: &str, arguments: Value) -> Value {
    json!({
        "jsonrpc": "2.0",
        "id": id,
        "method": "tools/call",
        "params": {"name": name, "arguments": arguments}
    })
}

/// Subscribe to a result stream and collect every text frame until the
/// server closes it.
pub async fn collect_stream(ws_url: &str) -> Vec<Value> {
    let (mut socket, _) = tokio_tungstenite::connect_async(ws_url).await.unwrap();
    let mut frames = Vec::new();
    let read = async {
        while let Some(msg) = socket.next().await {
            match msg.unwrap() {
                tokio_tungstenite::tungstenite::Message::Text(text) => {
                    frames.push(serde_json::from_str(&text).unwrap());
                }
                tokio_tungstenite::tungstenite::Message::Close(_) => break,
                _ => {}
            }
        }
    };
    tokio::time::timeout(Duration::from_secs(15), read)
        .await
        .expect("stream did not close");
    frames
}

// ---------------------------------------------------------------------------
// Workflow fixtures
// ---------------------------------------------------------------------------

/// Text-to-image graph with every generation role titled.
pub fn generation_workflow() -> Value {
    json!({
        "3": {"class_type": "KSampler", "inputs": {"seed": 0, "steps": 20},
              "_meta": {"title": "MCP_SEED"}},
        "5": {"class_type": "EmptyLatentImage", "inputs": {"width": 512, "height": 512, "batch_size": 1},
              "_meta": {"title": "MCP_RESOLUTION"}},
        "6": {"class_type": "CLIPTextEncode", "inputs": {"text": ""},
              "_meta": {"title": "MCP_INPUT_PROMPT"}},
        "7": {"class_type": "CLIPTextEncode", "inputs": {"text": ""},
              "_meta": {"title": "MCP_INPUT_NEGATIVE_PROMPT"}},
        "9": {"class_type": "SaveImage", "inputs": {"filename_prefix": "ComfyUI"},
              "_meta": {"title": "MCP_OUTPUT_IMAGE"}}
    })
}

/// Upscale graph whose loader node is not titled `MCP_INPUT_IMAGE`.
pub fn untitled_upscale_workflow() -> Value {
    json!({
        "1": {"class_type": "LoadImage", "inputs": {"image": "example.png"}},
        "9": {"class_type": "SaveImage", "inputs": {"filename_prefix": "ComfyUI"},
              "_meta": {"title": "MCP_OUTPUT_IMAGE"}}
    })
}

// ---------------------------------------------------------------------------
// Mock ComfyUI
// ---------------------------------------------------------------------------

pub const PROMPT_ID: &str = "prompt-1";

/// Just enough of the ComfyUI protocol to run one prompt to completion.
pub struct MockComfyUI {
    pub url: String,
    queue_remaining: u32,
    submitted: Mutex<Vec<Value>>,
}

impl MockComfyUI {
    pub async fn submissions(&self) -> Vec<Value> {
        self.submitted.lock().await.clone()
    }
}

async fn mock_queue(State(mock): State<Arc<MockComfyUI>>) -> Json<Value> {
    Json(json!({"exec_info": {"queue_remaining": mock.queue_remaining}}))
}

async fn mock_submit(State(mock): State<Arc<MockComfyUI>>, Json(body): Json<Value>) -> Json<Value> {
    mock.submitted.lock().await.push(body);
    Json(json!({"prompt_id": PROMPT_ID, "number": 0, "node_errors": {}}))
}

async fn mock_history(UrlPath(prompt_id): UrlPath<String>) -> Json<Value> {
    Json(json!({
        prompt_id: {
            "outputs": {
                "9": {"images": [{"filename": "ComfyUI_0001.png", "subfolder": "", "type": "output"}]}
            }
        }
    }))
}

async fn mock_view(
    Query(params): Query<std::collections::HashMap<String, String>>,
) -> impl IntoResponse {
    if params.get("filename").map(String::as_str) == Some("ComfyUI_0001.png") {
        (StatusCode::OK, b"PNGDATA".to_vec())
    } else {
        (StatusCode::NOT_FOUND, b"missing".to_vec())
    }
}

async fn mock_upload() -> Json<Value> {
    Json(json!({"name": "source.png", "subfolder": "", "type": "input"}))
}

async fn mock_ws(ws: WebSocketUpgrade) -> impl IntoResponse {
    ws.on_upgrade(mock_feed)
}

async fn mock_feed(mut socket: WebSocket) {
    // Let the client submit before the completion frame.
    tokio::time::sleep(Duration::from_millis(50)).await;
    let done = json!({"type": "executing", "data": {"node": null, "prompt_id": PROMPT_ID}});
    if socket.send(Message::Text(done.to_string().into())).await.is_err() {
        return;
    }
    while let Some(Ok(_)) = socket.recv().await {}
}

/// Start a mock ComfyUI reporting `queue_remaining` waiting prompts.
pub async fn spawn_comfyui(queue_remaining: u32) -> Arc<MockComfyUI> {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let mock = Arc::new(MockComfyUI {
        url: format!("http://{addr}"),
        queue_remaining,
        submitted: Mutex::new(Vec::new()),
    });

    let app = Router::new()
        .route("/prompt", routing::get(mock_queue).post(mock_submit))
        .route("/history/{prompt_id}", routing::get(mock_history))
        .route("/view", routing::get(mock_view))
        .route("/upload/image", routing::post(mock_upload))
        .route("/ws", routing::get(mock_ws))
        .with_state(mock.clone());

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    mock
}

// ---------------------------------------------------------------------------
// Mock Ollama and image host
// ---------------------------------------------------------------------------

/// `/api/chat` answering every request with a fixed reply.
pub struct MockOllama {
    pub url: String,
    reply: String,
    requests: Mutex<Vec<Value>>,
}

impl MockOllama {
    pub async fn requests(&self) -> Vec<Value> {
        self.requests.lock().await.clone()
    }
}

async fn mock_chat(State(mock): State<Arc<MockOllama>>, Json(body): Json<Value>) -> Json<Value> {
    mock.requests.lock().await.push(body.clone());
    Json(json!({
        "model": body["model"],
        "message": {"role": "assistant", "content": mock.reply},
        "done": true
    }))
}

pub async fn spawn_ollama(reply: &str) -> Arc<MockOllama> {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let mock = Arc::new(MockOllama {
        url: format!("http://{addr}"),
        reply: reply.to_string(),
        requests: Mutex::new(Vec::new()),
    });

    let app = Router::new()
        .route("/api/chat", routing::post(mock_chat))
        .with_state(mock.clone());
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    mock
}

/// Serve `bytes` at `/cat.png` and return the full image URL.
pub async fn spawn_image_host(bytes: &'static [u8]) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let app = Router::new().route("/cat.png", routing::get(move || async move { bytes.to_vec() }));
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}/cat.png")
}
