use axum::body::Bytes;
use axum::extract::State;
use axum::http::header::HOST;
use axum::http::HeaderMap;
use axum::Json;
use genimage_core::mcp::{
    initialize_result, stream_end, stream_start, JsonRpcRequest, JsonRpcResponse, ToolCallParams,
    METHOD_INITIALIZE, METHOD_INITIALIZED, METHOD_PING, METHOD_TOOLS_CALL, METHOD_TOOLS_LIST,
};
use genimage_core::settings::Settings;
use genimage_core::tools::{parse_args, ToolName};
use genimage_core::urls::stream_ws_url;
use genimage_db::repositories::SettingRepo;
use serde_json::{json, Value};

use super::error::McpError;
use crate::engine::{self, load_catalog, ToolJob};
use crate::state::AppState;

/// Name reported by `initialize`.
pub const SERVER_NAME: &str = "genimage-mcp";

/// What a successful dispatch answers with.
enum Reply {
    /// Wrapped as the `result` of a JSON-RPC response.
    Result(Value),
    /// A complete message sent as is (`stream/start`).
    Message(Value),
}

/// POST /mcp
///
/// JSON-RPC 2.0 over HTTP. Always answers `200 OK`; failures travel in the
/// JSON-RPC `error` member.
pub async fn mcp_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Json<Value> {
    let request = match parse_request(&body) {
        Ok(request) => request,
        Err(error) => return Json(error_response(Value::Null, &error)),
    };

    let id = request.id.clone();
    let host = headers.get(HOST).and_then(|h| h.to_str().ok());
    tracing::debug!(method = %request.method, "MCP request");

    match dispatch(&state, request, host).await {
        Ok(Reply::Result(result)) => Json(to_value(JsonRpcResponse::success(id, result))),
        Ok(Reply::Message(message)) => Json(message),
        Err(error) => {
            tracing::info!(code = error.code(), error = %error.message(), "MCP request rejected");
            Json(error_response(id, &error))
        }
    }
}

fn parse_request(body: &[u8]) -> Result<JsonRpcRequest, McpError> {
    let value: Value =
        serde_json::from_slice(body).map_err(|e| McpError::ParseError(e.to_string()))?;
    let request: JsonRpcRequest = serde_json::from_value(value)
        .map_err(|e| McpError::ParseError(format!("not a JSON-RPC request: {e}")))?;
    if !request.has_valid_version() {
        return Err(McpError::ParseError(format!(
            "unsupported jsonrpc version '{}'",
            request.jsonrpc
        )));
    }
    Ok(request)
}

async fn dispatch(
    state: &AppState,
    request: JsonRpcRequest,
    host: Option<&str>,
) -> Result<Reply, McpError> {
    match request.method.as_str() {
        METHOD_INITIALIZE => Ok(Reply::Result(initialize_result(
            SERVER_NAME,
            env!("CARGO_PKG_VERSION"),
        ))),
        METHOD_INITIALIZED | METHOD_PING => Ok(Reply::Result(json!({}))),
        METHOD_TOOLS_LIST => {
            let catalog = load_catalog(&state.pool).await?;
            Ok(Reply::Result(json!({ "tools": catalog.tools() })))
        }
        METHOD_TOOLS_CALL => handle_tools_call(state, request.params, request.id, host).await,
        other => Err(McpError::MethodNotFound(other.to_string())),
    }
}

async fn handle_tools_call(
    state: &AppState,
    params: Value,
    id: Value,
    host: Option<&str>,
) -> Result<Reply, McpError> {
    let params: ToolCallParams = serde_json::from_value(params)
        .map_err(|e| McpError::InvalidParams(format!("Invalid tools/call params: {e}")))?;

    let tool: ToolName = params.name.parse()?;
    let arguments = params.arguments;
    let job = match tool {
        ToolName::GenerateImage => ToolJob::GenerateImage(parse_args(arguments)?),
        ToolName::UpscaleImage => ToolJob::UpscaleImage(parse_args(arguments)?),
        ToolName::DescribeImage => ToolJob::DescribeImage(parse_args(arguments)?),
        ToolName::GeneratePrompt => ToolJob::GeneratePrompt(parse_args(arguments)?),
    };
    tracing::info!(tool = tool.as_str(), "Tool call accepted");

    if !job.is_streamed() {
        let result = engine::execute(state, job).await?;
        return Ok(Reply::Result(result));
    }

    let settings = Settings::new(SettingRepo::get_all(&state.pool).await?);
    let stream_id = state.streams.create().await;
    let ws_url = match stream_ws_url(settings.output_url_base(), host, &stream_id) {
        Ok(url) => url,
        Err(e) => {
            state.streams.end(&stream_id, &stream_end(&stream_id)).await;
            return Err(McpError::Domain(e.to_string()));
        }
    };

    engine::spawn_streamed(state.clone(), stream_id.clone(), job);
    tracing::info!(stream_id = %stream_id, tool = tool.as_str(), "Stream announced");

    Ok(Reply::Message(stream_start(id, &stream_id, &ws_url)))
}

fn error_response(id: Value, error: &McpError) -> Value {
    to_value(JsonRpcResponse::error(id, error.code(), error.message()))
}

fn to_value(response: JsonRpcResponse) -> Value {
    serde_json::to_value(response).unwrap_or_else(|e| {
        tracing::error!(error = %e, "Failed to serialize JSON-RPC response");
        Value::Null
    })
}
