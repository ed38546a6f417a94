//! JSON-RPC 2.0 envelope types and stream notifications used by the MCP
//! endpoint.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

pub const JSONRPC_VERSION: &str = "2.0";

/// MCP protocol revision reported by `initialize`.
pub const PROTOCOL_VERSION: &str = "2025-06-18";

pub const METHOD_INITIALIZE: &str = "initialize";
pub const METHOD_INITIALIZED: &str = "notifications/initialized";
pub const METHOD_PING: &str = "ping";
pub const METHOD_TOOLS_LIST: &str = "tools/list";
pub const METHOD_TOOLS_CALL: &str = "tools/call";

pub const METHOD_STREAM_START: &str = "stream/start";
pub const METHOD_STREAM_CHUNK: &str = "stream/chunk";
pub const METHOD_STREAM_END: &str = "stream/end";

/// Body was not JSON or not a JSON-RPC envelope.
pub const PARSE_ERROR: i32 = -32700;
/// Unknown method.
pub const METHOD_NOT_FOUND: i32 = -32601;
/// Tool name or arguments failed validation.
pub const INVALID_PARAMS: i32 = -32602;
/// Anything unexpected.
pub const INTERNAL_ERROR: i32 = -32603;
/// Configuration, connectivity and execution failures.
pub const DOMAIN_ERROR: i32 = -32000;

// ---------------------------------------------------------------------------
// Envelope
// ---------------------------------------------------------------------------

fn default_version() -> String {
    JSONRPC_VERSION.to_string()
}

/// Incoming JSON-RPC request.
#[derive(Debug, Clone, Deserialize)]
pub struct JsonRpcRequest {
    #[serde(default = "default_version")]
    pub jsonrpc: String,
    pub method: String,
    #[serde(default)]
    pub params: Value,
    /// String, number or null. Absent means null.
    #[serde(default)]
    pub id: Value,
}

impl JsonRpcRequest {
    pub fn has_valid_version(&self) -> bool {
        self.jsonrpc == JSONRPC_VERSION
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonRpcError {
    pub code: i32,
    pub message: String,
}

/// Outgoing JSON-RPC response. Exactly one of `result` / `error` is set.
#[derive(Debug, Clone, Serialize)]
pub struct JsonRpcResponse {
    pub jsonrpc: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<JsonRpcError>,
    pub id: Value,
}

impl JsonRpcResponse {
    pub fn success(id: Value, result: Value) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION,
            result: Some(result),
            error: None,
            id,
        }
    }

    pub fn error(id: Value, code: i32, message: impl Into<String>) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION,
            result: None,
            error: Some(JsonRpcError {
                code,
                message: message.into(),
            }),
            id,
        }
    }
}

/// `params` of a `tools/call` request.
#[derive(Debug, Clone, Deserialize)]
pub struct ToolCallParams {
    pub name: String,
    #[serde(default = "empty_object")]
    pub arguments: Value,
}

fn empty_object() -> Value {
    Value::Object(Default::default())
}

/// Result of `initialize`.
pub fn initialize_result(server_name: &str, server_version: &str) -> Value {
    json!({
        "protocolVersion": PROTOCOL_VERSION,
        "capabilities": { "tools": { "listChanged": false } },
        "serverInfo": { "name": server_name, "version": server_version },
    })
}

// ---------------------------------------------------------------------------
// Stream notifications
// ---------------------------------------------------------------------------

/// Response to a streaming `tools/call`: where to subscribe for the result.
pub fn stream_start(id: Value, stream_id: &str, ws_url: &str) -> Value {
    json!({
        "jsonrpc": JSONRPC_VERSION,
        "method": METHOD_STREAM_START,
        "params": { "stream_id": stream_id, "ws_url": ws_url },
        "id": id,
    })
}

/// The single result chunk of a successful stream.
pub fn stream_chunk_result(stream_id: &str, result: Value) -> Value {
    json!({
        "jsonrpc": JSONRPC_VERSION,
        "method": METHOD_STREAM_CHUNK,
        "params": { "stream_id": stream_id, "result": result },
    })
}

/// The single error chunk of a failed stream.
pub fn stream_chunk_error(stream_id: &str, message: &str) -> Value {
    json!({
        "jsonrpc": JSONRPC_VERSION,
        "method": METHOD_STREAM_CHUNK,
        "params": {
            "stream_id": stream_id,
            "error": { "code": DOMAIN_ERROR, "message": message },
        },
    })
}

/// Final notification on every stream.
pub fn stream_end(stream_id: &str) -> Value {
    json!({
        "jsonrpc": JSONRPC_VERSION,
        "method": METHOD_STREAM_END,
        "params": { "stream_id": stream_id },
    })
}

// ---------------------------------------------------------------------------
// Tool results
// ---------------------------------------------------------------------------

/// Result payload for `generate_image` / `upscale_image`.
pub fn image_result(image_url: &str, seed: i64) -> Value {
    json!({
        "structured_output": {
            "image_url": image_url,
            "seed": seed,
            "human_readable_summary": format!("Image generated successfully: {image_url}"),
        },
        "content": [{ "type": "image", "source": image_url }],
    })
}

/// Result payload for `describe_image`.
pub fn description_result(description: &str) -> Value {
    json!({
        "structured_output": {
            "description": description,
            "human_readable_summary": description,
        },
        "content": [{ "type": "text", "text": description }],
    })
}

/// Result of the synchronous `generate_prompt` tool.
pub fn generated_prompt_result(positive: &str, negative: &str) -> Value {
    let summary = format!(
        "**Positive Prompt:**\n```\n{positive}\n```\n**Negative Prompt:**\n```\n{negative}\n```"
    );
    json!({
        "content": [{
            "type": "json",
            "json": {
                "positive_prompt": positive,
                "negative_prompt": negative,
                "human_readable_summary": summary,
            },
        }],
    })
}
