use genimage_core::mcp::{
    DOMAIN_ERROR, INTERNAL_ERROR, INVALID_PARAMS, METHOD_NOT_FOUND, PARSE_ERROR,
};
use genimage_core::tools::ToolArgsError;

use crate::engine::ToolError;

/// A JSON-RPC error answered on `POST /mcp`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum McpError {
    /// Body is not JSON or not a JSON-RPC 2.0 envelope.
    ParseError(String),
    MethodNotFound(String),
    /// Unknown tool name or arguments failing the tool's schema.
    InvalidParams(String),
    /// The request was understood but cannot be served as configured.
    Domain(String),
    InternalError(String),
}

impl McpError {
    pub fn code(&self) -> i32 {
        match self {
            McpError::ParseError(_) => PARSE_ERROR,
            McpError::MethodNotFound(_) => METHOD_NOT_FOUND,
            McpError::InvalidParams(_) => INVALID_PARAMS,
            McpError::Domain(_) => DOMAIN_ERROR,
            McpError::InternalError(_) => INTERNAL_ERROR,
        }
    }

    pub fn message(&self) -> String {
        match self {
            McpError::ParseError(msg) => format!("Parse error: {msg}"),
            McpError::MethodNotFound(method) => format!("Method not found: {method}"),
            McpError::InvalidParams(msg) | McpError::Domain(msg) => msg.clone(),
            McpError::InternalError(msg) => format!("Internal error: {msg}"),
        }
    }
}

impl From<ToolArgsError> for McpError {
    fn from(err: ToolArgsError) -> Self {
        McpError::InvalidParams(err.0)
    }
}

impl From<ToolError> for McpError {
    fn from(err: ToolError) -> Self {
        if err.is_internal() {
            McpError::InternalError(err.to_string())
        } else {
            McpError::Domain(err.to_string())
        }
    }
}

impl From<sqlx::Error> for McpError {
    fn from(err: sqlx::Error) -> Self {
        tracing::error!(error = %err, "Database error while serving MCP request");
        McpError::InternalError("database unavailable".to_string())
    }
}
