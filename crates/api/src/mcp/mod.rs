//! The MCP endpoint: JSON-RPC 2.0 over `POST /mcp`.

mod error;
mod handler;

pub use error::McpError;
pub use handler::{mcp_handler, SERVER_NAME};
