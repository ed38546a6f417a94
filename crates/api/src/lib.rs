//! genimage API server library.
//!
//! Exposes the building blocks (config, state, error handling, the MCP
//! endpoint, tool execution, admin routes, stream WebSockets) so
//! integration tests and the binary entrypoint can both access them.

pub mod config;
pub mod engine;
pub mod error;
pub mod handlers;
pub mod mcp;
pub mod response;
pub mod router;
pub mod routes;
pub mod state;
pub mod ws;
