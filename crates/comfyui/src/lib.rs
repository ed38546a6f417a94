//! ComfyUI WebSocket and REST client library.
//!
//! Provides typed message parsing, WebSocket connection handling,
//! HTTP API wrappers and the submit-and-wait execution loop used to
//! run one workflow on one ComfyUI server.

pub mod api;
pub mod client;
pub mod execution;
pub mod messages;
pub mod output;
