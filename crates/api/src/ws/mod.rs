//! WebSocket delivery of streamed tool results.
//!
//! Provides the stream registry, heartbeat monitoring, and the upgrade
//! handler mounted at `/ws/stream/{stream_id}`.

mod handler;
mod heartbeat;
pub mod streams;

pub use handler::stream_ws_handler;
pub use heartbeat::start_heartbeat;
pub use streams::{StreamRegistry, StreamState, SubscribeError};
