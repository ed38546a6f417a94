//! Tool execution.
//!
//! Everything a `tools/call` does once its arguments are accepted:
//! resolving styles and render types, optional prompt enhancement,
//! backend selection, workflow execution, image storage, and the audit
//! row written for every call.

pub mod catalog;
mod describe;
pub mod enhancement;
pub mod error;
mod generation;
pub mod images;
pub mod prompt_generator;
pub mod resolution;
pub mod selection;
pub mod task;
pub mod workflows;

pub use catalog::load_catalog;
pub use error::ToolError;
pub use task::{execute, spawn_streamed, ToolJob};
