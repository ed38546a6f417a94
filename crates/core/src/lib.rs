//! Domain logic for the GenImage tool server.
//!
//! Everything in this crate is free of I/O: render-type resolution and
//! prompt assembly, workflow templates, backend selection, JSON-RPC and
//! tool-schema types, and the prompt generator's building blocks. The
//! database, backend clients and HTTP layer live in sibling crates.

pub mod error;
pub mod generation;
pub mod mcp;
pub mod prompt;
pub mod prompt_generator;
pub mod selection;
pub mod settings;
pub mod tools;
pub mod types;
pub mod urls;
pub mod workflow;
