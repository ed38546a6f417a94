//! Ollama client library.
//!
//! [`api::OllamaApi`] wraps the HTTP endpoints; [`model::LanguageModel`]
//! is the seam the orchestrator talks to, with prompt enhancement and
//! image description built on top of a single chat primitive.

pub mod api;
pub mod error;
pub mod model;
pub mod prompts;

pub use api::OllamaApi;
pub use error::OllamaError;
pub use model::{LanguageModel, OllamaModel};
