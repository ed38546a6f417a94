use genimage_comfyui::api::ComfyUIApiError;
use genimage_comfyui::execution::ExecutionError;
use genimage_core::error::CoreError;
use genimage_ollama::OllamaError;

/// Why a tool call failed once it was accepted.
///
/// The display text is what the caller sees in the stream's error chunk
/// (or the `-32000` response for synchronous tools).
#[derive(Debug, thiserror::Error)]
pub enum ToolError {
    #[error("{0}")]
    Core(#[from] CoreError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error(transparent)]
    Execution(#[from] ExecutionError),

    #[error(transparent)]
    ComfyUI(#[from] ComfyUIApiError),

    #[error(transparent)]
    Ollama(#[from] OllamaError),

    #[error("Failed to download image from {url}: {message}")]
    Download { url: String, message: String },

    #[error("Failed to store output image: {0}")]
    Storage(#[from] std::io::Error),

    #[error("Tool task panicked: {0}")]
    Panicked(String),
}

impl ToolError {
    /// Shorthand for a [`CoreError::Validation`] domain error.
    pub fn domain(message: impl Into<String>) -> Self {
        Self::Core(CoreError::Validation(message.into()))
    }

    /// Whether the failure is on our side rather than the request's or a
    /// backend's.
    pub fn is_internal(&self) -> bool {
        matches!(
            self,
            Self::Database(_) | Self::Panicked(_) | Self::Core(CoreError::Internal(_))
        )
    }
}
