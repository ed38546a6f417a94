//! Well-known keys of the `settings` key/value table and their parsing.

use std::collections::HashMap;

use crate::types::DbId;

/// Public base URL under which saved outputs are served.
pub const OUTPUT_URL_BASE: &str = "OUTPUT_URL_BASE";

/// Denoise used by `upscale_image` when the caller gives none.
pub const DEFAULT_UPSCALE_DENOISE: &str = "DEFAULT_UPSCALE_DENOISE";

/// Ollama instance used for prompt enhancement and the prompt generator.
pub const PROMPT_ENHANCEMENT_OLLAMA_INSTANCE_ID: &str = "PROMPT_ENHANCEMENT_OLLAMA_INSTANCE_ID";

/// Model name used on that instance.
pub const PROMPT_ENHANCEMENT_MODEL_NAME: &str = "PROMPT_ENHANCEMENT_MODEL_NAME";

/// `num_ctx` passed to Ollama. Zero leaves the model default.
pub const OLLAMA_CONTEXT_WINDOW: &str = "OLLAMA_CONTEXT_WINDOW";

/// Fallback when [`DEFAULT_UPSCALE_DENOISE`] is unset or unparsable.
pub const FALLBACK_UPSCALE_DENOISE: f64 = 0.2;

/// Typed view over the raw settings map.
#[derive(Debug, Clone, Default)]
pub struct Settings {
    values: HashMap<String, String>,
}

impl Settings {
    pub fn new(values: HashMap<String, String>) -> Self {
        Self { values }
    }

    /// Raw value, with blank strings treated as unset.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values
            .get(key)
            .map(String::as_str)
            .map(str::trim)
            .filter(|v| !v.is_empty())
    }

    pub fn output_url_base(&self) -> Option<&str> {
        self.get(OUTPUT_URL_BASE)
    }

    /// Denoise for upscales, clamped to `0.0..=1.0`.
    pub fn default_upscale_denoise(&self) -> f64 {
        self.get(DEFAULT_UPSCALE_DENOISE)
            .and_then(|v| v.parse::<f64>().ok())
            .filter(|v| v.is_finite())
            .map(|v| v.clamp(0.0, 1.0))
            .unwrap_or(FALLBACK_UPSCALE_DENOISE)
    }

    /// Context window for Ollama calls; unset or unparsable means 0.
    pub fn ollama_context_window(&self) -> u32 {
        self.get(OLLAMA_CONTEXT_WINDOW)
            .and_then(|v| v.parse::<u32>().ok())
            .unwrap_or(0)
    }

    /// Instance ID and model for prompt enhancement, when both are set.
    pub fn enhancement_target(&self) -> Option<(DbId, &str)> {
        let id = self
            .get(PROMPT_ENHANCEMENT_OLLAMA_INSTANCE_ID)?
            .parse::<DbId>()
            .ok()?;
        let model = self.get(PROMPT_ENHANCEMENT_MODEL_NAME)?;
        Some((id, model))
    }
}
