//! Optional LLM rewriting of prompts before rendering.

use genimage_core::settings::Settings;
use genimage_db::repositories::OllamaInstanceRepo;
use genimage_ollama::{LanguageModel, OllamaApi, OllamaError, OllamaModel};

use crate::state::AppState;

/// The configured prompt-enhancement model, if it is fully set up and its
/// instance is active.
pub async fn enhancement_model(
    state: &AppState,
    settings: &Settings,
) -> Result<Option<OllamaModel>, sqlx::Error> {
    let Some((instance_id, model_name)) = settings.enhancement_target() else {
        return Ok(None);
    };

    let Some(instance) = OllamaInstanceRepo::find_active(&state.pool, instance_id).await? else {
        tracing::warn!(instance_id, "Prompt enhancement instance is inactive or missing");
        return Ok(None);
    };

    let api = OllamaApi::with_client(
        state.http.clone(),
        instance.base_url,
        state.config.ollama_timeout(),
    );
    Ok(Some(
        OllamaModel::new(api, model_name).with_context_window(settings.ollama_context_window()),
    ))
}

/// Enhanced positive and negative prompts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnhancedPrompts {
    pub positive: String,
    pub negative: String,
}

/// Rewrite both prompts. The negative is built against the enhanced
/// positive, so either failure fails the pair.
pub async fn enhance_prompts<M: LanguageModel + ?Sized>(
    model: &M,
    positive: &str,
    negative: &str,
    examples: Option<&str>,
) -> Result<EnhancedPrompts, OllamaError> {
    let positive = model.enhance_positive(positive, examples).await?;
    let negative = model.enhance_negative(negative, &positive).await?;
    Ok(EnhancedPrompts { positive, negative })
}
