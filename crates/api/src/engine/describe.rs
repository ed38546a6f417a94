use genimage_core::mcp::description_result;
use genimage_core::settings::Settings;
use genimage_core::tools::DescribeImageArgs;
use genimage_db::models::generation_log::NewGenerationLog;
use genimage_db::repositories::{DescriptionSettingsRepo, OllamaInstanceRepo, SettingRepo};
use genimage_ollama::{LanguageModel, OllamaApi, OllamaModel};
use serde_json::Value;

use super::error::ToolError;
use super::images::download_image;
use crate::state::AppState;

/// Describe an image with the configured multimodal model.
pub async fn describe_image(
    state: &AppState,
    args: DescribeImageArgs,
    log: &mut NewGenerationLog,
) -> Result<Value, ToolError> {
    let settings = DescriptionSettingsRepo::get(&state.pool).await?;
    let (instance_id, model_name) = settings
        .target()
        .ok_or_else(|| ToolError::domain("The describe_image tool is not configured."))?;

    let instance = OllamaInstanceRepo::find_active(&state.pool, instance_id)
        .await?
        .ok_or_else(|| {
            ToolError::domain("The Ollama instance configured for image description is inactive or missing.")
        })?;

    let prompt = settings
        .template(args.description_type, args.language)
        .ok_or_else(|| {
            ToolError::domain(format!(
                "No {} description template is configured for language '{}'.",
                args.description_type.as_str(),
                args.language.as_str()
            ))
        })?;
    log.positive_prompt = prompt.to_string();

    let image = download_image(&state.http, &args.input_image_url).await?;

    let api = OllamaApi::with_client(
        state.http.clone(),
        instance.base_url,
        state.config.ollama_timeout(),
    );
    let context_window = Settings::new(SettingRepo::get_all(&state.pool).await?).ollama_context_window();
    let model = OllamaModel::new(api, model_name).with_context_window(context_window);
    let description = model.describe_image(prompt, &image).await?;

    Ok(description_result(&description))
}
