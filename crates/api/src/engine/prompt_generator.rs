//! The `generate_prompt` tool: a chain of small LLM calls that builds a
//! prompt from a subject, a style and a handful of visual details.

use futures::future::join_all;
use genimage_core::mcp::generated_prompt_result;
use genimage_core::prompt::join_prompt_parts;
use genimage_core::prompt_generator::{
    clean_short_answer, element_proposal_instruction, element_variation_instruction,
    extract_string_list, fusion_instruction, pick_one, random_theme, sample,
    style_choice_instruction, subject_instruction, translation_instruction, GeneratorConfig,
};
use genimage_core::settings::Settings;
use genimage_core::tools::GeneratePromptArgs;
use genimage_db::models::generation_log::NewGenerationLog;
use genimage_db::models::style::Style;
use genimage_db::repositories::{PromptGeneratorRepo, SettingRepo};
use genimage_ollama::LanguageModel;
use rand::seq::IndexedRandom;
use serde_json::Value;

use super::enhancement::enhancement_model;
use super::error::ToolError;
use crate::state::AppState;

/// A finished prompt pair and the style it was built in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedPrompt {
    pub style_name: String,
    pub positive: String,
    pub negative: String,
}

/// Run the generator with the configured enhancement model.
pub async fn generate_prompt(
    state: &AppState,
    args: GeneratePromptArgs,
    log: &mut NewGenerationLog,
) -> Result<Value, ToolError> {
    let pool = &state.pool;
    let config = PromptGeneratorRepo::get_settings(pool).await?.config();
    let allowed = PromptGeneratorRepo::allowed_styles(pool).await?;
    if allowed.is_empty() {
        return Err(ToolError::domain(
            "The prompt generator is not configured: no styles are allowed.",
        ));
    }

    let settings = Settings::new(SettingRepo::get_all(pool).await?);
    let model = enhancement_model(state, &settings).await?.ok_or_else(|| {
        ToolError::domain("The prompt generator requires an active prompt enhancement model.")
    })?;

    let generated = build_prompt(&model, &config, &allowed, &args).await?;
    log.style_names = vec![generated.style_name];
    log.positive_prompt = generated.positive.clone();
    log.negative_prompt = generated.negative.clone();

    Ok(generated_prompt_result(&generated.positive, &generated.negative))
}

/// The generator proper, independent of where the model and styles come
/// from. Only the final fusion call may fail the whole run.
pub async fn build_prompt<M: LanguageModel + ?Sized>(
    model: &M,
    config: &GeneratorConfig,
    allowed: &[Style],
    args: &GeneratePromptArgs,
) -> Result<GeneratedPrompt, ToolError> {
    let user_subject = args.subject();
    let theme = match user_subject {
        Some(subject) => translate(model, subject).await,
        None => random_theme().to_string(),
    };

    let style = choose_style(model, &theme, allowed, args.render_style.as_deref()).await?;
    tracing::debug!(theme = %theme, style = %style.name, "Prompt generator style chosen");

    let subject = propose_subjects(model, &theme, &style.name, user_subject.is_some(), config)
        .await
        .unwrap_or(theme);

    let given: Vec<&str> = args.elements();
    let elements = if given.is_empty() {
        propose_elements(model, &subject, config).await
    } else {
        join_all(given.into_iter().map(|element| translate(model, element))).await
    };

    let mut concepts = vec![subject];
    for element in &elements {
        if let Some(variation) = propose_variation(model, &concepts, element, config).await {
            concepts.push(variation);
        }
    }

    let fused = model.generate_text(&fusion_instruction(&concepts)).await?;
    let positive = join_prompt_parts([fused.trim(), style.prompt_template.as_str()]);

    let negative = match model
        .enhance_negative(&style.negative_prompt_template, &positive)
        .await
    {
        Ok(negative) => negative,
        Err(e) => {
            tracing::warn!(error = %e, "Negative prompt enhancement failed, using the style's");
            style.negative_prompt_template.clone()
        }
    };

    Ok(GeneratedPrompt {
        style_name: style.name.clone(),
        positive,
        negative,
    })
}

/// English version of `text`, or `text` itself if the model fails.
async fn translate<M: LanguageModel + ?Sized>(model: &M, text: &str) -> String {
    match model.generate_text(&translation_instruction(text)).await {
        Ok(answer) => {
            let answer = clean_short_answer(&answer);
            if answer.is_empty() {
                text.to_string()
            } else {
                answer
            }
        }
        Err(e) => {
            tracing::warn!(error = %e, "Translation failed, keeping the original text");
            text.to_string()
        }
    }
}

async fn choose_style<'a, M: LanguageModel + ?Sized>(
    model: &M,
    theme: &str,
    allowed: &'a [Style],
    requested: Option<&str>,
) -> Result<&'a Style, ToolError> {
    if let Some(requested) = requested.map(str::trim).filter(|s| !s.is_empty()) {
        if let Some(style) = allowed.iter().find(|s| s.name == requested) {
            return Ok(style);
        }
        tracing::warn!(style = requested, "Requested style is not allowed, letting the model choose");
    }

    let names: Vec<String> = allowed.iter().map(|s| s.name.clone()).collect();
    match model
        .generate_text(&style_choice_instruction(theme, &names))
        .await
    {
        Ok(answer) => {
            let answer = clean_short_answer(&answer);
            if let Some(style) = allowed.iter().find(|s| s.name.eq_ignore_ascii_case(&answer)) {
                return Ok(style);
            }
            tracing::debug!(answer = %answer, "Model chose an unknown style, picking at random");
        }
        Err(e) => tracing::warn!(error = %e, "Style choice failed, picking at random"),
    }

    let picked = allowed.choose(&mut rand::rng());
    picked.ok_or_else(|| ToolError::domain("No style is available to the prompt generator."))
}

async fn propose_subjects<M: LanguageModel + ?Sized>(
    model: &M,
    theme: &str,
    style: &str,
    user_subject: bool,
    config: &GeneratorConfig,
) -> Option<String> {
    let instruction = subject_instruction(theme, style, user_subject, config.subjects_to_propose);
    match model.generate_json(&instruction).await {
        Ok(value) => pick_one(&extract_string_list(&value)),
        Err(e) => {
            tracing::warn!(error = %e, "Subject proposal failed, using the theme");
            None
        }
    }
}

async fn propose_elements<M: LanguageModel + ?Sized>(
    model: &M,
    subject: &str,
    config: &GeneratorConfig,
) -> Vec<String> {
    let instruction = element_proposal_instruction(subject, config.elements_to_propose);
    match model.generate_json(&instruction).await {
        Ok(value) => sample(
            &extract_string_list(&value),
            config.elements_to_select as usize,
        ),
        Err(e) => {
            tracing::warn!(error = %e, "Element proposal failed, continuing without details");
            Vec::new()
        }
    }
}

async fn propose_variation<M: LanguageModel + ?Sized>(
    model: &M,
    context: &[String],
    element: &str,
    config: &GeneratorConfig,
) -> Option<String> {
    let instruction = element_variation_instruction(context, element, config.variations_to_propose);
    match model.generate_json(&instruction).await {
        Ok(value) => pick_one(&extract_string_list(&value)),
        Err(e) => {
            tracing::warn!(element, error = %e, "Variation proposal failed, skipping element");
            None
        }
    }
}
