//! The two ComfyUI-backed tools: `generate_image` and `upscale_image`.

use genimage_comfyui::client::ComfyUIClient;
use genimage_comfyui::execution::execute_workflow;
use genimage_comfyui::output::find_output_image;
use genimage_core::generation::GenerationMode;
use genimage_core::mcp::image_result;
use genimage_core::prompt::assemble_prompt;
use genimage_core::settings::Settings;
use genimage_core::tools::{GenerateImageArgs, UpscaleImageArgs};
use genimage_core::urls::public_output_url;
use genimage_core::workflow::{NodeRole, WorkflowParams, WorkflowTemplate};
use genimage_db::models::comfyui_instance::ComfyUIInstance;
use genimage_db::models::generation_log::NewGenerationLog;
use genimage_db::repositories::SettingRepo;
use serde_json::Value;

use super::enhancement::{enhance_prompts, enhancement_model};
use super::error::ToolError;
use super::images::{fetch_source_image, save_output};
use super::resolution::{load_styles, resolve_render_type_for};
use super::selection::select_instance;
use super::workflows::load_template;
use crate::state::AppState;

/// Seed used when the caller does not pin one.
fn random_seed() -> i64 {
    i64::from(rand::random::<u32>())
}

fn require_output_base(settings: &Settings) -> Result<String, ToolError> {
    settings
        .output_url_base()
        .map(str::to_string)
        .ok_or_else(|| ToolError::domain("OUTPUT_URL_BASE is not configured."))
}

/// Render a new image from a prompt.
///
/// `log` is filled in as the request is resolved so a failure still
/// records how far it got.
pub async fn generate_image(
    state: &AppState,
    args: GenerateImageArgs,
    log: &mut NewGenerationLog,
) -> Result<Value, ToolError> {
    let pool = &state.pool;
    let settings = Settings::new(SettingRepo::get_all(pool).await?);

    let seed = args.seed.unwrap_or_else(random_seed);
    log.seed = Some(seed);
    log.aspect_ratio = args.aspect_ratio.map(|ratio| ratio.as_str().to_string());
    log.positive_prompt = args.prompt.clone();
    log.negative_prompt = args.negative_prompt().to_string();

    let styles = load_styles(pool, args.style_names()).await?;
    log.style_names = styles.iter().map(|s| s.name.clone()).collect();

    let render_type = resolve_render_type_for(
        pool,
        GenerationMode::ImageGeneration,
        args.render_type.as_deref(),
        &styles,
    )
    .await?;
    log.render_type_name = Some(render_type.name.clone());

    let mut positive = args.prompt.clone();
    let mut negative = args.negative_prompt().to_string();
    if args.enhance_prompt() {
        match enhancement_model(state, &settings).await? {
            Some(model) => {
                match enhance_prompts(&model, &positive, &negative, render_type.prompt_examples())
                    .await
                {
                    Ok(enhanced) => {
                        positive = enhanced.positive;
                        negative = enhanced.negative;
                        log.llm_enhanced = true;
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, "Prompt enhancement failed, using the original prompts");
                    }
                }
            }
            None => tracing::info!("Prompt enhancement requested but not configured"),
        }
    }

    let assembled = assemble_prompt(&positive, &negative, &styles);
    log.positive_prompt = assembled.positive.clone();
    log.negative_prompt = assembled.negative.clone();

    let template = load_template(&state.config.workflows_dir, &render_type.workflow_filename).await?;
    let output_url_base = require_output_base(&settings)?;
    let instance = select_instance(state, &render_type).await?;
    log.comfyui_instance_id = Some(instance.id);

    let workflow = template.parameterize(&WorkflowParams {
        positive_prompt: Some(assembled.positive),
        negative_prompt: Some(assembled.negative),
        seed: Some(seed),
        resolution: args.aspect_ratio.map(|ratio| ratio.dimensions()),
        ..Default::default()
    })?;

    let filename = run_workflow(state, &instance, &template, &workflow).await?;
    log.image_filename = Some(filename.clone());

    Ok(image_result(&public_output_url(&output_url_base, &filename), seed))
}

/// Re-render an existing image through an upscale workflow.
pub async fn upscale_image(
    state: &AppState,
    args: UpscaleImageArgs,
    log: &mut NewGenerationLog,
) -> Result<Value, ToolError> {
    let pool = &state.pool;
    let settings = Settings::new(SettingRepo::get_all(pool).await?);

    let seed = args.seed.unwrap_or_else(random_seed);
    log.seed = Some(seed);
    let prompt = args.prompt.clone().unwrap_or_default();
    log.positive_prompt = prompt.clone();

    let render_type =
        resolve_render_type_for(pool, GenerationMode::Upscale, args.render_type(), &[]).await?;
    log.render_type_name = Some(render_type.name.clone());

    let template = load_template(&state.config.workflows_dir, &render_type.workflow_filename).await?;
    template.require(NodeRole::InputImage)?;

    let output_url_base = require_output_base(&settings)?;
    let denoise = args
        .denoise
        .unwrap_or_else(|| settings.default_upscale_denoise());
    let instance = select_instance(state, &render_type).await?;
    log.comfyui_instance_id = Some(instance.id);

    let (upload_name, bytes) = fetch_source_image(
        &state.http,
        &state.config.outputs_dir,
        Some(&output_url_base),
        &args.input_image_url,
    )
    .await?;
    let api = ComfyUIClient::new(instance.id, &instance.base_url).api(&state.http);
    let uploaded = api.upload_image(&upload_name, bytes).await?;
    let input_image = if uploaded.subfolder.is_empty() {
        uploaded.name
    } else {
        format!("{}/{}", uploaded.subfolder, uploaded.name)
    };
    tracing::info!(instance_id = instance.id, image = %input_image, "Uploaded source image");

    let workflow = template.parameterize(&WorkflowParams {
        positive_prompt: Some(prompt),
        seed: Some(seed),
        denoise: Some(denoise),
        input_image: Some(input_image),
        ..Default::default()
    })?;

    let filename = run_workflow(state, &instance, &template, &workflow).await?;
    log.image_filename = Some(filename.clone());

    Ok(image_result(&public_output_url(&output_url_base, &filename), seed))
}

/// Execute `workflow` on `instance`, then download and store its image.
async fn run_workflow(
    state: &AppState,
    instance: &ComfyUIInstance,
    template: &WorkflowTemplate,
    workflow: &Value,
) -> Result<String, ToolError> {
    let client = ComfyUIClient::new(instance.id, &instance.base_url);
    let api = client.api(&state.http);

    let completed =
        execute_workflow(&client, &api, workflow, state.config.generation_timeout()).await?;

    let image = find_output_image(
        &completed.history,
        &completed.prompt_id,
        template.node_for(NodeRole::OutputImage),
    )
    .ok_or_else(|| {
        ToolError::domain(format!(
            "ComfyUI finished prompt {} without producing an image.",
            completed.prompt_id
        ))
    })?;

    let bytes = api.fetch_image(&image).await?;
    save_output(&state.config.outputs_dir, &image.filename, &bytes).await
}
