//! Snapshot of the configuration that decides which tools are advertised.

use genimage_core::generation::GenerationMode;
use genimage_core::tools::ToolCatalog;
use genimage_db::repositories::{
    DescriptionSettingsRepo, PromptGeneratorRepo, RenderTypeRepo, StyleRepo,
};
use genimage_db::DbPool;

/// Read everything `tools/list` depends on. Every list comes back sorted
/// by name so repeated listings are identical.
pub async fn load_catalog(pool: &DbPool) -> Result<ToolCatalog, sqlx::Error> {
    let generation_render_types = RenderTypeRepo::list_visible(pool, GenerationMode::ImageGeneration)
        .await?
        .into_iter()
        .map(|rt| rt.name)
        .collect();
    let upscale_render_types = RenderTypeRepo::list_visible(pool, GenerationMode::Upscale)
        .await?
        .into_iter()
        .map(|rt| rt.name)
        .collect();
    let style_names = StyleRepo::list_active(pool)
        .await?
        .into_iter()
        .map(|s| s.name)
        .collect();

    let describe_configured = DescriptionSettingsRepo::get(pool).await?.is_configured();

    let generator_styles = PromptGeneratorRepo::allowed_styles(pool)
        .await?
        .into_iter()
        .map(|s| s.name)
        .collect();

    Ok(ToolCatalog {
        generation_render_types,
        upscale_render_types,
        style_names,
        describe_configured,
        generator_styles,
    })
}
