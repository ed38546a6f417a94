//! Style lookup and render-type resolution against the database.

use std::collections::HashSet;

use genimage_core::error::CoreError;
use genimage_core::generation::GenerationMode;
use genimage_core::prompt::{resolve_render_type, usable_fallbacks_only, StyleSpec};
use genimage_db::models::render_type::RenderType;
use genimage_db::models::style::Style;
use genimage_db::repositories::{RenderTypeRepo, StyleRepo};
use genimage_db::DbPool;

use super::error::ToolError;

/// Load the styles a request names, in request order.
///
/// Unknown or inactive names are skipped with a warning. An empty request
/// falls back to the active default styles.
pub async fn load_styles(pool: &DbPool, names: &[String]) -> Result<Vec<StyleSpec>, ToolError> {
    let styles = if names.is_empty() {
        StyleRepo::list_defaults(pool).await?
    } else {
        let mut found = Vec::with_capacity(names.len());
        for name in names {
            match StyleRepo::find_by_name(pool, name).await? {
                Some(style) if style.is_active => found.push(style),
                Some(_) => tracing::warn!(style = %name, "Ignoring inactive style"),
                None => tracing::warn!(style = %name, "Ignoring unknown style"),
            }
        }
        found
    };

    let mut specs = Vec::with_capacity(styles.len());
    for style in styles {
        specs.push(style_spec(pool, style).await?);
    }
    Ok(specs)
}

async fn style_spec(pool: &DbPool, style: Style) -> Result<StyleSpec, ToolError> {
    let fallback_render_type = match style.default_render_type_id {
        Some(id) => RenderTypeRepo::find_by_id(pool, id).await?.map(|rt| rt.name),
        None => None,
    };
    let compatible_render_types = StyleRepo::compatible_render_type_names(pool, style.id).await?;

    Ok(StyleSpec {
        name: style.name,
        prompt_template: style.prompt_template,
        negative_prompt_template: style.negative_prompt_template,
        fallback_render_type,
        compatible_render_types,
    })
}

/// Resolve the render type a tool call runs with.
///
/// Candidates are the requested name, then each style's fallback that
/// belongs to `mode`, then the mode's default. The first one every
/// constraining style accepts wins; it must exist and belong to `mode`.
pub async fn resolve_render_type_for(
    pool: &DbPool,
    mode: GenerationMode,
    requested: Option<&str>,
    styles: &[StyleSpec],
) -> Result<RenderType, ToolError> {
    let mode_default = RenderTypeRepo::find_default(pool, mode).await?.map(|rt| rt.name);
    let in_mode: HashSet<String> = RenderTypeRepo::list(pool)
        .await?
        .into_iter()
        .filter(|rt| rt.mode().is_ok_and(|m| m == mode))
        .map(|rt| rt.name)
        .collect();
    let styles = usable_fallbacks_only(styles, |rt| in_mode.contains(rt));

    let name = resolve_render_type(requested, &styles, mode_default.as_deref())
        .map_err(|e| match e {
            CoreError::Conflict(msg) => ToolError::domain(msg),
            other => ToolError::Core(other),
        })?
        .ok_or_else(|| {
            ToolError::domain(format!(
                "No render type was given and no default is set for {mode}."
            ))
        })?;

    if let Some(requested) = requested {
        if requested != name {
            tracing::info!(requested, resolved = %name, "Render type substituted for style compatibility");
        }
    }

    let render_type = RenderTypeRepo::find_by_name(pool, &name)
        .await?
        .ok_or_else(|| ToolError::domain(format!("Render type '{name}' not found.")))?;

    if render_type.mode()? != mode {
        return Err(ToolError::domain(format!(
            "Render type '{name}' is not a {mode} render type."
        )));
    }

    Ok(render_type)
}
