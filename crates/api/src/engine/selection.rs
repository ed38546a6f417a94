//! Choosing the ComfyUI instance that runs a workflow.

use futures::future::join_all;
use genimage_comfyui::api::ComfyUIApi;
use genimage_core::selection::pick_least_loaded;
use genimage_db::models::comfyui_instance::ComfyUIInstance;
use genimage_db::models::render_type::RenderType;
use genimage_db::repositories::ComfyUIInstanceRepo;

use super::error::ToolError;
use crate::state::AppState;

/// Pick the least loaded active instance linked to `render_type`.
///
/// Every candidate is probed concurrently; an instance whose probe fails
/// or times out is skipped. Ties go to the lowest instance ID.
pub async fn select_instance(
    state: &AppState,
    render_type: &RenderType,
) -> Result<ComfyUIInstance, ToolError> {
    let candidates =
        ComfyUIInstanceRepo::list_active_for_render_type(&state.pool, Some(render_type.id)).await?;
    if candidates.is_empty() {
        return Err(ToolError::domain(format!(
            "No active ComfyUI instance is compatible with render type '{}'.",
            render_type.name
        )));
    }

    let timeout = state.config.queue_probe_timeout();
    let probes = join_all(candidates.iter().map(|instance| {
        let api = ComfyUIApi::with_client(state.http.clone(), instance.base_url.clone());
        async move {
            match api.queue_remaining(timeout).await {
                Ok(remaining) => {
                    tracing::debug!(instance_id = instance.id, remaining, "Queue probe");
                    Some(remaining)
                }
                Err(e) => {
                    tracing::warn!(instance_id = instance.id, error = %e, "Queue probe failed");
                    None
                }
            }
        }
    }))
    .await;

    let (instance, remaining) = pick_least_loaded(candidates.into_iter().zip(probes))
        .ok_or_else(|| {
            ToolError::domain(format!(
                "Could not reach any ComfyUI instance compatible with render type '{}'.",
                render_type.name
            ))
        })?;

    tracing::info!(
        instance_id = instance.id,
        instance = %instance.name,
        queue_remaining = remaining,
        "Selected ComfyUI instance"
    );
    Ok(instance)
}
