//! Running one workflow to completion on one instance.
//!
//! The WebSocket is opened before submission so that no completion
//! message can be missed. Frames for other clients' prompts are ignored.

use std::time::Duration;

use futures::StreamExt;
use serde_json::Value;
use tokio_tungstenite::tungstenite::Message;

use crate::api::{ComfyUIApi, ComfyUIApiError};
use crate::client::{ComfyUIClient, ComfyUIClientError, ComfyUIStream};
use crate::messages::{parse_message, ComfyUIMessage};

/// Why a prompt did not finish.
#[derive(Debug, thiserror::Error)]
pub enum ExecutionError {
    #[error(transparent)]
    Api(#[from] ComfyUIApiError),

    #[error(transparent)]
    Client(#[from] ComfyUIClientError),

    /// ComfyUI reported an `execution_error` for the prompt.
    #[error("ComfyUI execution failed at node {node}: {message}")]
    Failed { node: String, message: String },

    #[error("ComfyUI interrupted the prompt")]
    Interrupted,

    #[error("ComfyUI connection closed before the prompt finished")]
    ConnectionClosed,

    #[error("Generation timed out after {0} seconds")]
    Timeout(u64),
}

/// A finished prompt and its history entry.
#[derive(Debug, Clone)]
pub struct CompletedPrompt {
    pub prompt_id: String,
    pub history: Value,
}

/// Submit `workflow` and wait until ComfyUI reports it finished.
///
/// The whole run (connect, submit, wait, history) is bounded by `timeout`.
pub async fn execute_workflow(
    client: &ComfyUIClient,
    api: &ComfyUIApi,
    workflow: &Value,
    timeout: Duration,
) -> Result<CompletedPrompt, ExecutionError> {
    tokio::time::timeout(timeout, run_workflow(client, api, workflow))
        .await
        .map_err(|_| ExecutionError::Timeout(timeout.as_secs()))?
}

async fn run_workflow(
    client: &ComfyUIClient,
    api: &ComfyUIApi,
    workflow: &Value,
) -> Result<CompletedPrompt, ExecutionError> {
    let mut conn = client.connect().await?;
    let submitted = match api.submit_workflow(workflow, &conn.client_id).await {
        Ok(submitted) => submitted,
        Err(e) => {
            close_quietly(&mut conn.ws_stream).await;
            return Err(e.into());
        }
    };

    tracing::info!(
        instance_id = conn.instance_id,
        prompt_id = %submitted.prompt_id,
        queue_number = submitted.number,
        "Workflow submitted",
    );

    let waited = wait_for_completion(&mut conn.ws_stream, &submitted.prompt_id).await;
    close_quietly(&mut conn.ws_stream).await;
    waited?;

    let history = api.get_history(&submitted.prompt_id).await?;
    Ok(CompletedPrompt {
        prompt_id: submitted.prompt_id,
        history,
    })
}

async fn close_quietly(ws_stream: &mut ComfyUIStream) {
    if let Err(e) = ws_stream.close(None).await {
        tracing::debug!(error = %e, "Closing ComfyUI WebSocket failed");
    }
}

/// Read frames until `prompt_id` completes, fails or the socket closes.
pub async fn wait_for_completion(
    ws_stream: &mut ComfyUIStream,
    prompt_id: &str,
) -> Result<(), ExecutionError> {
    while let Some(msg_result) = ws_stream.next().await {
        match msg_result {
            Ok(Message::Text(text)) => match parse_message(&text) {
                Ok(msg) => {
                    if let Some(outcome) = completion_outcome(&msg, prompt_id) {
                        return outcome;
                    }
                }
                Err(e) => {
                    tracing::trace!(error = %e, "Skipping unrecognised ComfyUI message");
                }
            },
            Ok(Message::Binary(_)) => {
                // Preview images.
            }
            Ok(Message::Ping(_) | Message::Pong(_) | Message::Frame(_)) => {}
            Ok(Message::Close(frame)) => {
                tracing::warn!(?frame, prompt_id, "ComfyUI WebSocket closed mid-execution");
                break;
            }
            Err(e) => {
                tracing::error!(error = %e, prompt_id, "WebSocket receive error");
                break;
            }
        }
    }
    Err(ExecutionError::ConnectionClosed)
}

/// Whether `msg` ends the wait for `prompt_id`, and how.
fn completion_outcome(msg: &ComfyUIMessage, prompt_id: &str) -> Option<Result<(), ExecutionError>> {
    if msg.prompt_id() != Some(prompt_id) {
        return None;
    }
    match msg {
        ComfyUIMessage::Executing(data) if data.node.is_none() => Some(Ok(())),
        ComfyUIMessage::ExecutionSuccess(_) => Some(Ok(())),
        ComfyUIMessage::ExecutionInterrupted(_) => Some(Err(ExecutionError::Interrupted)),
        ComfyUIMessage::ExecutionError(data) => {
            tracing::error!(
                prompt_id,
                node_id = ?data.node_id,
                error_type = %data.exception_type,
                error_message = %data.exception_message,
                "Execution error",
            );
            Some(Err(ExecutionError::Failed {
                node: data
                    .node_type
                    .clone()
                    .or_else(|| data.node_id.clone())
                    .unwrap_or_else(|| "?".to_string()),
                message: data.exception_message.clone(),
            }))
        }
        ComfyUIMessage::Progress(data) => {
            tracing::debug!(prompt_id, percent = data.percent(), "Generation progress");
            None
        }
        _ => None,
    }
}
