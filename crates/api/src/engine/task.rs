//! Running accepted tool calls: audit logging, panic isolation and stream
//! delivery.

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::time::{Duration, Instant};

use futures::FutureExt;
use genimage_core::generation::GenerationStatus;
use genimage_core::mcp::{stream_chunk_error, stream_chunk_result, stream_end};
use genimage_core::tools::{
    DescribeImageArgs, GenerateImageArgs, GeneratePromptArgs, ToolName, UpscaleImageArgs,
};
use genimage_db::models::generation_log::NewGenerationLog;
use genimage_db::repositories::GenerationLogRepo;
use serde_json::Value;

use super::error::ToolError;
use super::{describe, generation, prompt_generator};
use crate::state::AppState;

/// How long a finished task waits for the caller to open the stream
/// before publishing into the void.
const SUBSCRIBER_GRACE: Duration = Duration::from_secs(5);

/// A validated tool call, ready to run.
#[derive(Debug, Clone)]
pub enum ToolJob {
    GenerateImage(GenerateImageArgs),
    UpscaleImage(UpscaleImageArgs),
    DescribeImage(DescribeImageArgs),
    GeneratePrompt(GeneratePromptArgs),
}

impl ToolJob {
    pub fn tool(&self) -> ToolName {
        match self {
            Self::GenerateImage(_) => ToolName::GenerateImage,
            Self::UpscaleImage(_) => ToolName::UpscaleImage,
            Self::DescribeImage(_) => ToolName::DescribeImage,
            Self::GeneratePrompt(_) => ToolName::GeneratePrompt,
        }
    }

    /// Whether the result is delivered over a stream rather than in the
    /// JSON-RPC response.
    pub fn is_streamed(&self) -> bool {
        !matches!(self, Self::GeneratePrompt(_))
    }

    async fn run(self, state: &AppState, log: &mut NewGenerationLog) -> Result<Value, ToolError> {
        match self {
            Self::GenerateImage(args) => generation::generate_image(state, args, log).await,
            Self::UpscaleImage(args) => generation::upscale_image(state, args, log).await,
            Self::DescribeImage(args) => describe::describe_image(state, args, log).await,
            Self::GeneratePrompt(args) => prompt_generator::generate_prompt(state, args, log).await,
        }
    }
}

/// Run a job to completion and write exactly one audit row for it.
///
/// A panic inside the job is caught and reported as a failure.
pub async fn execute(state: &AppState, job: ToolJob) -> Result<Value, ToolError> {
    let tool = job.tool().as_str();
    let started = Instant::now();
    let mut log = NewGenerationLog::new(tool);

    let outcome = AssertUnwindSafe(job.run(state, &mut log))
        .catch_unwind()
        .await
        .unwrap_or_else(|panic| Err(ToolError::Panicked(panic_message(panic.as_ref()))));

    let duration_ms = i64::try_from(started.elapsed().as_millis()).unwrap_or(i64::MAX);
    log.duration_ms = Some(duration_ms);
    match &outcome {
        Ok(_) => {
            log.status = GenerationStatus::Success;
            tracing::info!(tool, duration_ms, "Tool call succeeded");
        }
        Err(e) => {
            log.status = GenerationStatus::Failed;
            log.error_message = Some(e.to_string());
            if e.is_internal() {
                tracing::error!(tool, duration_ms, error = %e, "Tool call failed");
            } else {
                tracing::warn!(tool, duration_ms, error = %e, "Tool call failed");
            }
        }
    }

    if let Err(e) = GenerationLogRepo::create(&state.pool, &log).await {
        tracing::error!(tool, error = %e, "Failed to write generation log");
    }

    outcome
}

/// Run a job in the background and deliver its outcome on `stream_id`:
/// one chunk, then an unconditional end.
pub fn spawn_streamed(state: AppState, stream_id: String, job: ToolJob) {
    let tasks = state.tasks.clone();
    tasks.spawn(async move {
        let outcome = execute(&state, job).await;

        if !state
            .streams
            .wait_for_subscriber(&stream_id, SUBSCRIBER_GRACE)
            .await
        {
            tracing::debug!(stream_id = %stream_id, "No subscriber, result will be dropped");
        }

        let chunk = match outcome {
            Ok(result) => stream_chunk_result(&stream_id, result),
            Err(e) => stream_chunk_error(&stream_id, &e.to_string()),
        };
        state.streams.publish_chunk(&stream_id, &chunk).await;
        state.streams.end(&stream_id, &stream_end(&stream_id)).await;
    });
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    panic
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| panic.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn panic_payloads_become_messages() {
        let payload = std::panic::catch_unwind(|| panic!("boom {}", 1)).unwrap_err();
        assert_eq!(panic_message(payload.as_ref()), "boom 1");

        let payload = std::panic::catch_unwind(|| panic!("static")).unwrap_err();
        assert_eq!(panic_message(payload.as_ref()), "static");
    }

    #[test]
    fn only_generate_prompt_is_synchronous() {
        assert!(ToolJob::GenerateImage(serde_json::from_value(serde_json::json!({"prompt": "x"})).unwrap()).is_streamed());
        assert!(!ToolJob::GeneratePrompt(GeneratePromptArgs::default()).is_streamed());
    }
}
