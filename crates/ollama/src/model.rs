//! The language-model seam used by the orchestrator.
//!
//! Everything is expressed in terms of [`LanguageModel::chat`], so tests
//! and alternative backends only need to implement that one method.

use async_trait::async_trait;
use base64::Engine;
use serde_json::Value;

use crate::api::{ChatMessage, OllamaApi};
use crate::error::OllamaError;
use crate::prompts::{
    negative_user_message, positive_user_message, ENHANCE_NEGATIVE_SYSTEM, ENHANCE_POSITIVE_SYSTEM,
};

#[async_trait]
pub trait LanguageModel: Send + Sync {
    /// Model identifier, for logging.
    fn model(&self) -> &str;

    /// One non-streaming chat completion. `json` requests JSON-constrained
    /// output.
    async fn chat(&self, messages: Vec<ChatMessage>, json: bool) -> Result<String, OllamaError>;

    /// Single-turn free-text answer.
    async fn generate_text(&self, instruction: &str) -> Result<String, OllamaError> {
        self.chat(vec![ChatMessage::user(instruction)], false).await
    }

    /// Single-turn answer parsed as JSON.
    async fn generate_json(&self, instruction: &str) -> Result<Value, OllamaError> {
        let raw = self.chat(vec![ChatMessage::user(instruction)], true).await?;
        serde_json::from_str(&raw)
            .map_err(|e| OllamaError::InvalidResponse(format!("Model did not return valid JSON: {e}")))
    }

    /// Rewrite a positive prompt. An empty base yields an empty result
    /// without contacting the model.
    async fn enhance_positive(&self, base: &str, examples: Option<&str>) -> Result<String, OllamaError> {
        if base.trim().is_empty() {
            return Ok(String::new());
        }
        tracing::info!(model = self.model(), "Enhancing positive prompt");
        self.chat(
            vec![
                ChatMessage::system(ENHANCE_POSITIVE_SYSTEM),
                ChatMessage::user(positive_user_message(base, examples)),
            ],
            false,
        )
        .await
    }

    /// Build a negative prompt coherent with `positive`.
    async fn enhance_negative(&self, negative: &str, positive: &str) -> Result<String, OllamaError> {
        tracing::info!(model = self.model(), "Enhancing negative prompt");
        self.chat(
            vec![
                ChatMessage::system(ENHANCE_NEGATIVE_SYSTEM),
                ChatMessage::user(negative_user_message(negative, positive)),
            ],
            false,
        )
        .await
    }

    /// Describe an image with a multimodal model.
    async fn describe_image(&self, prompt: &str, image: &[u8]) -> Result<String, OllamaError> {
        let encoded = base64::engine::general_purpose::STANDARD.encode(image);
        tracing::info!(model = self.model(), bytes = image.len(), "Describing image");
        self.chat(vec![ChatMessage::user_with_image(prompt, encoded)], false)
            .await
    }
}

/// [`LanguageModel`] backed by one model on one Ollama instance.
#[derive(Debug, Clone)]
pub struct OllamaModel {
    api: OllamaApi,
    model: String,
    context_window: u32,
}

impl OllamaModel {
    pub fn new(api: OllamaApi, model: impl Into<String>) -> Self {
        Self {
            api,
            model: model.into(),
            context_window: 0,
        }
    }

    /// Override the model's context size (`num_ctx`).
    pub fn with_context_window(mut self, num_ctx: u32) -> Self {
        self.context_window = num_ctx;
        self
    }
}

#[async_trait]
impl LanguageModel for OllamaModel {
    fn model(&self) -> &str {
        &self.model
    }

    async fn chat(&self, messages: Vec<ChatMessage>, json: bool) -> Result<String, OllamaError> {
        self.api
            .chat(&self.model, &messages, self.context_window, json)
            .await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;

    /// Records every request and answers with a fixed reply.
    struct Recorder {
        reply: String,
        calls: Mutex<Vec<(Vec<ChatMessage>, bool)>>,
    }

    impl Recorder {
        fn new(reply: &str) -> Self {
            Self {
                reply: reply.to_string(),
                calls: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl LanguageModel for Recorder {
        fn model(&self) -> &str {
            "recorder"
        }

        async fn chat(&self, messages: Vec<ChatMessage>, json: bool) -> Result<String, OllamaError> {
            self.calls.lock().unwrap().push((messages, json));
            Ok(self.reply.clone())
        }
    }

    #[tokio::test]
    async fn empty_positive_skips_the_model() {
        let model = Recorder::new("unused");
        assert_eq!(model.enhance_positive("  ", None).await.unwrap(), "");
        assert!(model.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn positive_uses_system_prompt_and_examples() {
        let model = Recorder::new("a majestic cat");
        let out = model.enhance_positive("cat", Some("ex")).await.unwrap();
        assert_eq!(out, "a majestic cat");

        let calls = model.calls.lock().unwrap();
        let (messages, json) = &calls[0];
        assert!(!json);
        assert_eq!(messages[0].role, "system");
        assert_eq!(messages[0].content, ENHANCE_POSITIVE_SYSTEM);
        assert!(messages[1].content.contains("---\nex\n---"));
    }

    #[tokio::test]
    async fn describe_image_attaches_base64_payload() {
        let model = Recorder::new("a cat");
        model.describe_image("describe", b"abc").await.unwrap();

        let calls = model.calls.lock().unwrap();
        assert_eq!(calls[0].0[0].images, vec!["YWJj".to_string()]);
    }

    #[tokio::test]
    async fn generate_json_rejects_non_json() {
        let model = Recorder::new("not json");
        let err = model.generate_json("list").await.unwrap_err();
        assert!(matches!(err, OllamaError::InvalidResponse(_)));

        let model = Recorder::new("{\"items\": [\"a\"]}");
        let value = model.generate_json("list").await.unwrap();
        assert_eq!(value["items"][0], "a");
        assert!(model.calls.lock().unwrap()[0].1);
    }
}
