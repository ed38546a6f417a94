//! REST client for the Ollama HTTP endpoints used here: `/api/chat` and
//! `/api/tags`.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::OllamaError;
use crate::prompts::clean_content;

/// How long a loaded model stays in memory after a request.
pub const KEEP_ALIVE: &str = "5m";

/// One chat turn. `images` carries base64 payloads for multimodal models.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatMessage {
    pub role: &'static str,
    pub content: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub images: Vec<String>,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system",
            content: content.into(),
            images: Vec::new(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user",
            content: content.into(),
            images: Vec::new(),
        }
    }

    pub fn user_with_image(content: impl Into<String>, image_base64: String) -> Self {
        Self {
            role: "user",
            content: content.into(),
            images: vec![image_base64],
        }
    }
}

#[derive(Debug, Serialize)]
struct ChatOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    num_ctx: Option<u32>,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    stream: bool,
    keep_alive: &'static str,
    options: ChatOptions,
    #[serde(skip_serializing_if = "Option::is_none")]
    format: Option<&'static str>,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    message: ChatResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ChatResponseMessage {
    #[serde(default)]
    content: String,
}

/// A locally available model as listed by `/api/tags`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelInfo {
    pub name: String,
    #[serde(default)]
    pub modified_at: Option<String>,
    #[serde(default)]
    pub size: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct TagsResponse {
    #[serde(default)]
    models: Vec<ModelInfo>,
}

/// HTTP client for a single Ollama instance.
#[derive(Debug, Clone)]
pub struct OllamaApi {
    client: reqwest::Client,
    base_url: String,
    timeout: Duration,
}

impl OllamaApi {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Self {
        Self::with_client(reqwest::Client::new(), base_url, timeout)
    }

    /// Reuse an existing [`reqwest::Client`] and its connection pool.
    pub fn with_client(client: reqwest::Client, base_url: impl Into<String>, timeout: Duration) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            client,
            base_url,
            timeout,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Non-streaming chat completion. Returns the cleaned message content.
    ///
    /// * `num_ctx` - context window override; `0` keeps the model default.
    /// * `json` - ask the server to constrain output to JSON.
    pub async fn chat(
        &self,
        model: &str,
        messages: &[ChatMessage],
        num_ctx: u32,
        json: bool,
    ) -> Result<String, OllamaError> {
        let request = ChatRequest {
            model,
            messages,
            stream: false,
            keep_alive: KEEP_ALIVE,
            options: ChatOptions {
                num_ctx: (num_ctx > 0).then_some(num_ctx),
            },
            format: json.then_some("json"),
        };

        tracing::debug!(
            model,
            message_count = messages.len(),
            image_count = messages.iter().map(|m| m.images.len()).sum::<usize>(),
            json,
            "Sending chat request to Ollama",
        );

        let url = format!("{}/api/chat", self.base_url);
        let response = self
            .client
            .post(&url)
            .json(&request)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| OllamaError::from_reqwest(&self.base_url, e))?;

        let response = Self::ensure_success(response).await?;
        let body: ChatResponse = response
            .json()
            .await
            .map_err(|e| OllamaError::InvalidResponse(format!("Failed to parse chat response: {e}")))?;

        let content = clean_content(&body.message.content);
        tracing::debug!(model, chars = content.len(), "Received chat response from Ollama");
        Ok(content)
    }

    /// Models available on the server.
    pub async fn list_models(&self) -> Result<Vec<ModelInfo>, OllamaError> {
        let response = self
            .client
            .get(format!("{}/api/tags", self.base_url))
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| OllamaError::from_reqwest(&self.base_url, e))?;

        let response = Self::ensure_success(response).await?;
        let tags: TagsResponse = response
            .json()
            .await
            .map_err(|e| OllamaError::InvalidResponse(format!("Failed to parse tags response: {e}")))?;
        Ok(tags.models)
    }

    async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response, OllamaError> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!(status = status.as_u16(), body = %body, "Ollama server returned an error");
            return Err(OllamaError::Api {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }
}
