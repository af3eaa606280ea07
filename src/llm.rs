use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::ModelConfig;
use crate::error::{AppError, Result};

/// Text produced by a model call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelOutput {
    pub text: String,
}

/// One-shot prompt-in, text-out language model.
#[async_trait]
pub trait ModelCapability: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<ModelOutput>;
}

#[derive(Serialize)]
struct Message<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<Message<'a>>,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: AssistantMessage,
}

#[derive(Deserialize)]
struct AssistantMessage {
    #[serde(default)]
    content: Option<String>,
}

/// Client for an OpenAI-compatible chat completions endpoint (Groq by default).
pub struct ChatCompletionsModel {
    client: Client,
    config: ModelConfig,
}

impl ChatCompletionsModel {
    pub fn new(config: ModelConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| AppError::ConfigError(format!("Failed to build model client: {}", e)))?;

        Ok(ChatCompletionsModel { client, config })
    }
}

#[async_trait]
impl ModelCapability for ChatCompletionsModel {
    async fn generate(&self, prompt: &str) -> Result<ModelOutput> {
        let body = ChatRequest {
            model: &self.config.model,
            messages: vec![Message {
                role: "user",
                content: prompt,
            }],
        };

        let res = self
            .client
            .post(&self.config.endpoint)
            .bearer_auth(&self.config.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    AppError::ModelError(format!("model API request timed out: {}", e))
                } else {
                    AppError::ModelError(format!("model API request failed: {}", e))
                }
            })?;

        let status = res.status();
        if !status.is_success() {
            let detail = res
                .text()
                .await
                .unwrap_or_else(|_| "<body unavailable>".to_string());
            return Err(AppError::ModelError(format!("model API returned {}: {}", status, detail)));
        }

        let parsed: ChatResponse = res
            .json()
            .await
            .map_err(|e| AppError::ModelError(format!("Invalid response format from model API: {}", e)))?;

        let text = parsed
            .choices
            .into_iter()
            .find_map(|choice| choice.message.content)
            .filter(|content| !content.trim().is_empty())
            .ok_or_else(|| AppError::ModelError("model API response contained no text".to_string()))?;

        debug!(model = %self.config.model, chars = text.len(), "model responded");
        Ok(ModelOutput { text })
    }
}
