use crate::error::ApiError;
use async_trait::async_trait;
use core_types::{BackendConfig, BackendInfo};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::sync::watch;

// Default API endpoints per provider tag.
pub const DEFAULT_DEEPSEEK_BASE_URL: &str = "https://api.deepseek.com";
pub const DEFAULT_QWEN_BASE_URL: &str = "https://dashscope.aliyuncs.com/compatible-mode/v1";
pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_CLAUDE_BASE_URL: &str = "https://api.anthropic.com/v1";
pub const DEFAULT_GEMINI_BASE_URL: &str =
    "https://generativelanguage.googleapis.com/v1beta/openai";
pub const DEFAULT_GROK_BASE_URL: &str = "https://api.x.ai/v1";
pub const DEFAULT_KIMI_BASE_URL: &str = "https://api.moonshot.ai/v1";

/// Resolves the default base URL for a provider tag. Unknown providers fall
/// back to the OpenAI endpoint, since every supported backend speaks the
/// OpenAI-compatible chat protocol anyway.
pub fn default_base_url(provider: &str) -> &'static str {
    match provider {
        "deepseek" => DEFAULT_DEEPSEEK_BASE_URL,
        "qwen" => DEFAULT_QWEN_BASE_URL,
        "openai" => DEFAULT_OPENAI_BASE_URL,
        "claude" => DEFAULT_CLAUDE_BASE_URL,
        "gemini" => DEFAULT_GEMINI_BASE_URL,
        "grok" => DEFAULT_GROK_BASE_URL,
        "kimi" => DEFAULT_KIMI_BASE_URL,
        _ => DEFAULT_OPENAI_BASE_URL,
    }
}

/// The canonical backend registry: one entry per supported provider with
/// its default model id and display name. A convenience for assembling a
/// config file; only the API key needs to be supplied.
pub fn default_backends() -> Vec<BackendInfo> {
    let entry = |provider: &str, model: &str, display_name: &str| BackendInfo {
        provider: provider.to_string(),
        model: model.to_string(),
        display_name: display_name.to_string(),
        base_url: default_base_url(provider).to_string(),
    };

    vec![
        entry("deepseek", "deepseek-chat", "DeepSeek-Chat"),
        entry("qwen", "qwen3-max", "Qwen3-Max"),
        entry("openai", "gpt-5.2", "GPT-5.2"),
        entry("claude", "claude-opus-4-5-20251101", "Claude-Opus-4.5"),
        entry("gemini", "gemini-3-pro-preview", "Gemini-3-Pro"),
        entry("grok", "grok-3-latest", "Grok-3"),
        entry("kimi", "moonshot-v1-auto", "Moonshot-V1"),
    ]
}

/// The generic, abstract interface for a chat-completion backend.
///
/// The benchmark engine only ever sends one prompt and reads back one text
/// reply; this trait is the whole contract, which keeps mock backends for
/// tests trivial.
#[async_trait]
pub trait ChatApi: Send + Sync {
    /// Sends one prompt and returns the raw reply text. The shutdown
    /// receiver lets an external signal terminate the network wait; a
    /// cancelled call returns [`ApiError::Cancelled`].
    async fn chat(
        &self,
        prompt: &str,
        shutdown: watch::Receiver<bool>,
    ) -> Result<String, ApiError>;
}

/// Creates one owned client per benchmark task.
///
/// Each concurrent task gets its own transport client; nothing is shared or
/// mutated across tasks. Tests substitute this factory to inject mocks.
pub trait ClientFactory: Send + Sync {
    fn make(&self, backend: &BackendConfig) -> Box<dyn ChatApi>;
}

/// The default factory producing real [`LlmClient`]s.
pub struct LlmClientFactory;

impl ClientFactory for LlmClientFactory {
    fn make(&self, backend: &BackendConfig) -> Box<dyn ChatApi> {
        Box::new(LlmClient::new(backend))
    }
}

/// An OpenAI-compatible chat request.
#[derive(Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
}

#[derive(Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

/// An OpenAI-compatible chat response.
#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
    #[serde(default)]
    error: Option<ChatErrorBody>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Deserialize)]
struct ChatChoiceMessage {
    #[serde(default)]
    content: String,
}

#[derive(Deserialize)]
struct ChatErrorBody {
    #[serde(default)]
    message: String,
}

/// A concrete chat client for any OpenAI-compatible endpoint.
pub struct LlmClient {
    client: reqwest::Client,
    base_url: String,
    model: String,
    api_key: String,
}

impl LlmClient {
    pub fn new(backend: &BackendConfig) -> Self {
        let base_url = backend
            .base_url
            .clone()
            .unwrap_or_else(|| default_base_url(&backend.provider).to_string());

        Self {
            // Reasoning-heavy replies can take minutes; the generous
            // timeout is the only backstop since there are no retries.
            client: reqwest::Client::builder()
                .timeout(Duration::from_secs(120))
                .build()
                .expect("Failed to build reqwest client"),
            base_url: base_url.trim_end_matches('/').to_string(),
            model: backend.model.clone(),
            api_key: backend.api_key.clone(),
        }
    }

    async fn send_chat(&self, prompt: &str) -> Result<String, ApiError> {
        let request = ChatRequest {
            model: self.model.clone(),
            messages: vec![ChatMessage {
                role: "user",
                content: prompt.to_string(),
            }],
        };

        let url = format!("{}/chat/completions", self.base_url);
        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        let parsed: ChatResponse = serde_json::from_str(&body).map_err(|e| {
            ApiError::Deserialization(format!("unexpected chat response: {e}, body: {body}"))
        })?;

        if let Some(error) = parsed.error {
            return Err(ApiError::Api(error.message));
        }
        if !status.is_success() {
            return Err(ApiError::Api(format!("status {status}: {body}")));
        }

        parsed
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| ApiError::Api("no response choices".to_string()))
    }
}

#[async_trait]
impl ChatApi for LlmClient {
    async fn chat(
        &self,
        prompt: &str,
        mut shutdown: watch::Receiver<bool>,
    ) -> Result<String, ApiError> {
        if *shutdown.borrow() {
            return Err(ApiError::Cancelled);
        }

        tokio::select! {
            result = self.send_chat(prompt) => result,
            _ = shutdown.changed() => Err(ApiError::Cancelled),
        }
    }
}
