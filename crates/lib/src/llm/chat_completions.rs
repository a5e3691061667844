//! OpenAI-compatible chat-completions client (GitHub Models by default).
//! Non-streaming only: one POST per model attempt.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use std::time::Duration;

use crate::adapters::{http_client, AdapterResult, ApiError, DEFAULT_REQUEST_TIMEOUT};

const DEFAULT_ENDPOINT: &str = "https://models.github.ai/inference";

/// Language-model backend used by the fallback chain.
#[async_trait]
pub trait LanguageModelAdapter: Send + Sync {
    /// False when no token is configured.
    fn is_configured(&self) -> bool;
    /// One completion request for `model`: system instruction plus the user's text.
    async fn complete(
        &self,
        system_prompt: &str,
        user_text: &str,
        model: &str,
    ) -> AdapterResult<CompletionResponse>;
}

/// Sampling parameters sent with every request.
#[derive(Debug, Clone, Copy)]
pub struct SamplingParams {
    pub temperature: f32,
    pub top_p: f32,
    pub max_tokens: u32,
}

/// Client for `POST {endpoint}/chat/completions` with bearer auth.
#[derive(Clone)]
pub struct ChatCompletionsClient {
    endpoint: String,
    token: Option<String>,
    params: SamplingParams,
    client: reqwest::Client,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    #[serde(default)]
    pub content: String,
}

impl ChatMessage {
    fn new(role: &str, content: &str) -> Self {
        Self {
            role: role.to_string(),
            content: content.to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    messages: Vec<ChatMessage>,
    temperature: f32,
    top_p: f32,
    max_tokens: u32,
    model: &'a str,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CompletionResponse {
    #[serde(default)]
    pub choices: Vec<Choice>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Choice {
    #[serde(default)]
    pub message: Option<ChoiceMessage>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChoiceMessage {
    #[serde(default)]
    pub content: Option<String>,
}

impl CompletionResponse {
    /// Text of the first choice, if it is present and not blank.
    pub fn reply_text(&self) -> Option<&str> {
        self.choices
            .first()
            .and_then(|c| c.message.as_ref())
            .and_then(|m| m.content.as_deref())
            .filter(|s| !s.trim().is_empty())
    }
}

impl ChatCompletionsClient {
    pub fn new(endpoint: Option<String>, token: Option<String>, params: SamplingParams) -> Self {
        let endpoint = endpoint
            .map(|u| u.trim_end_matches('/').to_string())
            .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string());
        Self {
            endpoint,
            token,
            params,
            client: http_client(DEFAULT_REQUEST_TIMEOUT),
        }
    }

    /// Replace the per-request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.client = http_client(timeout);
        self
    }
}

#[async_trait]
impl LanguageModelAdapter for ChatCompletionsClient {
    fn is_configured(&self) -> bool {
        self.token.is_some()
    }

    async fn complete(
        &self,
        system_prompt: &str,
        user_text: &str,
        model: &str,
    ) -> AdapterResult<CompletionResponse> {
        let token = self.token.as_deref().ok_or_else(ApiError::not_configured)?;
        let url = format!("{}/chat/completions", self.endpoint);
        let body = ChatRequest {
            messages: vec![
                ChatMessage::new("system", system_prompt),
                ChatMessage::new("user", user_text),
            ],
            temperature: self.params.temperature,
            top_p: self.params.top_p,
            max_tokens: self.params.max_tokens,
            model,
        };
        let res = self
            .client
            .post(&url)
            .bearer_auth(token)
            .json(&body)
            .send()
            .await?;
        if !res.status().is_success() {
            let status = res.status();
            let body = res.text().await.unwrap_or_default();
            return Err(ApiError::from_status(status, body));
        }
        Ok(res.json().await?)
    }
}
