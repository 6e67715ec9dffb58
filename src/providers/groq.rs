//! Groq API client (raw HTTP via reqwest)
//!
//! API Documentation: https://console.groq.com/docs/api-reference#chat
//!
//! Endpoints:
//! - POST {base}/chat/completions
//!
//! Groq speaks the OpenAI chat-completions format; only the fields the
//! scanner needs are modelled here.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::{build_client, check_status, TextGenerator};
use crate::models::config::{HttpPolicy, ScannerConfig};
use crate::models::errors::{AppError, AppResult};
use crate::providers::retry::RetryPolicy;
use crate::utils::constants::EXPLANATION_MAX_TOKENS;

const SERVICE: &str = "Groq";
const ENDPOINT_CHAT: &str = "/chat/completions";

// ============================================================================
// REQUEST / RESPONSE TYPES
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct ChatCompletionRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    /// "system", "user" or "assistant"
    pub role: String,
    #[serde(default)]
    pub content: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChatCompletionResponse {
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub choices: Vec<ChatChoice>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChatChoice {
    pub message: ChatMessage,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

// ============================================================================
// CLIENT IMPLEMENTATION
// ============================================================================

/// Groq chat-completions client
pub struct GroqClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
    max_tokens: u32,
    retry: RetryPolicy,
}

impl GroqClient {
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        model: impl Into<String>,
        policy: &HttpPolicy,
    ) -> AppResult<Self> {
        Ok(Self {
            client: build_client(policy)?,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            model: model.into(),
            max_tokens: EXPLANATION_MAX_TOKENS,
            retry: policy.retry,
        })
    }

    pub fn from_config(config: &ScannerConfig) -> AppResult<Self> {
        Self::new(
            config.groq_url.clone(),
            config.groq_api_key.clone(),
            config.groq_model.clone(),
            &config.http,
        )
    }

    fn build_request(&self, prompt: &str) -> ChatCompletionRequest {
        ChatCompletionRequest {
            model: self.model.clone(),
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: Some(prompt.to_string()),
            }],
            max_tokens: Some(self.max_tokens),
        }
    }
}

/// First choice's content, or an error if the model sent nothing usable
pub fn first_choice_content(response: ChatCompletionResponse) -> AppResult<String> {
    response
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .ok_or_else(|| AppError::unexpected_shape("Groq: no choices in response"))
}

#[async_trait]
impl TextGenerator for GroqClient {
    async fn generate(&self, prompt: &str) -> AppResult<String> {
        let url = format!("{}{}", self.base_url, ENDPOINT_CHAT);
        let request = self.build_request(prompt);

        debug!("[GROQ] Calling chat completions: model={}", request.model);

        let response = self
            .retry
            .run(SERVICE, || {
                post_chat(&self.client, &url, &self.api_key, &request)
            })
            .await?;

        if let Some(reason) = response.choices.first().and_then(|c| c.finish_reason.as_deref()) {
            info!("🤖 Groq explanation finished ({})", reason);
        }
        first_choice_content(response)
    }
}

async fn post_chat(
    client: &reqwest::Client,
    url: &str,
    api_key: &str,
    request: &ChatCompletionRequest,
) -> AppResult<ChatCompletionResponse> {
    let response = client
        .post(url)
        .bearer_auth(api_key)
        .json(request)
        .send()
        .await?;
    let response = check_status(SERVICE, response)?;
    Ok(response.json().await?)
}
