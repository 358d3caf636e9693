//! Universal LLM provider abstraction with API-specific role handling
//!
//! A single request/response shape is translated into each vendor's wire
//! format by the adapters in [`crate::llm::providers`]. Role mapping is the
//! part that differs: Gemini only accepts `user`/`model` turns and takes the
//! system prompt as `systemInstruction`, Anthropic hoists it to the `system`
//! parameter, OpenAI-compatible APIs take it as a leading `system` message.

use async_trait::async_trait;
use futures::StreamExt;
use serde::{Deserialize, Serialize};

use crate::config::constants::message_roles;

/// Universal LLM request structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LLMRequest {
    pub messages: Vec<Message>,
    pub system_prompt: Option<String>,
    pub model: String,
    pub max_tokens: Option<u32>,
    pub temperature: Option<f32>,
    pub top_p: Option<f32>,
}

impl LLMRequest {
    /// Single user prompt against `model` with default sampling
    pub fn prompt(model: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            messages: vec![Message::user(prompt.into())],
            system_prompt: None,
            model: model.into(),
            max_tokens: None,
            temperature: None,
            top_p: None,
        }
    }

    /// Concatenated text of the user turns; used for cache keys and
    /// relevance checks
    pub fn user_text(&self) -> String {
        self.messages
            .iter()
            .filter(|m| m.role == MessageRole::User)
            .map(|m| m.content.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Universal message structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub role: MessageRole,
    pub content: String,
}

impl Message {
    pub fn user(content: String) -> Self {
        Self {
            role: MessageRole::User,
            content,
        }
    }

    pub fn assistant(content: String) -> Self {
        Self {
            role: MessageRole::Assistant,
            content,
        }
    }

    pub fn system(content: String) -> Self {
        Self {
            role: MessageRole::System,
            content,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    System,
    User,
    Assistant,
}

impl MessageRole {
    /// Role string for OpenAI-compatible APIs (OpenAI, OpenRouter, CAMeL)
    pub fn as_openai_str(&self) -> &'static str {
        match self {
            MessageRole::System => message_roles::SYSTEM,
            MessageRole::User => message_roles::USER,
            MessageRole::Assistant => message_roles::ASSISTANT,
        }
    }

    /// Role string for the Anthropic Messages API.
    ///
    /// System turns never appear in `messages`; callers hoist them to the
    /// `system` parameter before conversion.
    pub fn as_anthropic_str(&self) -> &'static str {
        match self {
            MessageRole::System => message_roles::SYSTEM,
            MessageRole::User => message_roles::USER,
            MessageRole::Assistant => message_roles::ASSISTANT,
        }
    }

    /// Role string for Gemini, which uses `model` instead of `assistant`
    pub fn as_gemini_str(&self) -> &'static str {
        match self {
            MessageRole::System => message_roles::SYSTEM,
            MessageRole::User => message_roles::USER,
            MessageRole::Assistant => "model",
        }
    }
}

/// Universal LLM response
#[derive(Debug, Clone, Default)]
pub struct LLMResponse {
    pub content: Option<String>,
    pub usage: Option<Usage>,
    pub finish_reason: FinishReason,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Usage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum FinishReason {
    #[default]
    Stop,
    Length,
    ContentFilter,
    Error(String),
}

/// Universal LLM provider trait
#[async_trait]
pub trait LLMProvider: Send + Sync {
    /// Provider name (e.g. "anthropic", "openai")
    fn name(&self) -> &str;

    /// Generate a completion
    async fn generate(&self, request: LLMRequest) -> Result<LLMResponse, LLMError>;

    /// Stream completion (optional)
    async fn stream(
        &self,
        request: LLMRequest,
    ) -> Result<Box<dyn futures::Stream<Item = LLMResponse> + Unpin + Send>, LLMError> {
        // Default implementation falls back to non-streaming
        let response = self.generate(request).await?;
        Ok(Box::new(futures::stream::once(async { response }).boxed()))
    }

    /// Models this provider accepts
    fn supported_models(&self) -> Vec<String>;

    /// Validate a request before dispatch
    fn validate_request(&self, request: &LLMRequest) -> Result<(), LLMError> {
        if request.messages.is_empty() {
            return Err(LLMError::InvalidRequest(format!(
                "{}: messages cannot be empty",
                self.name()
            )));
        }
        Ok(())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum LLMError {
    #[error("Authentication failed: {0}")]
    Authentication(String),
    #[error("Rate limit exceeded")]
    RateLimit,
    #[error("Token limit exceeded: {0}")]
    TokenLimit(String),
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
    #[error("Network error: {0}")]
    Network(String),
    #[error("Provider error: {0}")]
    Provider(String),
}

impl LLMError {
    /// Classify an HTTP error status plus body text the way every adapter
    /// needs: 429/quota text → RateLimit, auth text → Authentication,
    /// context-length text → TokenLimit, anything else → Provider.
    pub fn from_http(provider: &str, status: u16, body: &str) -> Self {
        let lowered = body.to_lowercase();
        if status == 429
            || lowered.contains("insufficient_quota")
            || lowered.contains("quota")
            || lowered.contains("rate limit")
        {
            return LLMError::RateLimit;
        }
        if status == 401 || status == 403 || lowered.contains("api key") {
            return LLMError::Authentication(format!("{provider}: HTTP {status}: {body}"));
        }
        if lowered.contains("maximum context length")
            || lowered.contains("context length")
            || lowered.contains("too many tokens")
            || lowered.contains("token limit")
        {
            return LLMError::TokenLimit(format!("{provider}: {body}"));
        }
        LLMError::Provider(format!("{provider}: HTTP {status}: {body}"))
    }

    /// Errors worth retrying through the fallback chain
    pub fn is_retryable(&self) -> bool {
        !matches!(self, LLMError::InvalidRequest(_))
    }
}
