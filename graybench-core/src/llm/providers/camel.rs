//! CAMeL-AI adapter
//!
//! CAMeL-AI serves an OpenAI-compatible chat endpoint; what distinguishes it
//! is the role-playing surface. The SDK exposed three call shapes — plain
//! completion, single-role play, and assistant/user agent chat — which this
//! adapter folds into the system prompt before dispatch, keeping the wire
//! format uniform.

use crate::config::constants::{models, urls};
use crate::llm::error_display;
use crate::llm::provider::{LLMError, LLMProvider, LLMRequest, LLMResponse};
use crate::llm::providers::openai::OpenAIProvider;
use async_trait::async_trait;
use reqwest::Client as HttpClient;
use serde_json::Value;

/// Role-playing configuration for a CAMeL-AI session
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RolePlay {
    /// Single persona the model adopts
    pub role: Option<String>,
    /// Assistant-side persona for agent chat
    pub assistant_role: Option<String>,
    /// User-side persona for agent chat
    pub user_role: Option<String>,
}

impl RolePlay {
    pub fn is_configured(&self) -> bool {
        self.role.is_some() || (self.assistant_role.is_some() && self.user_role.is_some())
    }

    /// Compose the role-play instruction that precedes any caller system
    /// prompt. Mirrors the SDK's dispatch: `role` wins over the agent-chat
    /// pair.
    fn instruction(&self) -> Option<String> {
        if let Some(role) = &self.role {
            return Some(format!("You are playing the role of {role}."));
        }
        match (&self.assistant_role, &self.user_role) {
            (Some(assistant), Some(user)) => Some(format!(
                "You are {assistant}. You are in a conversation with {user}. \
                 Stay in character and respond as {assistant} would."
            )),
            _ => None,
        }
    }
}

pub struct CamelProvider {
    api_key: String,
    http_client: HttpClient,
    base_url: String,
    model: String,
    role_play: RolePlay,
}

impl CamelProvider {
    pub fn new(api_key: String) -> Self {
        Self::with_model(api_key, models::camel::DEFAULT_MODEL.to_string())
    }

    pub fn with_model(api_key: String, model: String) -> Self {
        Self {
            api_key,
            http_client: HttpClient::new(),
            base_url: urls::CAMEL_API_BASE.to_string(),
            model,
            role_play: RolePlay::default(),
        }
    }

    pub fn from_config(
        api_key: Option<String>,
        model: Option<String>,
        base_url: Option<String>,
    ) -> Self {
        let api_key_value = api_key.unwrap_or_default();
        let mut provider = if let Some(model_value) = model {
            Self::with_model(api_key_value, model_value)
        } else {
            Self::new(api_key_value)
        };
        if let Some(base) = base_url {
            provider.base_url = base;
        }
        provider
    }

    /// Attach role-playing personas to every request through this provider
    pub fn with_role_play(mut self, role_play: RolePlay) -> Self {
        self.role_play = role_play;
        self
    }

    /// Default model used when a request leaves the model unset
    pub fn model(&self) -> &str {
        &self.model
    }

    fn shape_request(&self, mut request: LLMRequest) -> LLMRequest {
        if let Some(instruction) = self.role_play.instruction() {
            request.system_prompt = Some(match request.system_prompt.take() {
                Some(existing) => format!("{instruction}\n\n{existing}"),
                None => instruction,
            });
        }
        request
    }
}

#[async_trait]
impl LLMProvider for CamelProvider {
    fn name(&self) -> &str {
        "camel"
    }

    async fn generate(&self, request: LLMRequest) -> Result<LLMResponse, LLMError> {
        let shaped = self.shape_request(request);
        let body = OpenAIProvider::convert_to_openai_format(&shaped);
        let url = format!("{}/chat/completions", self.base_url);

        let response = self
            .http_client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                let formatted_error =
                    error_display::format_llm_error("CAMeL-AI", &format!("Network error: {e}"));
                LLMError::Network(formatted_error)
            })?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let error_text = response.text().await.unwrap_or_default();
            return Err(LLMError::from_http("CAMeL-AI", status, &error_text));
        }

        let payload: Value = response.json().await.map_err(|e| {
            let formatted_error = error_display::format_llm_error(
                "CAMeL-AI",
                &format!("Failed to parse response: {e}"),
            );
            LLMError::Provider(formatted_error)
        })?;

        OpenAIProvider::parse_openai_response("CAMeL-AI", payload)
    }

    fn supported_models(&self) -> Vec<String> {
        models::camel::SUPPORTED_MODELS
            .iter()
            .map(|s| s.to_string())
            .collect()
    }

    fn validate_request(&self, request: &LLMRequest) -> Result<(), LLMError> {
        if request.messages.is_empty() {
            return Err(LLMError::InvalidRequest(
                "Messages cannot be empty".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_role_wins_over_agent_pair() {
        let role_play = RolePlay {
            role: Some("a security auditor".to_string()),
            assistant_role: Some("ignored".to_string()),
            user_role: Some("ignored".to_string()),
        };
        let instruction = role_play.instruction().unwrap();
        assert!(instruction.contains("security auditor"));
        assert!(!instruction.contains("ignored"));
    }

    #[test]
    fn role_instruction_prepends_existing_system_prompt() {
        let provider = CamelProvider::new("key".to_string()).with_role_play(RolePlay {
            role: Some("a librarian".to_string()),
            ..RolePlay::default()
        });
        let mut request = LLMRequest::prompt("camel-chat", "recommend a book");
        request.system_prompt = Some("Answer in one sentence.".to_string());
        let shaped = provider.shape_request(request);
        let system = shaped.system_prompt.unwrap();
        assert!(system.starts_with("You are playing the role of a librarian."));
        assert!(system.ends_with("Answer in one sentence."));
    }

    #[test]
    fn plain_completion_passes_through() {
        let provider = CamelProvider::new("key".to_string());
        let request = LLMRequest::prompt("camel-chat", "hello");
        let shaped = provider.shape_request(request);
        assert!(shaped.system_prompt.is_none());
    }
}
