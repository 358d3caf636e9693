use crate::config::constants::{models, urls};
use crate::llm::error_display;
use crate::llm::provider::{
    FinishReason, LLMError, LLMProvider, LLMRequest, LLMResponse, MessageRole, Usage,
};
use async_trait::async_trait;
use reqwest::Client as HttpClient;
use serde_json::{Value, json};

pub struct AnthropicProvider {
    api_key: String,
    http_client: HttpClient,
    base_url: String,
    model: String,
}

impl AnthropicProvider {
    pub fn new(api_key: String) -> Self {
        Self::with_model(api_key, models::anthropic::DEFAULT_MODEL.to_string())
    }

    pub fn with_model(api_key: String, model: String) -> Self {
        Self {
            api_key,
            http_client: HttpClient::new(),
            base_url: urls::ANTHROPIC_API_BASE.to_string(),
            model,
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

    /// Default model used when a request leaves the model unset
    pub fn model(&self) -> &str {
        &self.model
    }

    fn convert_to_anthropic_format(&self, request: &LLMRequest) -> Result<Value, LLMError> {
        let mut messages = Vec::new();
        let mut system_prompt = request.system_prompt.clone();

        for msg in &request.messages {
            match msg.role {
                // System turns are hoisted to the `system` parameter;
                // the first one wins.
                MessageRole::System => {
                    if system_prompt.is_none() && !msg.content.is_empty() {
                        system_prompt = Some(msg.content.clone());
                    }
                }
                _ => {
                    if msg.content.is_empty() {
                        continue;
                    }
                    messages.push(json!({
                        "role": msg.role.as_anthropic_str(),
                        "content": [{"type": "text", "text": msg.content}]
                    }));
                }
            }
        }

        if messages.is_empty() {
            let formatted_error = error_display::format_llm_error(
                "Anthropic",
                "No convertible messages for Anthropic request",
            );
            return Err(LLMError::InvalidRequest(formatted_error));
        }

        let mut anthropic_request = json!({
            "model": request.model,
            "messages": messages,
            "max_tokens": request
                .max_tokens
                .unwrap_or(crate::config::constants::defaults::DEFAULT_MAX_TOKENS),
        });

        if let Some(system) = system_prompt {
            anthropic_request["system"] = json!(system);
        }
        if let Some(temperature) = request.temperature {
            anthropic_request["temperature"] = json!(temperature);
        }
        if let Some(top_p) = request.top_p {
            anthropic_request["top_p"] = json!(top_p);
        }

        Ok(anthropic_request)
    }

    fn parse_anthropic_response(&self, response_json: Value) -> Result<LLMResponse, LLMError> {
        let content = response_json
            .get("content")
            .and_then(|c| c.as_array())
            .ok_or_else(|| {
                let formatted = error_display::format_llm_error(
                    "Anthropic",
                    "Invalid response format: missing content",
                );
                LLMError::Provider(formatted)
            })?;

        let mut text_parts = Vec::new();
        for block in content {
            if block.get("type").and_then(|t| t.as_str()) == Some("text") {
                if let Some(text) = block.get("text").and_then(|t| t.as_str()) {
                    text_parts.push(text.to_string());
                }
            }
        }

        let stop_reason = response_json
            .get("stop_reason")
            .and_then(|sr| sr.as_str())
            .unwrap_or("end_turn");
        let finish_reason = match stop_reason {
            "end_turn" | "stop_sequence" => FinishReason::Stop,
            "max_tokens" => FinishReason::Length,
            other => FinishReason::Error(other.to_string()),
        };

        let usage = response_json.get("usage").map(|usage_value| {
            let prompt_tokens = usage_value
                .get("input_tokens")
                .and_then(|it| it.as_u64())
                .unwrap_or(0) as u32;
            let completion_tokens = usage_value
                .get("output_tokens")
                .and_then(|ot| ot.as_u64())
                .unwrap_or(0) as u32;
            Usage {
                prompt_tokens,
                completion_tokens,
                total_tokens: prompt_tokens + completion_tokens,
            }
        });

        Ok(LLMResponse {
            content: if text_parts.is_empty() {
                None
            } else {
                Some(text_parts.join(""))
            },
            usage,
            finish_reason,
        })
    }
}

#[async_trait]
impl LLMProvider for AnthropicProvider {
    fn name(&self) -> &str {
        "anthropic"
    }

    async fn generate(&self, request: LLMRequest) -> Result<LLMResponse, LLMError> {
        let anthropic_request = self.convert_to_anthropic_format(&request)?;
        let url = format!("{}/messages", self.base_url);

        let response = self
            .http_client
            .post(&url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", urls::ANTHROPIC_API_VERSION)
            .json(&anthropic_request)
            .send()
            .await
            .map_err(|e| {
                let formatted_error =
                    error_display::format_llm_error("Anthropic", &format!("Network error: {e}"));
                LLMError::Network(formatted_error)
            })?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let error_text = response.text().await.unwrap_or_default();
            return Err(LLMError::from_http("Anthropic", status, &error_text));
        }

        let anthropic_response: Value = response.json().await.map_err(|e| {
            let formatted_error = error_display::format_llm_error(
                "Anthropic",
                &format!("Failed to parse response: {e}"),
            );
            LLMError::Provider(formatted_error)
        })?;

        self.parse_anthropic_response(anthropic_response)
    }

    fn supported_models(&self) -> Vec<String> {
        models::anthropic::SUPPORTED_MODELS
            .iter()
            .map(|s| s.to_string())
            .collect()
    }

    fn validate_request(&self, request: &LLMRequest) -> Result<(), LLMError> {
        if request.messages.is_empty() {
            let formatted_error =
                error_display::format_llm_error("Anthropic", "Messages cannot be empty");
            return Err(LLMError::InvalidRequest(formatted_error));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::provider::Message;

    fn provider() -> AnthropicProvider {
        AnthropicProvider::new("test-key".to_string())
    }

    #[test]
    fn system_turn_hoisted_to_system_parameter() {
        let request = LLMRequest {
            messages: vec![
                Message::system("stay terse".to_string()),
                Message::user("hello".to_string()),
            ],
            system_prompt: None,
            model: models::anthropic::DEFAULT_MODEL.to_string(),
            max_tokens: Some(64),
            temperature: None,
            top_p: None,
        };
        let body = provider().convert_to_anthropic_format(&request).unwrap();
        assert_eq!(body["system"], "stay terse");
        assert_eq!(body["messages"].as_array().unwrap().len(), 1);
        assert_eq!(body["messages"][0]["role"], "user");
    }

    #[test]
    fn parses_usage_and_text_blocks() {
        let raw = serde_json::json!({
            "content": [
                {"type": "text", "text": "Hello "},
                {"type": "text", "text": "world"}
            ],
            "stop_reason": "end_turn",
            "usage": {"input_tokens": 12, "output_tokens": 5}
        });
        let parsed = provider().parse_anthropic_response(raw).unwrap();
        assert_eq!(parsed.content.as_deref(), Some("Hello world"));
        let usage = parsed.usage.unwrap();
        assert_eq!(usage.total_tokens, 17);
        assert_eq!(parsed.finish_reason, FinishReason::Stop);
    }

    #[test]
    fn missing_content_is_a_provider_error() {
        let parsed = provider().parse_anthropic_response(serde_json::json!({"id": "x"}));
        assert!(matches!(parsed, Err(LLMError::Provider(_))));
    }
}
