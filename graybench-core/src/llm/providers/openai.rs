use crate::config::constants::{message_roles, models, urls};
use crate::llm::error_display;
use crate::llm::provider::{
    FinishReason, LLMError, LLMProvider, LLMRequest, LLMResponse, Usage,
};
use async_trait::async_trait;
use reqwest::Client as HttpClient;
use serde_json::{Value, json};

pub struct OpenAIProvider {
    api_key: String,
    http_client: HttpClient,
    base_url: String,
    model: String,
}

impl OpenAIProvider {
    pub fn new(api_key: String) -> Self {
        Self::with_model(api_key, models::openai::DEFAULT_MODEL.to_string())
    }

    pub fn with_model(api_key: String, model: String) -> Self {
        Self {
            api_key,
            http_client: HttpClient::new(),
            base_url: urls::OPENAI_API_BASE.to_string(),
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

    pub(crate) fn convert_to_openai_format(request: &LLMRequest) -> Value {
        let mut messages = Vec::new();

        if let Some(system_prompt) = &request.system_prompt {
            messages.push(json!({
                "role": message_roles::SYSTEM,
                "content": system_prompt
            }));
        }

        for msg in &request.messages {
            if msg.content.is_empty() {
                continue;
            }
            messages.push(json!({
                "role": msg.role.as_openai_str(),
                "content": msg.content
            }));
        }

        let mut body = json!({
            "model": request.model,
            "messages": messages,
        });
        if let Some(max_tokens) = request.max_tokens {
            body["max_tokens"] = json!(max_tokens);
        }
        if let Some(temperature) = request.temperature {
            body["temperature"] = json!(temperature);
        }
        if let Some(top_p) = request.top_p {
            body["top_p"] = json!(top_p);
        }
        body
    }

    pub(crate) fn parse_openai_response(
        provider_label: &str,
        response_json: Value,
    ) -> Result<LLMResponse, LLMError> {
        let choice = response_json
            .get("choices")
            .and_then(|c| c.as_array())
            .and_then(|c| c.first())
            .ok_or_else(|| {
                let formatted = error_display::format_llm_error(
                    provider_label,
                    "Invalid response format: missing choices",
                );
                LLMError::Provider(formatted)
            })?;

        let content = choice
            .get("message")
            .and_then(|m| m.get("content"))
            .and_then(|c| c.as_str())
            .map(|s| s.to_string());

        let finish_reason = match choice.get("finish_reason").and_then(|f| f.as_str()) {
            Some("stop") | None => FinishReason::Stop,
            Some("length") => FinishReason::Length,
            Some("content_filter") => FinishReason::ContentFilter,
            Some(other) => FinishReason::Error(other.to_string()),
        };

        let usage = response_json.get("usage").map(|usage_value| Usage {
            prompt_tokens: usage_value
                .get("prompt_tokens")
                .and_then(|v| v.as_u64())
                .unwrap_or(0) as u32,
            completion_tokens: usage_value
                .get("completion_tokens")
                .and_then(|v| v.as_u64())
                .unwrap_or(0) as u32,
            total_tokens: usage_value
                .get("total_tokens")
                .and_then(|v| v.as_u64())
                .unwrap_or(0) as u32,
        });

        Ok(LLMResponse {
            content,
            usage,
            finish_reason,
        })
    }
}

#[async_trait]
impl LLMProvider for OpenAIProvider {
    fn name(&self) -> &str {
        "openai"
    }

    async fn generate(&self, request: LLMRequest) -> Result<LLMResponse, LLMError> {
        let openai_request = Self::convert_to_openai_format(&request);
        let url = format!("{}/chat/completions", self.base_url);

        let response = self
            .http_client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&openai_request)
            .send()
            .await
            .map_err(|e| {
                let formatted_error =
                    error_display::format_llm_error("OpenAI", &format!("Network error: {e}"));
                LLMError::Network(formatted_error)
            })?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let error_text = response.text().await.unwrap_or_default();
            return Err(LLMError::from_http("OpenAI", status, &error_text));
        }

        let openai_response: Value = response.json().await.map_err(|e| {
            let formatted_error = error_display::format_llm_error(
                "OpenAI",
                &format!("Failed to parse response: {e}"),
            );
            LLMError::Provider(formatted_error)
        })?;

        Self::parse_openai_response("OpenAI", openai_response)
    }

    fn supported_models(&self) -> Vec<String> {
        models::openai::SUPPORTED_MODELS
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
        if request.model.is_empty() {
            return Err(LLMError::InvalidRequest(
                "Model cannot be empty".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::provider::Message;

    #[test]
    fn system_prompt_becomes_leading_system_message() {
        let mut request = LLMRequest::prompt("gpt-4o", "hi");
        request.system_prompt = Some("be brief".to_string());
        let body = OpenAIProvider::convert_to_openai_format(&request);
        let messages = body["messages"].as_array().unwrap();
        assert_eq!(messages[0]["role"], "system");
        assert_eq!(messages[1]["role"], "user");
    }

    #[test]
    fn empty_turns_are_dropped() {
        let request = LLMRequest {
            messages: vec![Message::user(String::new()), Message::user("q".to_string())],
            system_prompt: None,
            model: "gpt-4o".to_string(),
            max_tokens: Some(10),
            temperature: Some(0.2),
            top_p: None,
        };
        let body = OpenAIProvider::convert_to_openai_format(&request);
        assert_eq!(body["messages"].as_array().unwrap().len(), 1);
        assert_eq!(body["max_tokens"], 10);
    }

    #[test]
    fn parses_chat_completion_shape() {
        let raw = serde_json::json!({
            "choices": [{
                "message": {"role": "assistant", "content": "four"},
                "finish_reason": "stop"
            }],
            "usage": {"prompt_tokens": 9, "completion_tokens": 1, "total_tokens": 10}
        });
        let parsed = OpenAIProvider::parse_openai_response("OpenAI", raw).unwrap();
        assert_eq!(parsed.content.as_deref(), Some("four"));
        assert_eq!(parsed.usage.unwrap().total_tokens, 10);
    }
}
