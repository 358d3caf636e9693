use crate::config::constants::{models, urls};
use crate::llm::error_display;
use crate::llm::provider::{
    FinishReason, LLMError, LLMProvider, LLMRequest, LLMResponse, MessageRole, Usage,
};
use async_trait::async_trait;
use reqwest::Client as HttpClient;
use serde_json::{Value, json};

pub struct GeminiProvider {
    api_key: String,
    http_client: HttpClient,
    base_url: String,
    model: String,
}

impl GeminiProvider {
    pub fn new(api_key: String) -> Self {
        Self::with_model(api_key, models::google::DEFAULT_MODEL.to_string())
    }

    pub fn with_model(api_key: String, model: String) -> Self {
        Self {
            api_key,
            http_client: HttpClient::new(),
            base_url: urls::GEMINI_API_BASE.to_string(),
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

    fn convert_to_gemini_format(&self, request: &LLMRequest) -> Result<Value, LLMError> {
        let mut contents = Vec::new();
        let mut system_instruction = request.system_prompt.clone();

        for message in &request.messages {
            // System turns become systemInstruction, never contents entries.
            if message.role == MessageRole::System {
                if system_instruction.is_none() && !message.content.is_empty() {
                    system_instruction = Some(message.content.clone());
                }
                continue;
            }
            if message.content.is_empty() {
                continue;
            }
            contents.push(json!({
                "role": message.role.as_gemini_str(),
                "parts": [{"text": message.content}]
            }));
        }

        if contents.is_empty() {
            let formatted = error_display::format_llm_error(
                "Gemini",
                "No convertible messages for Gemini request",
            );
            return Err(LLMError::InvalidRequest(formatted));
        }

        let mut generation_config = json!({});
        if let Some(temperature) = request.temperature {
            generation_config["temperature"] = json!(temperature);
        }
        if let Some(max_tokens) = request.max_tokens {
            generation_config["maxOutputTokens"] = json!(max_tokens);
        }
        if let Some(top_p) = request.top_p {
            generation_config["topP"] = json!(top_p);
        }

        let mut body = json!({
            "contents": contents,
            "generationConfig": generation_config,
        });
        if let Some(instruction) = system_instruction {
            body["systemInstruction"] = json!({
                "parts": [{"text": instruction}]
            });
        }

        Ok(body)
    }

    fn convert_from_gemini_format(&self, response_json: Value) -> Result<LLMResponse, LLMError> {
        let candidate = response_json
            .get("candidates")
            .and_then(|c| c.as_array())
            .and_then(|c| c.first())
            .ok_or_else(|| {
                let formatted = error_display::format_llm_error(
                    "Gemini",
                    "Invalid response format: missing candidates",
                );
                LLMError::Provider(formatted)
            })?;

        let mut text_parts = Vec::new();
        if let Some(parts) = candidate
            .get("content")
            .and_then(|c| c.get("parts"))
            .and_then(|p| p.as_array())
        {
            for part in parts {
                if let Some(text) = part.get("text").and_then(|t| t.as_str()) {
                    text_parts.push(text.to_string());
                }
            }
        }

        let finish_reason = match candidate.get("finishReason").and_then(|f| f.as_str()) {
            Some("STOP") | None => FinishReason::Stop,
            Some("MAX_TOKENS") => FinishReason::Length,
            Some("SAFETY") | Some("PROHIBITED_CONTENT") => FinishReason::ContentFilter,
            Some(other) => FinishReason::Error(other.to_string()),
        };

        let usage = response_json.get("usageMetadata").map(|meta| Usage {
            prompt_tokens: meta
                .get("promptTokenCount")
                .and_then(|v| v.as_u64())
                .unwrap_or(0) as u32,
            completion_tokens: meta
                .get("candidatesTokenCount")
                .and_then(|v| v.as_u64())
                .unwrap_or(0) as u32,
            total_tokens: meta
                .get("totalTokenCount")
                .and_then(|v| v.as_u64())
                .unwrap_or(0) as u32,
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
impl LLMProvider for GeminiProvider {
    fn name(&self) -> &str {
        "gemini"
    }

    async fn generate(&self, request: LLMRequest) -> Result<LLMResponse, LLMError> {
        let gemini_request = self.convert_to_gemini_format(&request)?;
        let url = format!(
            "{}/models/{}:generateContent?key={}",
            self.base_url, request.model, self.api_key
        );

        let response = self
            .http_client
            .post(&url)
            .json(&gemini_request)
            .send()
            .await
            .map_err(|e| {
                let formatted_error =
                    error_display::format_llm_error("Gemini", &format!("Network error: {e}"));
                LLMError::Network(formatted_error)
            })?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let error_text = response.text().await.unwrap_or_default();
            return Err(LLMError::from_http("Gemini", status, &error_text));
        }

        let gemini_response: Value = response.json().await.map_err(|e| {
            let formatted_error = error_display::format_llm_error(
                "Gemini",
                &format!("Failed to parse response: {e}"),
            );
            LLMError::Provider(formatted_error)
        })?;

        self.convert_from_gemini_format(gemini_response)
    }

    fn supported_models(&self) -> Vec<String> {
        models::google::SUPPORTED_MODELS
            .iter()
            .map(|s| s.to_string())
            .collect()
    }

    fn validate_request(&self, request: &LLMRequest) -> Result<(), LLMError> {
        if request.messages.is_empty() {
            let formatted = error_display::format_llm_error("Gemini", "Messages cannot be empty");
            return Err(LLMError::InvalidRequest(formatted));
        }
        Ok(())
    }
}
