//! # LLM integration layer
//!
//! Unified interface over the providers graybench targets: Anthropic,
//! OpenAI, Google Gemini, OpenRouter, and CAMeL-AI. One request/response
//! shape ([`provider::LLMRequest`] / [`provider::LLMResponse`]), one error
//! type, and a factory that resolves provider names or infers them from
//! model ids.
//!
//! Adapters translate into each vendor's wire format; the differences that
//! matter (role naming, system-prompt placement, usage field names, error
//! classification) live entirely inside `providers/`.

pub mod error_display;
pub mod factory;
pub mod provider;
pub mod providers;

pub use factory::{LLMFactory, ProviderConfig, create_provider_with_config, get_factory};
pub use provider::{
    FinishReason, LLMError, LLMProvider, LLMRequest, LLMResponse, Message, MessageRole, Usage,
};
pub use providers::{
    AnthropicProvider, CamelProvider, GeminiProvider, OpenAIProvider, OpenRouterProvider, RolePlay,
};
