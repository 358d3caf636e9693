//! Tests for the LLM provider layer

use graybench_core::llm::{
    LLMError, LLMFactory, LLMRequest, Message, MessageRole, ProviderConfig,
    create_provider_with_config,
};

#[test]
fn test_provider_factory_creation() {
    let factory = LLMFactory::new();

    let providers = factory.list_providers();
    assert!(providers.contains(&"anthropic".to_string()));
    assert!(providers.contains(&"openai".to_string()));
    assert!(providers.contains(&"gemini".to_string()));
    assert!(providers.contains(&"openrouter".to_string()));
    assert!(providers.contains(&"camel".to_string()));
    assert_eq!(providers.len(), 5);
}

#[test]
fn test_provider_auto_detection() {
    let factory = LLMFactory::new();

    assert_eq!(
        factory.provider_from_model("gpt-4o"),
        Some("openai".to_string())
    );
    assert_eq!(
        factory.provider_from_model("gpt-4o-mini"),
        Some("openai".to_string())
    );

    assert_eq!(
        factory.provider_from_model("claude-sonnet-4-20250514"),
        Some("anthropic".to_string())
    );
    assert_eq!(
        factory.provider_from_model("claude-opus-4-1-20250805"),
        Some("anthropic".to_string())
    );

    assert_eq!(
        factory.provider_from_model("gemini-2.5-flash"),
        Some("gemini".to_string())
    );

    assert_eq!(
        factory.provider_from_model("anthropic/claude-sonnet-4"),
        Some("openrouter".to_string())
    );
    assert_eq!(
        factory.provider_from_model("camel-roleplay"),
        Some("camel".to_string())
    );

    assert_eq!(factory.provider_from_model("unknown-model"), None);
}

#[test]
fn test_provider_creation_via_factory() {
    let factory = LLMFactory::new();

    for name in ["anthropic", "openai", "gemini", "openrouter", "camel"] {
        let provider = factory
            .create_provider(
                name,
                ProviderConfig {
                    api_key: Some("test_key".to_string()),
                    base_url: None,
                    model: None,
                },
            )
            .unwrap_or_else(|_| panic!("failed to create {name}"));
        assert_eq!(provider.name(), name);
        assert!(!provider.supported_models().is_empty());
    }

    let invalid = factory.create_provider("invalid", ProviderConfig::default());
    assert!(matches!(invalid, Err(LLMError::InvalidRequest(_))));
}

#[test]
fn test_create_provider_with_config_applies_model() {
    let provider = create_provider_with_config(
        "anthropic",
        Some("test_key".to_string()),
        None,
        Some("claude-opus-4-1-20250805".to_string()),
    )
    .unwrap();
    assert_eq!(provider.name(), "anthropic");
}

#[test]
fn test_message_creation_helpers() {
    let user_msg = Message::user("Hello, world!".to_string());
    assert_eq!(user_msg.content, "Hello, world!");
    assert!(matches!(user_msg.role, MessageRole::User));

    let assistant_msg = Message::assistant("Hi there!".to_string());
    assert!(matches!(assistant_msg.role, MessageRole::Assistant));

    let system_msg = Message::system("You are a helpful assistant".to_string());
    assert!(matches!(system_msg.role, MessageRole::System));
}

#[test]
fn test_validate_rejects_empty_messages() {
    let factory = LLMFactory::new();
    let provider = factory
        .create_provider(
            "openai",
            ProviderConfig {
                api_key: Some("test_key".to_string()),
                base_url: None,
                model: None,
            },
        )
        .unwrap();

    let request = LLMRequest {
        messages: vec![],
        system_prompt: None,
        model: "gpt-4o".to_string(),
        max_tokens: None,
        temperature: None,
        top_p: None,
    };
    assert!(matches!(
        provider.validate_request(&request),
        Err(LLMError::InvalidRequest(_))
    ));

    let request = LLMRequest::prompt("gpt-4o", "hello");
    assert!(provider.validate_request(&request).is_ok());
}

#[test]
fn test_role_strings_follow_provider_dialects() {
    assert_eq!(MessageRole::Assistant.as_openai_str(), "assistant");
    assert_eq!(MessageRole::Assistant.as_gemini_str(), "model");
    assert_eq!(MessageRole::User.as_gemini_str(), "user");
    assert_eq!(MessageRole::System.as_openai_str(), "system");
}
