//! Centralized constants for graybench
//!
//! Keep model ids, endpoint URLs, and tuning defaults here instead of
//! scattering string literals through the codebase.

/// Model ID constants per provider
pub mod models {
    pub mod anthropic {
        pub const DEFAULT_MODEL: &str = "claude-sonnet-4-20250514";
        pub const SUPPORTED_MODELS: &[&str] = &[
            "claude-opus-4-1-20250805",
            "claude-sonnet-4-20250514",
            "claude-3-7-sonnet-20250219",
        ];

        pub const CLAUDE_OPUS_4_1_20250805: &str = "claude-opus-4-1-20250805";
        pub const CLAUDE_SONNET_4_20250514: &str = "claude-sonnet-4-20250514";
        pub const CLAUDE_3_7_SONNET_20250219: &str = "claude-3-7-sonnet-20250219";
    }

    pub mod openai {
        pub const DEFAULT_MODEL: &str = "gpt-4o";
        pub const SUPPORTED_MODELS: &[&str] = &["gpt-4o", "gpt-4o-mini", "gpt-4.1", "gpt-4.1-mini"];

        pub const GPT_4O: &str = "gpt-4o";
        pub const GPT_4O_MINI: &str = "gpt-4o-mini";
        pub const GPT_4_1: &str = "gpt-4.1";
        pub const GPT_4_1_MINI: &str = "gpt-4.1-mini";
    }

    pub mod google {
        pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";
        pub const SUPPORTED_MODELS: &[&str] = &[
            "gemini-2.5-flash",
            "gemini-2.5-pro",
            "gemini-2.5-flash-lite",
        ];

        pub const GEMINI_2_5_FLASH: &str = "gemini-2.5-flash";
        pub const GEMINI_2_5_PRO: &str = "gemini-2.5-pro";
        pub const GEMINI_2_5_FLASH_LITE: &str = "gemini-2.5-flash-lite";
    }

    // OpenRouter models (extensible via graybench.toml)
    pub mod openrouter {
        pub const DEFAULT_MODEL: &str = "anthropic/claude-sonnet-4";
        pub const SUPPORTED_MODELS: &[&str] = &[
            "anthropic/claude-sonnet-4",
            "openai/gpt-4o",
            "deepseek/deepseek-chat-v3.1",
            "qwen/qwen3-235b-a22b",
            "meta-llama/llama-3.3-70b-instruct",
        ];
    }

    pub mod camel {
        pub const DEFAULT_MODEL: &str = "camel-chat";
        pub const SUPPORTED_MODELS: &[&str] = &["camel-chat", "camel-roleplay"];
    }
}

/// Model validation and helper functions
pub mod model_helpers {
    use super::models;

    /// Get supported models for a provider
    pub fn supported_for(provider: &str) -> Option<&'static [&'static str]> {
        match provider {
            "google" | "gemini" => Some(models::google::SUPPORTED_MODELS),
            "openai" => Some(models::openai::SUPPORTED_MODELS),
            "anthropic" => Some(models::anthropic::SUPPORTED_MODELS),
            "openrouter" => Some(models::openrouter::SUPPORTED_MODELS),
            "camel" => Some(models::camel::SUPPORTED_MODELS),
            _ => None,
        }
    }

    /// Get default model for a provider
    pub fn default_for(provider: &str) -> Option<&'static str> {
        match provider {
            "google" | "gemini" => Some(models::google::DEFAULT_MODEL),
            "openai" => Some(models::openai::DEFAULT_MODEL),
            "anthropic" => Some(models::anthropic::DEFAULT_MODEL),
            "openrouter" => Some(models::openrouter::DEFAULT_MODEL),
            "camel" => Some(models::camel::DEFAULT_MODEL),
            _ => None,
        }
    }

    /// Validate if a model is supported by a provider
    pub fn is_valid(provider: &str, model: &str) -> bool {
        supported_for(provider)
            .map(|list| list.iter().any(|m| *m == model))
            .unwrap_or(false)
    }
}

/// URL constants for API endpoints
pub mod urls {
    pub const ANTHROPIC_API_BASE: &str = "https://api.anthropic.com/v1";
    pub const ANTHROPIC_API_VERSION: &str = "2023-06-01";
    pub const OPENAI_API_BASE: &str = "https://api.openai.com/v1";
    pub const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";
    pub const OPENROUTER_API_BASE: &str = "https://openrouter.ai/api/v1";
    pub const CAMEL_API_BASE: &str = "https://api.camel-ai.org/v1";

    /// Attribution headers OpenRouter asks integrators to send
    pub const OPENROUTER_REFERER: &str = "https://github.com/graybench/graybench";
    pub const OPENROUTER_TITLE: &str = "graybench";
}

/// Default configuration values
pub mod defaults {
    use super::models;

    pub const DEFAULT_PROVIDER: &str = "anthropic";
    pub const DEFAULT_MODEL: &str = models::anthropic::DEFAULT_MODEL;
    pub const DEFAULT_TEMPERATURE: f32 = 0.7;
    pub const DEFAULT_MAX_TOKENS: u32 = 3_000;
    pub const DEFAULT_TOP_P: f32 = 0.95;

    /// Clamps applied by the simplified-retry fallback tier
    pub const FALLBACK_MAX_TOKENS: u32 = 1_000;
    pub const FALLBACK_TEMPERATURE: f32 = 0.5;
}

/// Response cache defaults
pub mod cache {
    pub const DEFAULT_ENABLED: bool = true;
    pub const DEFAULT_MAX_ENTRIES: usize = 100;
    pub const DEFAULT_TTL_SECONDS: u64 = 3_600;
}

/// Per-provider request-per-minute defaults for the sliding-window tracker
pub mod rate_limits {
    pub const WINDOW_SECONDS: u64 = 60;

    pub const ANTHROPIC_RPM: usize = 10;
    pub const OPENAI_RPM: usize = 20;
    pub const GOOGLE_RPM: usize = 60;
    pub const OPENROUTER_RPM: usize = 30;
    pub const CAMEL_RPM: usize = 15;

    pub fn default_for(provider: &str) -> usize {
        match provider {
            "anthropic" => ANTHROPIC_RPM,
            "openai" => OPENAI_RPM,
            "google" | "gemini" => GOOGLE_RPM,
            "openrouter" => OPENROUTER_RPM,
            "camel" => CAMEL_RPM,
            _ => OPENROUTER_RPM,
        }
    }
}

/// Content filter defaults
pub mod content_filter {
    pub const DEFAULT_BLOCK_THRESHOLD: usize = 3;
    pub const BLOCKED_NOTICE: &str = "Content blocked by content filter.";
    pub const REDACTION_MARKER: &str = "[FILTERED]";
}

/// Response quality defaults
pub mod quality {
    pub const DEFAULT_MIN_LENGTH: usize = 10;
    pub const DEFAULT_MAX_REPETITION: f64 = 0.3;
    pub const DEFAULT_RELEVANCE_THRESHOLD: f64 = 0.5;

    /// Responses shorter than this many words skip the repetition check
    pub const REPETITION_MIN_WORDS: usize = 10;
}

/// Metrics defaults
pub mod metrics {
    pub const DEFAULT_RESPONSE_TIME_THRESHOLD_SECS: f64 = 5.0;
    pub const DEFAULT_ERROR_RATE_THRESHOLD: f64 = 0.1;
    pub const DEFAULT_STORAGE_DIR: &str = "metrics";

    /// Trailing error records considered by the error-rate alarm
    pub const ERROR_RATE_WINDOW: usize = 100;
}

/// Message role constants to avoid hardcoding strings
pub mod message_roles {
    pub const SYSTEM: &str = "system";
    pub const USER: &str = "user";
    pub const ASSISTANT: &str = "assistant";
}

/// Red-team toolkit defaults
pub mod redteam {
    pub const DEFAULT_RESULTS_DIR: &str = "benchmark_results";

    pub const CATEGORIES: &[&str] = &[
        "confidentiality_breach",
        "conflicting_objectives",
        "hierarchy_violation_info",
        "hierarchy_violation_action",
        "over_refusal",
    ];
}

/// Document store defaults
pub mod storage {
    pub const DEFAULT_ROOT: &str = ".graybench/store";

    pub const SESSIONS_COLLECTION: &str = "sessions";
    pub const CHALLENGES_COLLECTION: &str = "challenges";
    pub const BENCHMARKS_COLLECTION: &str = "benchmarks";
}
