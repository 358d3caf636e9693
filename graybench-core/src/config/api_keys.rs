//! API key resolution
//!
//! Keys are sourced from environment variables (with `.env` support via
//! dotenvy), never from `graybench.toml`. A missing key simply means the
//! provider is unavailable; the manager skips it at setup.

use std::env;
use std::sync::Once;

static DOTENV: Once = Once::new();

/// Environment variable name for a provider's API key
pub fn env_var_for(provider: &str) -> Option<&'static str> {
    match provider.to_lowercase().as_str() {
        "anthropic" => Some("ANTHROPIC_API_KEY"),
        "openai" => Some("OPENAI_API_KEY"),
        "google" | "gemini" => Some("GEMINI_API_KEY"),
        "openrouter" => Some("OPENROUTER_API_KEY"),
        "camel" => Some("CAMEL_API_KEY"),
        _ => None,
    }
}

/// Resolve the API key for `provider`, if configured in the environment.
///
/// Gemini accepts `GOOGLE_API_KEY` as a fallback name.
pub fn resolve(provider: &str) -> Option<String> {
    DOTENV.call_once(|| {
        let _ = dotenvy::dotenv();
    });

    let primary = env_var_for(provider)?;
    if let Ok(key) = env::var(primary) {
        if !key.trim().is_empty() {
            return Some(key);
        }
    }

    if matches!(provider.to_lowercase().as_str(), "google" | "gemini") {
        if let Ok(key) = env::var("GOOGLE_API_KEY") {
            if !key.trim().is_empty() {
                return Some(key);
            }
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_providers_have_env_names() {
        for provider in ["anthropic", "openai", "gemini", "openrouter", "camel"] {
            assert!(env_var_for(provider).is_some(), "no env var for {provider}");
        }
        assert!(env_var_for("mystery").is_none());
    }
}
