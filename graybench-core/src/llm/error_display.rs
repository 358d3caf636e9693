//! Uniform formatting for provider error messages

/// Format an LLM provider error consistently for logs and error payloads
pub fn format_llm_error(provider: &str, message: &str) -> String {
    format!("[{provider}] {message}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_with_provider_tag() {
        assert_eq!(
            format_llm_error("Anthropic", "Network error: timeout"),
            "[Anthropic] Network error: timeout"
        );
    }
}
