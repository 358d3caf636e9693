pub mod anthropic;
pub mod camel;
pub mod gemini;
pub mod openai;
pub mod openrouter;

pub use anthropic::AnthropicProvider;
pub use camel::{CamelProvider, RolePlay};
pub use gemini::GeminiProvider;
pub use openai::OpenAIProvider;
pub use openrouter::OpenRouterProvider;
