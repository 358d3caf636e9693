//! Configuration module for graybench
//!
//! Everything is driven by `graybench.toml`; tuning constants live in
//! [`constants`], API keys come from the environment only.

pub mod api_keys;
pub mod constants;
pub mod loader;
pub mod types;

pub use loader::{CONFIG_FILE_NAME, ConfigManager, GraybenchConfig};
pub use types::{
    AgentConfig, CacheConfig, ContentFilterConfig, FallbackConfig, FallbackModel, MetricsConfig,
    QualityConfig, RateLimitConfig, RedteamConfig, StorageConfig, WorkspaceSettings,
};
