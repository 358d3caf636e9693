//! Configuration sections for `graybench.toml`

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::config::constants::{cache, content_filter, defaults, metrics, quality, redteam};

/// Agent-wide model settings
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AgentConfig {
    /// Default provider used when a request does not name one
    #[serde(default = "default_provider")]
    pub provider: String,

    /// Default model id
    #[serde(default = "default_model")]
    pub model: String,

    #[serde(default = "default_temperature")]
    pub temperature: f32,

    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    #[serde(default = "default_top_p")]
    pub top_p: f32,
}

fn default_provider() -> String {
    defaults::DEFAULT_PROVIDER.to_string()
}
fn default_model() -> String {
    defaults::DEFAULT_MODEL.to_string()
}
fn default_temperature() -> f32 {
    defaults::DEFAULT_TEMPERATURE
}
fn default_max_tokens() -> u32 {
    defaults::DEFAULT_MAX_TOKENS
}
fn default_top_p() -> f32 {
    defaults::DEFAULT_TOP_P
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            model: default_model(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            top_p: default_top_p(),
        }
    }
}

/// Response cache settings
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CacheConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,

    #[serde(default = "default_cache_entries")]
    pub max_entries: usize,

    /// Entry lifetime in seconds
    #[serde(default = "default_cache_ttl")]
    pub ttl_seconds: u64,
}

fn default_true() -> bool {
    true
}
fn default_cache_entries() -> usize {
    cache::DEFAULT_MAX_ENTRIES
}
fn default_cache_ttl() -> u64 {
    cache::DEFAULT_TTL_SECONDS
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            max_entries: default_cache_entries(),
            ttl_seconds: default_cache_ttl(),
        }
    }
}

/// Per-provider requests-per-minute overrides.
///
/// Providers absent from the map fall back to
/// `constants::rate_limits::default_for`.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RateLimitConfig {
    #[serde(default)]
    pub requests_per_minute: BTreeMap<String, usize>,
}

impl RateLimitConfig {
    pub fn limit_for(&self, provider: &str) -> usize {
        self.requests_per_minute
            .get(provider)
            .copied()
            .unwrap_or_else(|| crate::config::constants::rate_limits::default_for(provider))
    }
}

/// Content filter settings
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ContentFilterConfig {
    #[serde(default)]
    pub blocked_keywords: Vec<String>,

    /// Additional regex patterns beyond the built-in injection detectors
    #[serde(default)]
    pub blocked_patterns: Vec<String>,

    /// Distinct issues at which content is blocked outright
    #[serde(default = "default_block_threshold")]
    pub block_threshold: usize,
}

fn default_block_threshold() -> usize {
    content_filter::DEFAULT_BLOCK_THRESHOLD
}

impl Default for ContentFilterConfig {
    fn default() -> Self {
        Self {
            blocked_keywords: Vec::new(),
            blocked_patterns: Vec::new(),
            block_threshold: default_block_threshold(),
        }
    }
}

/// Response quality thresholds
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct QualityConfig {
    #[serde(default = "default_min_length")]
    pub min_length: usize,

    #[serde(default = "default_max_repetition")]
    pub max_repetition: f64,

    #[serde(default = "default_relevance_threshold")]
    pub relevance_threshold: f64,
}

fn default_min_length() -> usize {
    quality::DEFAULT_MIN_LENGTH
}
fn default_max_repetition() -> f64 {
    quality::DEFAULT_MAX_REPETITION
}
fn default_relevance_threshold() -> f64 {
    quality::DEFAULT_RELEVANCE_THRESHOLD
}

impl Default for QualityConfig {
    fn default() -> Self {
        Self {
            min_length: default_min_length(),
            max_repetition: default_max_repetition(),
            relevance_threshold: default_relevance_threshold(),
        }
    }
}

/// Metrics recorder settings
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MetricsConfig {
    #[serde(default = "default_true")]
    pub log_metrics: bool,

    /// Seconds above which a response time is logged as slow
    #[serde(default = "default_response_time_threshold")]
    pub response_time_threshold: f64,

    /// Error fraction within the trailing window that triggers an alarm
    #[serde(default = "default_error_rate_threshold")]
    pub error_rate_threshold: f64,

    #[serde(default = "default_metrics_dir")]
    pub storage_dir: String,
}

fn default_response_time_threshold() -> f64 {
    metrics::DEFAULT_RESPONSE_TIME_THRESHOLD_SECS
}
fn default_error_rate_threshold() -> f64 {
    metrics::DEFAULT_ERROR_RATE_THRESHOLD
}
fn default_metrics_dir() -> String {
    metrics::DEFAULT_STORAGE_DIR.to_string()
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            log_metrics: default_true(),
            response_time_threshold: default_response_time_threshold(),
            error_rate_threshold: default_error_rate_threshold(),
            storage_dir: default_metrics_dir(),
        }
    }
}

/// One provider/model pair in the alternate-provider fallback tier
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct FallbackModel {
    pub provider: String,
    pub model: String,
}

/// Fallback chain settings
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FallbackConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Ordered alternates tried after the simplified retry
    #[serde(default)]
    pub models: Vec<FallbackModel>,
}

impl Default for FallbackConfig {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            models: Vec::new(),
        }
    }
}

/// Learning workspace settings
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct WorkspaceSettings {
    /// Knowledge domains the workspace covers
    #[serde(default = "default_domains")]
    pub domains: Vec<String>,

    #[serde(default)]
    pub enable_research: bool,

    #[serde(default = "default_learning_style")]
    pub learning_style: String,

    #[serde(default = "default_model_type")]
    pub model_type: String,

    #[serde(default = "default_tracking_level")]
    pub tracking_level: String,
}

fn default_domains() -> Vec<String> {
    vec!["general".to_string()]
}
fn default_learning_style() -> String {
    "balanced".to_string()
}
fn default_model_type() -> String {
    "standard".to_string()
}
fn default_tracking_level() -> String {
    "basic".to_string()
}

impl Default for WorkspaceSettings {
    fn default() -> Self {
        Self {
            domains: default_domains(),
            enable_research: false,
            learning_style: default_learning_style(),
            model_type: default_model_type(),
            tracking_level: default_tracking_level(),
        }
    }
}

/// Red-team toolkit settings
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RedteamConfig {
    #[serde(default = "default_results_dir")]
    pub results_dir: String,

    /// Model configurations a benchmark sweep runs against
    #[serde(default)]
    pub models: Vec<FallbackModel>,
}

fn default_results_dir() -> String {
    redteam::DEFAULT_RESULTS_DIR.to_string()
}

impl Default for RedteamConfig {
    fn default() -> Self {
        Self {
            results_dir: default_results_dir(),
            models: Vec::new(),
        }
    }
}

/// Document store settings
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageConfig {
    #[serde(default = "default_store_root")]
    pub root: String,
}

fn default_store_root() -> String {
    crate::config::constants::storage::DEFAULT_ROOT.to_string()
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            root: default_store_root(),
        }
    }
}
