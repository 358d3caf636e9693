//! Core runtime: the model manager and the passes it applies

pub mod cache;
pub mod filter;
pub mod manager;
pub mod metrics;
pub mod quality;
pub mod rate_limiter;

pub use cache::{ResponseCache, cache_key};
pub use filter::{ContentFilter, FilterReport};
pub use manager::{
    FallbackInfo, FallbackStrategy, GenerateOutcome, GenerateRequest, ModelManager,
};
pub use metrics::MetricsRecorder;
pub use quality::{QualityChecker, QualityReport};
pub use rate_limiter::RateLimitTracker;
