//! Metrics collection for generation traffic
//!
//! Response times, token usage, and errors, labeled by provider/model/query
//! kind. Slow responses and elevated error rates are logged as they happen;
//! aggregate views and JSON snapshots serve the CLI and tests.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::{error, warn};

use crate::config::MetricsConfig;
use crate::config::constants::metrics::ERROR_RATE_WINDOW;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResponseTimeRecord {
    pub timestamp: DateTime<Utc>,
    pub provider: String,
    pub model: String,
    pub query_kind: String,
    pub seconds: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenUsageRecord {
    pub timestamp: DateTime<Utc>,
    pub provider: String,
    pub model: String,
    pub query_kind: String,
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorRecord {
    pub timestamp: DateTime<Utc>,
    pub provider: String,
    pub model: String,
    pub query_kind: String,
    pub error_kind: String,
    pub message: String,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct MetricsInner {
    response_times: Vec<ResponseTimeRecord>,
    token_usage: Vec<TokenUsageRecord>,
    errors: Vec<ErrorRecord>,
}

/// Thread-safe metrics store
pub struct MetricsRecorder {
    inner: Mutex<MetricsInner>,
    config: MetricsConfig,
}

impl MetricsRecorder {
    pub fn new(config: MetricsConfig) -> Self {
        Self {
            inner: Mutex::new(MetricsInner::default()),
            config,
        }
    }

    pub fn record_response_time(&self, provider: &str, model: &str, query_kind: &str, seconds: f64) {
        if self.config.log_metrics && seconds > self.config.response_time_threshold {
            warn!("high response time ({seconds:.2}s) for {provider}/{model} on {query_kind} query");
        }
        self.with_inner(|inner| {
            inner.response_times.push(ResponseTimeRecord {
                timestamp: Utc::now(),
                provider: provider.to_string(),
                model: model.to_string(),
                query_kind: query_kind.to_string(),
                seconds,
            });
        });
    }

    pub fn record_token_usage(
        &self,
        provider: &str,
        model: &str,
        query_kind: &str,
        prompt_tokens: u32,
        completion_tokens: u32,
        total_tokens: u32,
    ) {
        self.with_inner(|inner| {
            inner.token_usage.push(TokenUsageRecord {
                timestamp: Utc::now(),
                provider: provider.to_string(),
                model: model.to_string(),
                query_kind: query_kind.to_string(),
                prompt_tokens,
                completion_tokens,
                total_tokens,
            });
        });
    }

    pub fn record_error(
        &self,
        provider: &str,
        model: &str,
        query_kind: &str,
        error_kind: &str,
        message: &str,
    ) {
        if self.config.log_metrics {
            error!("error in {provider}/{model} on {query_kind} query: {error_kind} - {message}");
        }
        let recent_errors = self.with_inner(|inner| {
            inner.errors.push(ErrorRecord {
                timestamp: Utc::now(),
                provider: provider.to_string(),
                model: model.to_string(),
                query_kind: query_kind.to_string(),
                error_kind: error_kind.to_string(),
                message: message.to_string(),
            });
            let window_start = inner.errors.len().saturating_sub(ERROR_RATE_WINDOW);
            inner.errors[window_start..]
                .iter()
                .filter(|e| e.provider == provider && e.model == model)
                .count()
        });

        let alarm_at = (ERROR_RATE_WINDOW as f64 * self.config.error_rate_threshold) as usize;
        if recent_errors >= alarm_at.max(1) && recent_errors > 1 {
            warn!(
                "high error rate detected for {provider}/{model}: {recent_errors} errors in the \
                 last {ERROR_RATE_WINDOW} records"
            );
        }
    }

    /// Average response time, optionally filtered by provider and/or model
    pub fn average_response_time(&self, provider: Option<&str>, model: Option<&str>) -> f64 {
        self.with_inner(|inner| {
            let samples: Vec<f64> = inner
                .response_times
                .iter()
                .filter(|r| provider.is_none_or(|p| r.provider == p))
                .filter(|r| model.is_none_or(|m| r.model == m))
                .map(|r| r.seconds)
                .collect();
            if samples.is_empty() {
                0.0
            } else {
                samples.iter().sum::<f64>() / samples.len() as f64
            }
        })
    }

    /// Sum of total tokens, optionally filtered by provider
    pub fn total_tokens(&self, provider: Option<&str>) -> u64 {
        self.with_inner(|inner| {
            inner
                .token_usage
                .iter()
                .filter(|r| provider.is_none_or(|p| r.provider == p))
                .map(|r| u64::from(r.total_tokens))
                .sum()
        })
    }

    pub fn error_count(&self, provider: Option<&str>) -> usize {
        self.with_inner(|inner| {
            inner
                .errors
                .iter()
                .filter(|r| provider.is_none_or(|p| r.provider == p))
                .count()
        })
    }

    /// Serialize all records for the CLI summary or persistence
    pub fn snapshot(&self) -> serde_json::Value {
        self.with_inner(|inner| {
            serde_json::json!({
                "generated_at": Utc::now(),
                "response_times": inner.response_times,
                "token_usage": inner.token_usage,
                "errors": inner.errors,
            })
        })
    }

    /// Write a timestamped snapshot under `dir`; IO failures are logged and
    /// swallowed so metrics can never take the request path down.
    pub fn save_snapshot(&self, dir: &Path) -> Option<PathBuf> {
        let snapshot = self.snapshot();
        if let Err(err) = std::fs::create_dir_all(dir) {
            error!("failed to create metrics dir {}: {err}", dir.display());
            return None;
        }
        let path = dir.join(format!("metrics_{}.json", Utc::now().format("%Y%m%d%H%M%S")));
        match serde_json::to_string_pretty(&snapshot) {
            Ok(body) => {
                if let Err(err) = std::fs::write(&path, body) {
                    error!("failed to write metrics snapshot {}: {err}", path.display());
                    return None;
                }
                Some(path)
            }
            Err(err) => {
                error!("failed to serialize metrics snapshot: {err}");
                None
            }
        }
    }

    fn with_inner<T>(&self, f: impl FnOnce(&mut MetricsInner) -> T) -> T {
        let mut inner = match self.inner.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        f(&mut inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn recorder() -> MetricsRecorder {
        MetricsRecorder::new(MetricsConfig::default())
    }

    #[test]
    fn averages_filter_by_provider_and_model() {
        let metrics = recorder();
        metrics.record_response_time("anthropic", "m1", "generate", 1.0);
        metrics.record_response_time("anthropic", "m2", "generate", 3.0);
        metrics.record_response_time("openai", "m3", "generate", 10.0);

        assert!((metrics.average_response_time(Some("anthropic"), None) - 2.0).abs() < 1e-9);
        assert!((metrics.average_response_time(Some("anthropic"), Some("m2")) - 3.0).abs() < 1e-9);
        assert!((metrics.average_response_time(None, None) - 14.0 / 3.0).abs() < 1e-9);
        assert_eq!(metrics.average_response_time(Some("gemini"), None), 0.0);
    }

    #[test]
    fn token_totals_accumulate() {
        let metrics = recorder();
        metrics.record_token_usage("anthropic", "m", "generate", 10, 5, 15);
        metrics.record_token_usage("openai", "m", "generate", 7, 3, 10);
        assert_eq!(metrics.total_tokens(None), 25);
        assert_eq!(metrics.total_tokens(Some("openai")), 10);
    }

    #[test]
    fn errors_are_counted() {
        let metrics = recorder();
        metrics.record_error("anthropic", "m", "generate", "RateLimit", "slow down");
        metrics.record_error("openai", "m", "generate", "Network", "timeout");
        assert_eq!(metrics.error_count(None), 2);
        assert_eq!(metrics.error_count(Some("anthropic")), 1);
    }

    #[test]
    fn snapshot_round_trips_to_disk() {
        let metrics = recorder();
        metrics.record_response_time("anthropic", "m", "generate", 0.5);
        let dir = tempfile::tempdir().unwrap();
        let path = metrics.save_snapshot(dir.path()).unwrap();
        let body = std::fs::read_to_string(path).unwrap();
        let value: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(value["response_times"].as_array().unwrap().len(), 1);
    }
}
