//! Sliding-window rate tracking per provider
//!
//! Admission is fail-fast: a full window reports `false` and the caller
//! decides (the model manager routes into its fallback chain). Successful
//! generations record their timestamp; admission checks do not reserve.

use dashmap::DashMap;
use std::time::{Duration, Instant};

use crate::config::RateLimitConfig;
use crate::config::constants::rate_limits;

/// Per-provider sliding-window request tracker
#[derive(Debug)]
pub struct RateLimitTracker {
    windows: DashMap<String, Vec<Instant>>,
    config: RateLimitConfig,
    window: Duration,
}

impl RateLimitTracker {
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            windows: DashMap::new(),
            config,
            window: Duration::from_secs(rate_limits::WINDOW_SECONDS),
        }
    }

    /// Would one more request to `provider` stay within its budget?
    pub fn check(&self, provider: &str) -> bool {
        let limit = self.config.limit_for(provider);
        let mut entry = self.windows.entry(provider.to_string()).or_default();
        Self::prune(&mut entry, self.window);
        entry.len() < limit
    }

    /// Record a dispatched request against `provider`'s window
    pub fn record(&self, provider: &str) {
        let mut entry = self.windows.entry(provider.to_string()).or_default();
        Self::prune(&mut entry, self.window);
        entry.push(Instant::now());
    }

    /// Requests currently inside `provider`'s window
    pub fn current_count(&self, provider: &str) -> usize {
        match self.windows.get(provider) {
            Some(entry) => {
                let cutoff = Instant::now() - self.window;
                entry.iter().filter(|&&t| t > cutoff).count()
            }
            None => 0,
        }
    }

    fn prune(times: &mut Vec<Instant>, window: Duration) {
        let cutoff = Instant::now() - window;
        times.retain(|&t| t > cutoff);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn tracker_with(provider: &str, limit: usize) -> RateLimitTracker {
        let mut requests_per_minute = BTreeMap::new();
        requests_per_minute.insert(provider.to_string(), limit);
        RateLimitTracker::new(RateLimitConfig { requests_per_minute })
    }

    #[test]
    fn admits_until_limit() {
        let tracker = tracker_with("anthropic", 2);
        assert!(tracker.check("anthropic"));
        tracker.record("anthropic");
        assert!(tracker.check("anthropic"));
        tracker.record("anthropic");
        assert!(!tracker.check("anthropic"));
        assert_eq!(tracker.current_count("anthropic"), 2);
    }

    #[test]
    fn providers_have_independent_windows() {
        let tracker = tracker_with("anthropic", 1);
        tracker.record("anthropic");
        assert!(!tracker.check("anthropic"));
        assert!(tracker.check("openai"));
    }

    #[test]
    fn unknown_provider_uses_builtin_default() {
        let tracker = RateLimitTracker::new(RateLimitConfig::default());
        assert!(tracker.check("openai"));
        for _ in 0..rate_limits::OPENAI_RPM {
            tracker.record("openai");
        }
        assert!(!tracker.check("openai"));
    }
}
