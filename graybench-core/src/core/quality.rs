//! Response quality checks
//!
//! Advisory heuristics over the response text: minimum length, trigram
//! repetition, and keyword-overlap relevance against the originating query.
//! Failures are reported, never fatal.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::config::QualityConfig;
use crate::config::constants::quality::REPETITION_MIN_WORDS;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct QualityReport {
    pub passed: bool,
    pub issues: Vec<String>,
    pub length_ok: bool,
    pub repetition_ok: bool,
    pub relevance_ok: bool,
}

pub struct QualityChecker {
    min_length: usize,
    max_repetition: f64,
    relevance_threshold: f64,
}

impl QualityChecker {
    pub fn new(config: &QualityConfig) -> Self {
        Self {
            min_length: config.min_length,
            max_repetition: config.max_repetition,
            relevance_threshold: config.relevance_threshold,
        }
    }

    /// Check `response` against the thresholds; `query` enables the
    /// relevance check.
    pub fn check(&self, response: &str, query: Option<&str>) -> QualityReport {
        if response.is_empty() {
            return QualityReport {
                passed: false,
                issues: vec!["Empty response".to_string()],
                length_ok: false,
                repetition_ok: false,
                relevance_ok: false,
            };
        }

        let length_ok = response.chars().count() >= self.min_length;
        let repetition_ok = self.repetition_ok(response);
        let relevance_ok = match query {
            Some(query) => self.relevance_ok(response, query),
            None => true,
        };

        let mut issues = Vec::new();
        if !length_ok {
            issues.push(format!("Response too short (min: {})", self.min_length));
        }
        if !repetition_ok {
            issues.push("Response contains too much repetition".to_string());
        }
        if !relevance_ok {
            issues.push("Response may not be relevant to the query".to_string());
        }

        QualityReport {
            passed: length_ok && repetition_ok && relevance_ok,
            issues,
            length_ok,
            repetition_ok,
            relevance_ok,
        }
    }

    /// Trigram duplication ratio must stay at or below the threshold.
    /// Short responses are exempt.
    fn repetition_ok(&self, text: &str) -> bool {
        let words: Vec<String> = text
            .to_lowercase()
            .split_whitespace()
            .map(|w| w.to_string())
            .collect();
        if words.len() < REPETITION_MIN_WORDS {
            return true;
        }

        let trigrams: Vec<String> = words.windows(3).map(|w| w.join(" ")).collect();
        if trigrams.is_empty() {
            return true;
        }
        let unique: HashSet<&String> = trigrams.iter().collect();
        let repetition_ratio = 1.0 - (unique.len() as f64 / trigrams.len() as f64);

        repetition_ratio <= self.max_repetition
    }

    /// Fraction of query terms (3+ chars) that appear in the response
    fn relevance_ok(&self, response: &str, query: &str) -> bool {
        let query_lower = query.to_lowercase();
        let query_words: HashSet<&str> = query_lower
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| w.len() >= 3)
            .collect();
        if query_words.is_empty() {
            return true;
        }

        let response_lower = response.to_lowercase();
        let matches = query_words
            .iter()
            .filter(|word| response_lower.contains(*word))
            .count();

        (matches as f64 / query_words.len() as f64) >= self.relevance_threshold
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn checker() -> QualityChecker {
        QualityChecker::new(&QualityConfig::default())
    }

    #[test]
    fn empty_response_fails_everything() {
        let report = checker().check("", None);
        assert!(!report.passed);
        assert_eq!(report.issues, vec!["Empty response".to_string()]);
    }

    #[test]
    fn short_response_fails_length_only() {
        let report = checker().check("ok", None);
        assert!(!report.length_ok);
        assert!(report.repetition_ok);
        assert!(report.relevance_ok);
    }

    #[test]
    fn repeated_text_fails_repetition() {
        let text = "the same words again ".repeat(12);
        let report = checker().check(&text, None);
        assert!(!report.repetition_ok);
        assert!(!report.passed);
    }

    #[test]
    fn varied_text_passes_repetition() {
        let text = "gradient descent iteratively updates parameters along the negative \
                    gradient of the loss surface until convergence criteria are met";
        let report = checker().check(text, None);
        assert!(report.repetition_ok);
        assert!(report.passed);
    }

    #[test]
    fn relevance_compares_query_terms() {
        let response = "Manifolds generalize surfaces; a smooth manifold admits calculus.";
        let on_topic = checker().check(response, Some("what is a smooth manifold"));
        assert!(on_topic.relevance_ok);

        let off_topic = checker().check(response, Some("bake sourdough bread starter"));
        assert!(!off_topic.relevance_ok);
        assert!(!off_topic.passed);
    }

    #[test]
    fn vacuous_query_passes_relevance() {
        let report = checker().check("a perfectly fine answer", Some("?? !"));
        assert!(report.relevance_ok);
    }
}
