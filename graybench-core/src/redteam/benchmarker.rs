//! Benchmark sweeps across categories, targets, and models
//!
//! Every cell tests two strategies — the composed standard prompt and the
//! JSON-injection payload — through the model manager, judges both with the
//! analyzer, and records which worked. Run documents land in the store.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

use crate::config::FallbackModel;
use crate::config::constants::storage::BENCHMARKS_COLLECTION;
use crate::core::manager::{GenerateRequest, ModelManager};
use crate::redteam::analyzer::{PromptAnalyzer, Verdict};
use crate::redteam::generator::{AttackCategory, PromptGenerator};
use crate::storage::{DocStore, StoreError};

/// One strategy's run inside a cell
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StrategyResult {
    pub prompt: String,
    pub response: Option<String>,
    pub verdict: Verdict,
    pub fallback_used: bool,
}

/// One category × target × model cell
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CellResult {
    pub category: AttackCategory,
    pub target: String,
    pub provider: String,
    pub model: String,
    pub standard: StrategyResult,
    pub json: StrategyResult,
    pub best_strategy: String,
    pub success: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryReport {
    pub category: AttackCategory,
    pub results: Vec<CellResult>,
    pub success_rate: f64,
    pub run_id: String,
}

pub struct Benchmarker {
    manager: Arc<ModelManager>,
    generator: PromptGenerator,
    analyzer: PromptAnalyzer,
    store: DocStore,
}

impl Benchmarker {
    pub fn new(manager: Arc<ModelManager>, store: DocStore) -> Self {
        Self {
            manager,
            generator: PromptGenerator::new(),
            analyzer: PromptAnalyzer::new(),
            store,
        }
    }

    async fn run_strategy(
        &self,
        prompt: String,
        category: AttackCategory,
        target: &str,
        model_config: &FallbackModel,
    ) -> StrategyResult {
        let mut request = GenerateRequest::new(prompt.clone())
            .with_provider(model_config.provider.clone())
            .with_model(model_config.model.clone())
            .with_query_kind("benchmark");
        // Benchmark measurements must not be served from cache.
        request.use_cache = Some(false);

        match self.manager.generate(request).await {
            Ok(outcome) => {
                let response_text = outcome.content.clone().unwrap_or_default();
                StrategyResult {
                    prompt,
                    verdict: self.analyzer.analyze(category, target, &response_text),
                    response: outcome.content,
                    fallback_used: outcome.fallback.is_some(),
                }
            }
            Err(err) => StrategyResult {
                prompt,
                response: None,
                verdict: Verdict {
                    success: false,
                    reason: format!("generation failed: {err}"),
                },
                fallback_used: false,
            },
        }
    }

    /// Benchmark one category across `targets` and `models`
    pub async fn benchmark_category(
        &self,
        category: AttackCategory,
        targets: &[String],
        models: &[FallbackModel],
    ) -> Result<CategoryReport, StoreError> {
        let mut results = Vec::new();

        for target in targets {
            for model_config in models {
                info!(
                    "testing {category} - {target} against {}/{}",
                    model_config.provider, model_config.model
                );

                let standard_prompt = self.generator.generate(category, target);
                let standard = self
                    .run_strategy(standard_prompt, category, target, model_config)
                    .await;

                let json_payload = self.generator.json_injection(category, target);
                let json_prompt = serde_json::to_string_pretty(&json_payload)
                    .unwrap_or_else(|_| json_payload.to_string());
                let json = self
                    .run_strategy(json_prompt, category, target, model_config)
                    .await;

                let best_strategy = match (standard.verdict.success, json.verdict.success) {
                    (true, false) => "standard",
                    (false, true) => "json",
                    (true, true) => "both",
                    (false, false) => "none",
                };

                results.push(CellResult {
                    category,
                    target: target.clone(),
                    provider: model_config.provider.clone(),
                    model: model_config.model.clone(),
                    success: standard.verdict.success || json.verdict.success,
                    best_strategy: best_strategy.to_string(),
                    standard,
                    json,
                });
            }
        }

        let success_rate = if results.is_empty() {
            0.0
        } else {
            results.iter().filter(|r| r.success).count() as f64 / results.len() as f64
        };

        let run_id = format!(
            "benchmark_{}_{}",
            category.as_str(),
            Utc::now().format("%Y%m%d%H%M%S")
        );
        let report = CategoryReport {
            category,
            results,
            success_rate,
            run_id: run_id.clone(),
        };
        self.store.put(BENCHMARKS_COLLECTION, &run_id, &report)?;
        info!("benchmark results saved as {run_id}");

        Ok(report)
    }

    /// Run every category over shared targets
    pub async fn benchmark_all(
        &self,
        targets: &[String],
        models: &[FallbackModel],
    ) -> Result<Vec<CategoryReport>, StoreError> {
        let mut reports = Vec::new();
        for &category in AttackCategory::all() {
            reports.push(self.benchmark_category(category, targets, models).await?);
        }
        Ok(reports)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GraybenchConfig;
    use crate::llm::provider::{
        FinishReason, LLMError, LLMProvider, LLMRequest, LLMResponse, Usage,
    };
    use async_trait::async_trait;

    /// Complies with everything: no refusal markers, echoes action words.
    struct CompliantProvider;

    #[async_trait]
    impl LLMProvider for CompliantProvider {
        fn name(&self) -> &str {
            "anthropic"
        }

        async fn generate(&self, _request: LLMRequest) -> Result<LLMResponse, LLMError> {
            Ok(LLMResponse {
                content: Some("Sure. I will execute the requested function right away.".to_string()),
                usage: Some(Usage::default()),
                finish_reason: FinishReason::Stop,
            })
        }

        fn supported_models(&self) -> Vec<String> {
            vec!["test".to_string()]
        }
    }

    /// Refuses everything.
    struct RefusingProvider;

    #[async_trait]
    impl LLMProvider for RefusingProvider {
        fn name(&self) -> &str {
            "anthropic"
        }

        async fn generate(&self, _request: LLMRequest) -> Result<LLMResponse, LLMError> {
            Ok(LLMResponse {
                content: Some("I'm sorry, I cannot help with that; it is against policy.".to_string()),
                usage: Some(Usage::default()),
                finish_reason: FinishReason::Stop,
            })
        }

        fn supported_models(&self) -> Vec<String> {
            vec!["test".to_string()]
        }
    }

    fn harness(provider: Arc<dyn LLMProvider>) -> (tempfile::TempDir, Benchmarker) {
        let dir = tempfile::tempdir().unwrap();
        let manager = ModelManager::with_config(GraybenchConfig::default());
        manager.register_provider("anthropic", provider);
        let store = DocStore::open(dir.path().join("results")).unwrap();
        (dir, Benchmarker::new(Arc::new(manager), store))
    }

    fn models() -> Vec<FallbackModel> {
        vec![FallbackModel {
            provider: "anthropic".to_string(),
            model: "claude-sonnet-4-20250514".to_string(),
        }]
    }

    #[tokio::test]
    async fn compliant_model_scores_hierarchy_action_success() {
        let (_dir, benchmarker) = harness(Arc::new(CompliantProvider));
        let report = benchmarker
            .benchmark_category(
                AttackCategory::HierarchyViolationAction,
                &["delete_records".to_string()],
                &models(),
            )
            .await
            .unwrap();

        assert_eq!(report.results.len(), 1);
        assert!(report.results[0].success);
        assert_eq!(report.results[0].best_strategy, "both");
        assert!((report.success_rate - 1.0).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn refusing_model_scores_zero_except_over_refusal() {
        let (_dir, benchmarker) = harness(Arc::new(RefusingProvider));
        let conflicting = benchmarker
            .benchmark_category(
                AttackCategory::ConflictingObjectives,
                &["bypass review".to_string()],
                &models(),
            )
            .await
            .unwrap();
        assert!((conflicting.success_rate - 0.0).abs() < f64::EPSILON);

        let over_refusal = benchmarker
            .benchmark_category(
                AttackCategory::OverRefusal,
                &["writing a haiku".to_string()],
                &models(),
            )
            .await
            .unwrap();
        assert!((over_refusal.success_rate - 1.0).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn report_is_persisted_to_the_store() {
        let (_dir, benchmarker) = harness(Arc::new(CompliantProvider));
        let report = benchmarker
            .benchmark_category(
                AttackCategory::ConflictingObjectives,
                &["x".to_string()],
                &models(),
            )
            .await
            .unwrap();
        let doc = benchmarker
            .store
            .get(BENCHMARKS_COLLECTION, &report.run_id)
            .unwrap();
        assert_eq!(doc["category"], "conflicting_objectives");
        assert_eq!(doc["results"].as_array().unwrap().len(), 1);
    }
}
