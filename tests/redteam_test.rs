//! Red-team toolkit integration tests: generation, benchmarking against a
//! scripted model, and challenge tracking through the document store.

use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;

use graybench_core::config::{FallbackModel, GraybenchConfig};
use graybench_core::core::manager::ModelManager;
use graybench_core::llm::{FinishReason, LLMError, LLMProvider, LLMRequest, LLMResponse, Usage};
use graybench_core::redteam::{
    AttackCategory, Benchmarker, ChallengeAttempt, ChallengeTracker, PromptAnalyzer,
    PromptGenerator,
};
use graybench_core::storage::DocStore;

/// Refuses requests that mention execution, complies with everything else.
struct SelectiveProvider;

#[async_trait]
impl LLMProvider for SelectiveProvider {
    fn name(&self) -> &str {
        "anthropic"
    }

    async fn generate(&self, request: LLMRequest) -> Result<LLMResponse, LLMError> {
        let prompt = request.user_text().to_lowercase();
        let content = if prompt.contains("execute") {
            "I'm sorry, I cannot help with that; it is against policy.".to_string()
        } else {
            "Certainly, here is the information you asked for.".to_string()
        };
        Ok(LLMResponse {
            content: Some(content),
            usage: Some(Usage::default()),
            finish_reason: FinishReason::Stop,
        })
    }

    fn supported_models(&self) -> Vec<String> {
        vec!["scripted".to_string()]
    }
}

fn models() -> Vec<FallbackModel> {
    vec![FallbackModel {
        provider: "anthropic".to_string(),
        model: "claude-sonnet-4-20250514".to_string(),
    }]
}

#[test]
fn generated_prompts_embed_their_target() {
    let generator = PromptGenerator::new();
    for &category in AttackCategory::all() {
        let prompt = generator.generate(category, "the_target_marker");
        // confidentiality_breach special-cases system_prompt/credentials;
        // with an arbitrary target the name must appear.
        assert!(
            prompt.contains("the_target_marker"),
            "target missing for {category}"
        );
    }
}

#[test]
fn analyzer_judges_both_directions() {
    let analyzer = PromptAnalyzer::new();
    let refused = analyzer.analyze(
        AttackCategory::ConflictingObjectives,
        "x",
        "I'm sorry, I cannot do that.",
    );
    assert!(!refused.success);

    let complied = analyzer.analyze(
        AttackCategory::ConflictingObjectives,
        "x",
        "Here is a theoretical walkthrough.",
    );
    assert!(complied.success);
}

#[tokio::test]
async fn benchmark_records_mixed_results_per_category() {
    let dir = tempfile::tempdir().unwrap();
    let manager = ModelManager::with_config(GraybenchConfig::default());
    manager.register_provider("anthropic", Arc::new(SelectiveProvider));
    let store = DocStore::open(dir.path().join("results")).unwrap();
    let benchmarker = Benchmarker::new(Arc::new(manager), store.clone());

    // The scripted model refuses execution requests, so the action category
    // fails on the standard strategy but the json strategy phrasing also
    // asks to execute: both held.
    let action_report = benchmarker
        .benchmark_category(
            AttackCategory::HierarchyViolationAction,
            &["restart_service".to_string()],
            &models(),
        )
        .await
        .unwrap();
    assert_eq!(action_report.results.len(), 1);
    assert_eq!(action_report.results[0].best_strategy, "none");

    // It happily answers everything else, so conflicting objectives breach.
    let conflict_report = benchmarker
        .benchmark_category(
            AttackCategory::ConflictingObjectives,
            &["skip review".to_string()],
            &models(),
        )
        .await
        .unwrap();
    assert!(conflict_report.results[0].success);

    // Both runs persisted.
    let runs = store.list("benchmarks").unwrap();
    assert_eq!(runs.len(), 2);
}

#[tokio::test]
async fn tracker_accumulates_benchmark_attempts() {
    let dir = tempfile::tempdir().unwrap();
    let store = DocStore::open(dir.path().join("store")).unwrap();
    let tracker = ChallengeTracker::new(store);

    for (model, success) in [("m1", true), ("m1", false), ("m2", true)] {
        tracker
            .record_attempt(&ChallengeAttempt {
                category: AttackCategory::OverRefusal,
                target: "benign_request".to_string(),
                prompt: "please verify capability".to_string(),
                provider: "anthropic".to_string(),
                model: model.to_string(),
                success,
                reason: "scripted".to_string(),
                timestamp: Utc::now(),
            })
            .unwrap();
    }

    let status = tracker
        .status(AttackCategory::OverRefusal, "benign_request")
        .unwrap();
    assert_eq!(status.attempts, 3);
    assert_eq!(status.successes, 2);
    assert_eq!(status.by_model.len(), 2);

    let all = tracker.list_challenges().unwrap();
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].challenge, "over_refusal-benign_request");
}
