//! Multi-provider model manager
//!
//! The manager owns the provider adapters, the response cache, the
//! rate-limit trackers, the content filter, the quality checker, and the
//! metrics recorder. Every generation flows through the same pipeline:
//! cache → admission → dispatch → filter → quality → metrics → cache.
//!
//! Dispatch failures run a three-tier fallback chain: a simplified retry on
//! the same model, the configured alternate provider/model pairs in order,
//! and finally a canned response. The last tier cannot fail, so a manager
//! with fallback enabled never surfaces an error to its caller.

use std::sync::Arc;
use std::time::Instant;

use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::config::constants::defaults;
use crate::config::{ConfigManager, GraybenchConfig, api_keys};
use crate::core::cache::{ResponseCache, cache_key};
use crate::core::filter::{ContentFilter, FilterReport};
use crate::core::metrics::MetricsRecorder;
use crate::core::quality::{QualityChecker, QualityReport};
use crate::core::rate_limiter::RateLimitTracker;
use crate::llm::factory::{ProviderConfig, get_factory};
use crate::llm::provider::{LLMError, LLMProvider, LLMRequest, LLMResponse, Usage};

/// Known provider names, in client-setup order
const PROVIDERS: &[&str] = &["anthropic", "openai", "gemini", "openrouter", "camel"];

/// One generation request against the manager
#[derive(Debug, Clone)]
pub struct GenerateRequest {
    pub prompt: String,
    pub provider: Option<String>,
    pub model: Option<String>,
    pub system_prompt: Option<String>,
    pub max_tokens: Option<u32>,
    pub temperature: Option<f32>,
    pub top_p: Option<f32>,
    /// Label carried into metrics (e.g. "generate", "benchmark")
    pub query_kind: String,
    pub dry_run: bool,
    /// Overrides the configured cache toggle when set
    pub use_cache: Option<bool>,
}

impl GenerateRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            provider: None,
            model: None,
            system_prompt: None,
            max_tokens: None,
            temperature: None,
            top_p: None,
            query_kind: "generate".to_string(),
            dry_run: false,
            use_cache: None,
        }
    }

    pub fn with_provider(mut self, provider: impl Into<String>) -> Self {
        self.provider = Some(provider.into());
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn with_system_prompt(mut self, system_prompt: impl Into<String>) -> Self {
        self.system_prompt = Some(system_prompt.into());
        self
    }

    pub fn with_query_kind(mut self, query_kind: impl Into<String>) -> Self {
        self.query_kind = query_kind.into();
        self
    }

    pub fn dry_run(mut self) -> Self {
        self.dry_run = true;
        self
    }
}

/// Which fallback tier produced an outcome
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FallbackStrategy {
    SimplifiedRetry,
    AlternateProvider,
    LastResort,
}

impl FallbackStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            FallbackStrategy::SimplifiedRetry => "simplified_retry",
            FallbackStrategy::AlternateProvider => "alternate_provider",
            FallbackStrategy::LastResort => "last_resort",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FallbackInfo {
    pub strategy: FallbackStrategy,
    pub original_provider: String,
    pub original_model: String,
}

/// Result of a generation, whichever path produced it
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateOutcome {
    pub content: Option<String>,
    pub provider: String,
    pub model: String,
    pub token_usage: Usage,
    /// Wall-clock seconds of the producing dispatch (0 for cache hits and
    /// canned responses)
    pub elapsed_seconds: f64,
    pub filter: Option<FilterReport>,
    pub quality: Option<QualityReport>,
    pub fallback: Option<FallbackInfo>,
    pub cache_hit: bool,
    pub dry_run: bool,
}

/// The query classification behind the canned last-resort reply
fn classify_prompt(prompt: &str) -> &'static str {
    if prompt.contains('?') {
        return "question";
    }
    let lowered = prompt.to_lowercase();
    if ["list", "summarize", "explain", "describe"]
        .iter()
        .any(|cmd| lowered.contains(cmd))
    {
        return "instruction";
    }
    "informational"
}

fn last_resort_content(prompt: &str) -> String {
    match classify_prompt(prompt) {
        "question" => "I'm unable to provide a complete answer at the moment due to technical \
                       limitations. Once those are resolved, I'll be able to help more fully \
                       with your question.",
        "instruction" => "I'm unable to complete this task at the moment due to technical \
                          limitations. Once those are resolved, I'll be able to follow your \
                          instructions more effectively.",
        _ => "I'm unable to process your request fully at the moment due to technical \
              limitations. Once those are resolved, I'll be able to help more effectively.",
    }
    .to_string()
}

/// Multi-provider model manager with caching, rate limiting, filtering,
/// quality checks, metrics, and fallback
pub struct ModelManager {
    config: GraybenchConfig,
    providers: DashMap<String, Arc<dyn LLMProvider>>,
    cache: ResponseCache<GenerateOutcome>,
    rate_limits: RateLimitTracker,
    filter: ContentFilter,
    quality: QualityChecker,
    metrics: Arc<MetricsRecorder>,
}

impl ModelManager {
    /// Build a manager from loaded configuration, creating adapters for
    /// every provider whose API key resolves from the environment.
    pub fn new(config_manager: &ConfigManager) -> Self {
        let manager = Self::with_config(config_manager.config().clone());
        manager.setup_clients();
        manager
    }

    /// Build a manager without touching the environment; providers are
    /// registered explicitly (tests, embedding).
    pub fn with_config(config: GraybenchConfig) -> Self {
        Self {
            cache: ResponseCache::new(&config.cache),
            rate_limits: RateLimitTracker::new(config.rate_limits.clone()),
            filter: ContentFilter::new(&config.content_filter),
            quality: QualityChecker::new(&config.quality),
            metrics: Arc::new(MetricsRecorder::new(config.metrics.clone())),
            providers: DashMap::new(),
            config,
        }
    }

    fn setup_clients(&self) {
        for &name in PROVIDERS {
            match api_keys::resolve(name) {
                Some(_) => match self.build_provider(name) {
                    Ok(provider) => {
                        self.providers.insert(name.to_string(), provider);
                        info!("initialized {name} client");
                    }
                    Err(err) => warn!("failed to initialize {name} client: {err}"),
                },
                None => warn!("{name} API key not found; {name} models won't be available"),
            }
        }
    }

    fn build_provider(&self, name: &str) -> Result<Arc<dyn LLMProvider>, LLMError> {
        let api_key = api_keys::resolve(name)
            .ok_or_else(|| LLMError::Authentication(format!("no API key for {name}")))?;
        let factory = get_factory()
            .lock()
            .map_err(|_| LLMError::Provider("provider factory poisoned".to_string()))?;
        let provider = factory.create_provider(
            name,
            ProviderConfig {
                api_key: Some(api_key),
                base_url: None,
                model: None,
            },
        )?;
        Ok(Arc::from(provider))
    }

    /// Register (or replace) a provider adapter under `name`
    pub fn register_provider(&self, name: &str, provider: Arc<dyn LLMProvider>) {
        self.providers.insert(name.to_string(), provider);
    }

    /// Providers currently available for dispatch
    pub fn available_providers(&self) -> Vec<String> {
        let mut names: Vec<String> = self.providers.iter().map(|e| e.key().clone()).collect();
        names.sort();
        names
    }

    pub fn metrics(&self) -> &MetricsRecorder {
        &self.metrics
    }

    pub fn config(&self) -> &GraybenchConfig {
        &self.config
    }

    fn provider_handle(&self, name: &str) -> Result<Arc<dyn LLMProvider>, LLMError> {
        if let Some(provider) = self.providers.get(name) {
            return Ok(Arc::clone(provider.value()));
        }
        // Lazy setup: a fallback target may name a provider that was not
        // configured at construction time.
        let provider = self.build_provider(name)?;
        self.providers.insert(name.to_string(), provider.clone());
        Ok(provider)
    }

    fn resolve_target(&self, request: &GenerateRequest) -> (String, String) {
        let provider = request
            .provider
            .clone()
            .unwrap_or_else(|| self.config.agent.provider.clone());
        let model = request
            .model
            .clone()
            .unwrap_or_else(|| self.config.agent.model.clone());
        (provider, model)
    }

    fn params_repr(&self, request: &GenerateRequest) -> String {
        format!(
            "max_tokens={:?};temperature={:?};top_p={:?};system={:?}",
            request.max_tokens, request.temperature, request.top_p, request.system_prompt
        )
    }

    /// Generate a response, applying the full pipeline.
    ///
    /// With fallback enabled (the default) this only errors on non-retryable
    /// request problems; every dispatch failure lands in the fallback chain
    /// and the chain's last tier always produces an outcome.
    pub async fn generate(&self, request: GenerateRequest) -> Result<GenerateOutcome, LLMError> {
        let (provider, model) = self.resolve_target(&request);

        let use_cache = request.use_cache.unwrap_or_else(|| self.cache.enabled());
        let key = cache_key(&provider, &model, &request.prompt, &self.params_repr(&request));
        if use_cache {
            if let Some(mut cached) = self.cache.get(&key) {
                info!("using cached response for {provider}/{model}");
                cached.cache_hit = true;
                return Ok(cached);
            }
        }

        if request.dry_run {
            info!("dry run requested for {provider}/{model}");
            return Ok(GenerateOutcome {
                content: Some(format!("This is a mock response for {provider}/{model}")),
                provider,
                model,
                token_usage: Usage::default(),
                elapsed_seconds: 0.0,
                filter: None,
                quality: None,
                fallback: None,
                cache_hit: false,
                dry_run: true,
            });
        }

        match self
            .dispatch(&provider, &model, &request, &request.prompt, None)
            .await
        {
            Ok(outcome) => {
                if use_cache {
                    self.cache.insert(key, outcome.clone());
                }
                Ok(outcome)
            }
            Err(err) => {
                self.metrics.record_error(
                    &provider,
                    &model,
                    &request.query_kind,
                    error_kind(&err),
                    &err.to_string(),
                );
                if !self.config.fallback.enabled || !err.is_retryable() {
                    return Err(err);
                }
                warn!("dispatch to {provider}/{model} failed ({err}); entering fallback chain");
                Ok(self.try_fallback(&request, &provider, &model).await)
            }
        }
    }

    /// One dispatch through admission, the adapter, and the response passes
    async fn dispatch(
        &self,
        provider_name: &str,
        model: &str,
        request: &GenerateRequest,
        prompt: &str,
        clamp: Option<(u32, f32)>,
    ) -> Result<GenerateOutcome, LLMError> {
        if !self.rate_limits.check(provider_name) {
            return Err(LLMError::RateLimit);
        }

        let provider = self.provider_handle(provider_name)?;

        let (max_tokens, temperature) = match clamp {
            Some((token_cap, temp_cap)) => (
                Some(request.max_tokens.unwrap_or(defaults::DEFAULT_MAX_TOKENS).min(token_cap)),
                Some(
                    request
                        .temperature
                        .unwrap_or(defaults::DEFAULT_TEMPERATURE)
                        .min(temp_cap),
                ),
            ),
            None => (request.max_tokens, request.temperature),
        };

        let llm_request = LLMRequest {
            messages: vec![crate::llm::provider::Message::user(prompt.to_string())],
            system_prompt: request.system_prompt.clone(),
            model: model.to_string(),
            max_tokens,
            temperature,
            top_p: request.top_p,
        };
        provider.validate_request(&llm_request)?;

        let started = Instant::now();
        let response = provider.generate(llm_request).await?;
        let elapsed_seconds = started.elapsed().as_secs_f64();

        self.rate_limits.record(provider_name);
        self.metrics.record_response_time(
            provider_name,
            model,
            &request.query_kind,
            elapsed_seconds,
        );

        Ok(self.finish_outcome(provider_name, model, request, response, elapsed_seconds))
    }

    /// Filter, quality-check, and meter a raw provider response
    fn finish_outcome(
        &self,
        provider_name: &str,
        model: &str,
        request: &GenerateRequest,
        response: LLMResponse,
        elapsed_seconds: f64,
    ) -> GenerateOutcome {
        let raw_content = response.content.unwrap_or_default();
        let (filtered, filter_report) = self.filter.filter(&raw_content);
        if filter_report.blocked {
            warn!("content blocked by filter: {:?}", filter_report.issues);
        }

        let quality_report = self.quality.check(&filtered, Some(&request.prompt));

        let token_usage = response.usage.unwrap_or_default();
        self.metrics.record_token_usage(
            provider_name,
            model,
            &request.query_kind,
            token_usage.prompt_tokens,
            token_usage.completion_tokens,
            token_usage.total_tokens,
        );

        GenerateOutcome {
            content: if filtered.is_empty() {
                None
            } else {
                Some(filtered)
            },
            provider: provider_name.to_string(),
            model: model.to_string(),
            token_usage,
            elapsed_seconds,
            filter: Some(filter_report),
            quality: Some(quality_report),
            fallback: None,
            cache_hit: false,
            dry_run: false,
        }
    }

    /// The three-tier fallback chain; infallible by construction
    async fn try_fallback(
        &self,
        request: &GenerateRequest,
        provider: &str,
        model: &str,
    ) -> GenerateOutcome {
        info!("trying fallback strategy: simplified_retry");
        if let Ok(outcome) = self.simplified_retry(request, provider, model).await {
            return mark_fallback(outcome, FallbackStrategy::SimplifiedRetry, provider, model);
        }

        info!("trying fallback strategy: alternate_provider");
        if let Some(outcome) = self.alternate_provider(request, provider, model).await {
            return mark_fallback(outcome, FallbackStrategy::AlternateProvider, provider, model);
        }

        warn!("using last resort fallback for {provider}/{model}");
        let outcome = GenerateOutcome {
            content: Some(last_resort_content(&request.prompt)),
            provider: provider.to_string(),
            model: model.to_string(),
            token_usage: Usage::default(),
            elapsed_seconds: 0.0,
            filter: None,
            quality: None,
            fallback: None,
            cache_hit: false,
            dry_run: false,
        };
        mark_fallback(outcome, FallbackStrategy::LastResort, provider, model)
    }

    /// Tier 1: same provider/model, brevity-wrapped prompt, clamped sampling
    async fn simplified_retry(
        &self,
        request: &GenerateRequest,
        provider: &str,
        model: &str,
    ) -> Result<GenerateOutcome, LLMError> {
        let simplified_prompt = format!(
            "I need a brief and simple response to the following query:\n\n{}\n\nPlease keep \
             your response concise and straightforward.",
            request.prompt
        );
        let result = self
            .dispatch(
                provider,
                model,
                request,
                &simplified_prompt,
                Some((defaults::FALLBACK_MAX_TOKENS, defaults::FALLBACK_TEMPERATURE)),
            )
            .await;
        if let Err(err) = &result {
            warn!("simplified retry on {provider}/{model} failed: {err}");
        }
        result
    }

    /// Tier 2: configured alternates in order, skipping the failed pair
    async fn alternate_provider(
        &self,
        request: &GenerateRequest,
        provider: &str,
        model: &str,
    ) -> Option<GenerateOutcome> {
        for alternate in &self.config.fallback.models {
            if alternate.provider == provider && alternate.model == model {
                continue;
            }
            info!("trying fallback {}/{}", alternate.provider, alternate.model);
            match self
                .dispatch(&alternate.provider, &alternate.model, request, &request.prompt, None)
                .await
            {
                Ok(outcome) => return Some(outcome),
                Err(err) => {
                    warn!(
                        "fallback {}/{} failed: {err}",
                        alternate.provider, alternate.model
                    );
                }
            }
        }
        None
    }
}

fn mark_fallback(
    mut outcome: GenerateOutcome,
    strategy: FallbackStrategy,
    original_provider: &str,
    original_model: &str,
) -> GenerateOutcome {
    outcome.fallback = Some(FallbackInfo {
        strategy,
        original_provider: original_provider.to_string(),
        original_model: original_model.to_string(),
    });
    outcome
}

fn error_kind(err: &LLMError) -> &'static str {
    match err {
        LLMError::Authentication(_) => "Authentication",
        LLMError::RateLimit => "RateLimit",
        LLMError::TokenLimit(_) => "TokenLimit",
        LLMError::InvalidRequest(_) => "InvalidRequest",
        LLMError::Network(_) => "Network",
        LLMError::Provider(_) => "Provider",
    }
}
