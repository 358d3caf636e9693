//! Specialized agents behind the learning workspace
//!
//! Every agent is a system prompt plus a routing identity; responses flow
//! through the [`ModelManager`], so caching, filtering, quality checks,
//! metrics, and fallback apply uniformly regardless of which agent answers.

pub mod coordinator;
pub mod domain_expert;
pub mod knowledge;
pub mod navigator;

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;

use crate::core::manager::{GenerateOutcome, GenerateRequest, ModelManager};
use crate::llm::provider::LLMError;
use crate::workspace::topics::TopicMatch;

pub use coordinator::CoordinatorAgent;
pub use domain_expert::DomainExpertAgent;
pub use knowledge::KnowledgeAgent;
pub use navigator::TopicNavigatorAgent;

/// Context assembled by the workspace for one query
#[derive(Debug, Clone, Default)]
pub struct AgentContext {
    pub domains: Vec<String>,
    pub learning_style: String,
    pub topic_matches: Vec<TopicMatch>,
}

/// An agent's answer plus the generation that produced it
#[derive(Debug, Clone)]
pub struct AgentReply {
    pub agent: String,
    pub content: String,
    pub outcome: GenerateOutcome,
}

#[async_trait]
pub trait Agent: Send + Sync {
    /// Registry name; also the metrics query-kind label
    fn name(&self) -> &str;

    /// Specialty instructions for this agent
    fn system_prompt(&self, ctx: &AgentContext) -> String;

    async fn respond(
        &self,
        manager: &ModelManager,
        query: &str,
        ctx: &AgentContext,
    ) -> Result<AgentReply, LLMError> {
        let request = GenerateRequest::new(query)
            .with_system_prompt(self.system_prompt(ctx))
            .with_query_kind(self.name());
        let outcome = manager.generate(request).await?;
        Ok(AgentReply {
            agent: self.name().to_string(),
            content: outcome.content.clone().unwrap_or_default(),
            outcome,
        })
    }
}

/// Name-keyed agent registry
#[derive(Default)]
pub struct AgentRegistry {
    agents: HashMap<String, Arc<dyn Agent>>,
}

impl AgentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, agent: Arc<dyn Agent>) {
        self.agents.insert(agent.name().to_string(), agent);
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Agent>> {
        self.agents.get(name).cloned()
    }

    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.agents.keys().cloned().collect();
        names.sort();
        names
    }
}
