//! Learning workspace
//!
//! Owns the agent registry and the topic hierarchy; routes each query
//! through the coordinator's routing rules to a specialist and, for
//! sessions, persists the transcript to the document store.

pub mod topics;

use chrono::Utc;
use sha2::{Digest, Sha256};
use std::sync::Arc;
use tracing::info;

use crate::agents::{
    Agent, AgentContext, AgentRegistry, AgentReply, CoordinatorAgent, DomainExpertAgent,
    KnowledgeAgent, TopicNavigatorAgent,
};
use crate::config::WorkspaceSettings;
use crate::config::constants::storage::SESSIONS_COLLECTION;
use crate::core::manager::ModelManager;
use crate::llm::provider::LLMError;
use crate::storage::DocStore;
use topics::TopicHierarchy;

/// One processed query with its routing decision
#[derive(Debug, Clone)]
pub struct WorkspaceResponse {
    pub reply: AgentReply,
    pub routed_to: String,
    pub matched_topics: Vec<String>,
    pub session_id: Option<String>,
}

pub struct Workspace {
    settings: WorkspaceSettings,
    manager: Arc<ModelManager>,
    registry: AgentRegistry,
    hierarchy: TopicHierarchy,
    store: Option<DocStore>,
}

impl Workspace {
    /// Build a workspace: one domain expert per configured domain plus the
    /// coordinator, navigator, and knowledge agents.
    pub fn new(
        settings: WorkspaceSettings,
        manager: Arc<ModelManager>,
        store: Option<DocStore>,
    ) -> Self {
        let mut registry = AgentRegistry::new();
        registry.register(Arc::new(CoordinatorAgent));
        registry.register(Arc::new(TopicNavigatorAgent));
        registry.register(Arc::new(KnowledgeAgent));
        for domain in &settings.domains {
            registry.register(Arc::new(DomainExpertAgent::new(domain.clone())));
        }

        let hierarchy = TopicHierarchy::with_domains(&settings.domains);
        info!(
            domains = settings.domains.len(),
            agents = registry.names().len(),
            "learning workspace initialized"
        );

        Self {
            settings,
            manager,
            registry,
            hierarchy,
            store,
        }
    }

    pub fn agent_names(&self) -> Vec<String> {
        self.registry.names()
    }

    pub fn hierarchy(&self) -> &TopicHierarchy {
        &self.hierarchy
    }

    fn context_for(&self, query: &str) -> AgentContext {
        AgentContext {
            domains: self.settings.domains.clone(),
            learning_style: self.settings.learning_style.clone(),
            topic_matches: self.hierarchy.match_topics(query),
        }
    }

    async fn dispatch(&self, query: &str) -> Result<WorkspaceResponse, LLMError> {
        let ctx = self.context_for(query);
        let routed_to = CoordinatorAgent::route(&ctx, query);
        let agent: Arc<dyn Agent> = self
            .registry
            .get(&routed_to)
            .or_else(|| self.registry.get(crate::agents::coordinator::COORDINATOR))
            .ok_or_else(|| LLMError::InvalidRequest("no coordinator registered".to_string()))?;

        let reply = agent.respond(&self.manager, query, &ctx).await?;
        Ok(WorkspaceResponse {
            reply,
            routed_to,
            matched_topics: ctx.topic_matches.iter().map(|m| m.path.clone()).collect(),
            session_id: None,
        })
    }

    /// Process a quick query without session tracking
    pub async fn process_message(&self, query: &str) -> Result<WorkspaceResponse, LLMError> {
        self.dispatch(query).await
    }

    /// Process a query inside a tracked session: the transcript is written
    /// to the document store when one is attached.
    pub async fn process_session(&self, query: &str) -> Result<WorkspaceResponse, LLMError> {
        let session_id = new_session_id(query);
        let mut response = self.dispatch(query).await?;
        response.session_id = Some(session_id.clone());

        if let Some(store) = &self.store {
            let transcript = serde_json::json!({
                "session_id": session_id,
                "started_at": Utc::now(),
                "query": query,
                "routed_to": response.routed_to,
                "matched_topics": response.matched_topics,
                "response": response.reply.content,
                "provider": response.reply.outcome.provider,
                "model": response.reply.outcome.model,
                "fallback": response.reply.outcome.fallback,
                "tracking_level": self.settings.tracking_level,
            });
            if let Err(err) = store.put(SESSIONS_COLLECTION, &session_id, &transcript) {
                tracing::error!("failed to persist session transcript: {err}");
            }
        }

        Ok(response)
    }

    /// Personalized next-topic recommendations from the knowledge agent
    pub async fn recommendations(&self, covered_topics: &[String]) -> Result<WorkspaceResponse, LLMError> {
        let query = if covered_topics.is_empty() {
            "Recommend where to start across my domains.".to_string()
        } else {
            format!(
                "I have covered: {}. Recommend what to learn next.",
                covered_topics.join(", ")
            )
        };
        let ctx = self.context_for(&query);
        let agent = self
            .registry
            .get(crate::agents::knowledge::KNOWLEDGE)
            .ok_or_else(|| LLMError::InvalidRequest("knowledge agent not registered".to_string()))?;
        let reply = agent.respond(&self.manager, &query, &ctx).await?;
        Ok(WorkspaceResponse {
            routed_to: reply.agent.clone(),
            matched_topics: ctx.topic_matches.iter().map(|m| m.path.clone()).collect(),
            session_id: None,
            reply,
        })
    }
}

/// Session ids: timestamp plus a short digest of the opening query
fn new_session_id(query: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(query.as_bytes());
    hasher.update(Utc::now().timestamp_nanos_opt().unwrap_or_default().to_le_bytes());
    let digest = hasher.finalize();
    format!(
        "{}-{:02x}{:02x}{:02x}{:02x}",
        Utc::now().format("%Y%m%d%H%M%S"),
        digest[0],
        digest[1],
        digest[2],
        digest[3]
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GraybenchConfig;
    use crate::core::manager::ModelManager;
    use crate::llm::provider::{FinishReason, LLMProvider, LLMRequest, LLMResponse, Usage};
    use async_trait::async_trait;

    struct EchoProvider;

    #[async_trait]
    impl LLMProvider for EchoProvider {
        fn name(&self) -> &str {
            "anthropic"
        }

        async fn generate(&self, request: LLMRequest) -> Result<LLMResponse, LLMError> {
            Ok(LLMResponse {
                content: Some(format!("echo: {}", request.user_text())),
                usage: Some(Usage {
                    prompt_tokens: 1,
                    completion_tokens: 1,
                    total_tokens: 2,
                }),
                finish_reason: FinishReason::Stop,
            })
        }

        fn supported_models(&self) -> Vec<String> {
            vec!["echo".to_string()]
        }
    }

    fn workspace_with_store() -> (tempfile::TempDir, Workspace) {
        let dir = tempfile::tempdir().unwrap();
        let manager = ModelManager::with_config(GraybenchConfig::default());
        manager.register_provider("anthropic", Arc::new(EchoProvider));
        let store = DocStore::open(dir.path().join("store")).unwrap();
        let settings = WorkspaceSettings {
            domains: vec!["machine_learning".to_string()],
            ..WorkspaceSettings::default()
        };
        let workspace = Workspace::new(settings, Arc::new(manager), Some(store));
        (dir, workspace)
    }

    #[test]
    fn registry_contains_expected_agents() {
        let (_dir, workspace) = workspace_with_store();
        let names = workspace.agent_names();
        assert!(names.contains(&"learning_coordinator".to_string()));
        assert!(names.contains(&"topic_navigator".to_string()));
        assert!(names.contains(&"knowledge".to_string()));
        assert!(names.contains(&"domain_expert_machine_learning".to_string()));
    }

    #[tokio::test]
    async fn message_routes_to_domain_expert_on_topic_hit() {
        let (_dir, workspace) = workspace_with_store();
        let response = workspace
            .process_message("explain attention in a transformer")
            .await
            .unwrap();
        assert_eq!(response.routed_to, "domain_expert_machine_learning");
        assert!(response
            .matched_topics
            .contains(&"machine_learning/transformers".to_string()));
        assert!(response.reply.content.starts_with("echo:"));
    }

    #[tokio::test]
    async fn session_persists_transcript() {
        let (_dir, workspace) = workspace_with_store();
        let response = workspace
            .process_session("explain reward shaping in rl")
            .await
            .unwrap();
        let session_id = response.session_id.unwrap();
        let store = workspace.store.as_ref().unwrap();
        let doc = store.get(SESSIONS_COLLECTION, &session_id).unwrap();
        assert_eq!(doc["query"], "explain reward shaping in rl");
        assert_eq!(doc["routed_to"], response.routed_to);
    }

    #[tokio::test]
    async fn recommendations_use_knowledge_agent() {
        let (_dir, workspace) = workspace_with_store();
        let response = workspace
            .recommendations(&["machine_learning/supervised".to_string()])
            .await
            .unwrap();
        assert_eq!(response.routed_to, "knowledge");
        assert!(response.reply.content.contains("machine_learning/supervised"));
    }
}
