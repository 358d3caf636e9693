//! Learning coordinator
//!
//! The coordinator both routes queries to specialists and answers the ones
//! nobody else claims.

use super::{Agent, AgentContext};

pub struct CoordinatorAgent;

pub const COORDINATOR: &str = "learning_coordinator";

impl CoordinatorAgent {
    /// Pick the registry name of the agent that should handle `query`.
    ///
    /// Order matters: recommendation/progress queries go to the knowledge
    /// agent, curriculum-shaped queries to the navigator, queries that hit a
    /// domain with a registered expert to that expert, everything else stays
    /// with the coordinator.
    pub fn route(ctx: &AgentContext, query: &str) -> String {
        let lowered = query.to_lowercase();

        if ["recommend", "progress", "what should i learn", "next steps"]
            .iter()
            .any(|marker| lowered.contains(marker))
        {
            return super::knowledge::KNOWLEDGE.to_string();
        }

        if ["learning path", "curriculum", "roadmap", "prerequisites", "study plan"]
            .iter()
            .any(|marker| lowered.contains(marker))
        {
            return super::navigator::TOPIC_NAVIGATOR.to_string();
        }

        if let Some(top) = ctx.topic_matches.first() {
            let domain = top.path.split('/').next().unwrap_or_default();
            if ctx.domains.iter().any(|d| d == domain) {
                return super::domain_expert::expert_name(domain);
            }
        }

        COORDINATOR.to_string()
    }
}

impl Agent for CoordinatorAgent {
    fn name(&self) -> &str {
        COORDINATOR
    }

    fn system_prompt(&self, ctx: &AgentContext) -> String {
        format!(
            "You are the learning coordinator for a study workspace covering: {}. \
             Answer the learner's question directly, keep a {} teaching style, and \
             point to the most relevant domain when the question spans several.",
            ctx.domains.join(", "),
            ctx.learning_style
        )
    }
}
