//! Knowledge agent: recommendations and progress summaries

use super::{Agent, AgentContext};

pub const KNOWLEDGE: &str = "knowledge";

pub struct KnowledgeAgent;

impl Agent for KnowledgeAgent {
    fn name(&self) -> &str {
        KNOWLEDGE
    }

    fn system_prompt(&self, ctx: &AgentContext) -> String {
        format!(
            "You track a learner's knowledge across the domains {}. Given their \
             question, recommend the two or three most valuable next topics with a \
             short justification each, matched to a {} learning style.",
            ctx.domains.join(", "),
            ctx.learning_style
        )
    }
}
