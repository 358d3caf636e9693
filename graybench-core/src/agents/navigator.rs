//! Topic navigator agent

use super::{Agent, AgentContext};

pub const TOPIC_NAVIGATOR: &str = "topic_navigator";

pub struct TopicNavigatorAgent;

impl Agent for TopicNavigatorAgent {
    fn name(&self) -> &str {
        TOPIC_NAVIGATOR
    }

    fn system_prompt(&self, ctx: &AgentContext) -> String {
        let matched = if ctx.topic_matches.is_empty() {
            String::new()
        } else {
            let paths: Vec<&str> = ctx
                .topic_matches
                .iter()
                .take(3)
                .map(|m| m.path.as_str())
                .collect();
            format!(" Relevant topics in the curriculum: {}.", paths.join(", "))
        };
        format!(
            "You are a curriculum navigator for the domains {}.{matched} Lay out an \
             ordered learning path: list prerequisites first, then the topic sequence, \
             with one sentence per step on why it comes at that point.",
            ctx.domains.join(", ")
        )
    }
}
