//! Per-domain expert agent

use super::{Agent, AgentContext};

pub fn expert_name(domain: &str) -> String {
    format!("domain_expert_{domain}")
}

pub struct DomainExpertAgent {
    domain: String,
    name: String,
}

impl DomainExpertAgent {
    pub fn new(domain: impl Into<String>) -> Self {
        let domain = domain.into();
        let name = expert_name(&domain);
        Self { domain, name }
    }

    pub fn domain(&self) -> &str {
        &self.domain
    }
}

impl Agent for DomainExpertAgent {
    fn name(&self) -> &str {
        &self.name
    }

    fn system_prompt(&self, ctx: &AgentContext) -> String {
        let focus = ctx
            .topic_matches
            .first()
            .map(|m| format!(" The learner's question maps to the topic '{}'.", m.path))
            .unwrap_or_default();
        format!(
            "You are a subject-matter expert in {}.{focus} Give a precise, technically \
             grounded answer, define terms the first time you use them, and prefer \
             concrete examples over generalities.",
            self.domain
        )
    }
}
