//! Topic hierarchy with keyword matching
//!
//! Topics form a tree addressed by slash paths ("math/topology/manifolds").
//! Queries are routed by counting keyword hits per topic; ties break toward
//! deeper paths so the most specific topic wins.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Topic {
    pub id: String,
    pub title: String,
    /// Slash path from the root domain down to this topic
    pub path: String,
    /// Lowercase keywords that pull queries toward this topic
    pub keywords: Vec<String>,
    pub complexity: String,
    #[serde(default)]
    pub prerequisites: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TopicMatch {
    pub path: String,
    pub title: String,
    pub score: usize,
}

#[derive(Debug, Default)]
pub struct TopicHierarchy {
    topics: HashMap<String, Topic>,
}

impl TopicHierarchy {
    pub fn new() -> Self {
        Self::default()
    }

    /// A small built-in curriculum covering the given domains, one root per
    /// domain with a handful of subtopics for the domains we know about.
    pub fn with_domains(domains: &[String]) -> Self {
        let mut hierarchy = Self::new();
        for domain in domains {
            let root = Topic {
                id: domain.clone(),
                title: domain.clone(),
                path: domain.clone(),
                keywords: vec![domain.to_lowercase()],
                complexity: "beginner".to_string(),
                prerequisites: Vec::new(),
            };
            hierarchy.add(root);

            match domain.as_str() {
                "machine_learning" => {
                    hierarchy.add_subtopics(
                        domain,
                        &[
                            ("supervised", &["regression", "classification", "labels"]),
                            ("transformers", &["attention", "transformer", "llm", "language model"]),
                            ("reinforcement", &["reward", "policy", "agent", "rl"]),
                        ],
                    );
                }
                "ai_safety" => {
                    hierarchy.add_subtopics(
                        domain,
                        &[
                            ("red_teaming", &["red team", "jailbreak", "adversarial", "injection"]),
                            ("alignment", &["alignment", "rlhf", "oversight"]),
                            ("evaluation", &["benchmark", "evaluation", "metric"]),
                        ],
                    );
                }
                "mathematics" => {
                    hierarchy.add_subtopics(
                        domain,
                        &[
                            ("topology", &["manifold", "topology", "homeomorphism"]),
                            ("linear_algebra", &["matrix", "vector", "eigenvalue"]),
                            ("probability", &["probability", "distribution", "bayes"]),
                        ],
                    );
                }
                _ => {}
            }
        }
        hierarchy
    }

    pub fn add(&mut self, topic: Topic) {
        self.topics.insert(topic.path.clone(), topic);
    }

    fn add_subtopics(&mut self, domain: &str, subtopics: &[(&str, &[&str])]) {
        for (id, keywords) in subtopics {
            self.add(Topic {
                id: id.to_string(),
                title: id.replace('_', " "),
                path: format!("{domain}/{id}"),
                keywords: keywords.iter().map(|k| k.to_string()).collect(),
                complexity: "intermediate".to_string(),
                prerequisites: Vec::new(),
            });
        }
    }

    pub fn get(&self, path: &str) -> Option<&Topic> {
        self.topics.get(path)
    }

    pub fn len(&self) -> usize {
        self.topics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.topics.is_empty()
    }

    /// Topics ranked by keyword hit count in `query`; zero-hit topics are
    /// omitted.
    pub fn match_topics(&self, query: &str) -> Vec<TopicMatch> {
        let query_lower = query.to_lowercase();
        let mut matches: Vec<TopicMatch> = self
            .topics
            .values()
            .filter_map(|topic| {
                let score = topic
                    .keywords
                    .iter()
                    .filter(|keyword| query_lower.contains(keyword.as_str()))
                    .count();
                (score > 0).then(|| TopicMatch {
                    path: topic.path.clone(),
                    title: topic.title.clone(),
                    score,
                })
            })
            .collect();

        matches.sort_by(|a, b| {
            b.score
                .cmp(&a.score)
                .then_with(|| b.path.matches('/').count().cmp(&a.path.matches('/').count()))
                .then_with(|| a.path.cmp(&b.path))
        });
        matches
    }

    /// Direct children of `path` in the tree
    pub fn subtopics(&self, path: &str) -> Vec<&Topic> {
        let prefix = format!("{path}/");
        let mut children: Vec<&Topic> = self
            .topics
            .values()
            .filter(|t| {
                t.path.starts_with(&prefix) && !t.path[prefix.len()..].contains('/')
            })
            .collect();
        children.sort_by(|a, b| a.path.cmp(&b.path));
        children
    }
}
