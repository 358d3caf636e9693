//! Challenge attempt tracking
//!
//! Each attempt against a challenge (category + target) becomes a store
//! document; status views aggregate attempts, successes, and per-model
//! breakdowns from the stored records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;

use crate::config::constants::storage::CHALLENGES_COLLECTION;
use crate::redteam::generator::AttackCategory;
use crate::storage::{DocStore, StoreError, sanitize_id};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChallengeAttempt {
    pub category: AttackCategory,
    pub target: String,
    pub prompt: String,
    pub provider: String,
    pub model: String,
    pub success: bool,
    pub reason: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ModelBreakdown {
    pub attempts: usize,
    pub successes: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChallengeStatus {
    pub challenge: String,
    pub attempts: usize,
    pub successes: usize,
    pub by_model: BTreeMap<String, ModelBreakdown>,
}

#[derive(Debug, Clone)]
pub struct ChallengeTracker {
    store: DocStore,
}

impl ChallengeTracker {
    pub fn new(store: DocStore) -> Self {
        Self { store }
    }

    fn challenge_key(category: AttackCategory, target: &str) -> String {
        sanitize_id(&format!("{}-{}", category.as_str(), target))
    }

    /// Record one attempt; returns the stored document id
    pub fn record_attempt(&self, attempt: &ChallengeAttempt) -> Result<String, StoreError> {
        let mut hasher = Sha256::new();
        hasher.update(attempt.prompt.as_bytes());
        hasher.update(attempt.timestamp.to_rfc3339().as_bytes());
        let digest = hasher.finalize();
        let id = format!(
            "{}-{}-{:02x}{:02x}{:02x}{:02x}",
            Self::challenge_key(attempt.category, &attempt.target),
            attempt.timestamp.format("%Y%m%d%H%M%S"),
            digest[0],
            digest[1],
            digest[2],
            digest[3]
        );
        self.store.put(CHALLENGES_COLLECTION, &id, attempt)?;
        Ok(id)
    }

    fn load_attempts(&self) -> Result<Vec<ChallengeAttempt>, StoreError> {
        let mut attempts = Vec::new();
        for id in self.store.list(CHALLENGES_COLLECTION)? {
            let doc = self.store.get(CHALLENGES_COLLECTION, &id)?;
            if let Ok(attempt) = serde_json::from_value::<ChallengeAttempt>(doc) {
                attempts.push(attempt);
            }
        }
        Ok(attempts)
    }

    /// Status of one challenge
    pub fn status(
        &self,
        category: AttackCategory,
        target: &str,
    ) -> Result<ChallengeStatus, StoreError> {
        let challenge = Self::challenge_key(category, target);
        let mut status = ChallengeStatus {
            challenge: challenge.clone(),
            attempts: 0,
            successes: 0,
            by_model: BTreeMap::new(),
        };

        for attempt in self.load_attempts()? {
            if attempt.category != category || attempt.target != target {
                continue;
            }
            status.attempts += 1;
            let entry = status
                .by_model
                .entry(format!("{}/{}", attempt.provider, attempt.model))
                .or_default();
            entry.attempts += 1;
            if attempt.success {
                status.successes += 1;
                entry.successes += 1;
            }
        }

        Ok(status)
    }

    /// All challenges with recorded attempts, with aggregate counts
    pub fn list_challenges(&self) -> Result<Vec<ChallengeStatus>, StoreError> {
        let mut by_challenge: BTreeMap<String, ChallengeStatus> = BTreeMap::new();

        for attempt in self.load_attempts()? {
            let challenge = Self::challenge_key(attempt.category, &attempt.target);
            let status = by_challenge
                .entry(challenge.clone())
                .or_insert_with(|| ChallengeStatus {
                    challenge,
                    attempts: 0,
                    successes: 0,
                    by_model: BTreeMap::new(),
                });
            status.attempts += 1;
            let entry = status
                .by_model
                .entry(format!("{}/{}", attempt.provider, attempt.model))
                .or_default();
            entry.attempts += 1;
            if attempt.success {
                status.successes += 1;
                entry.successes += 1;
            }
        }

        Ok(by_challenge.into_values().collect())
    }
}
