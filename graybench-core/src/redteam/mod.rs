//! Gray Swan red-team toolkit
//!
//! Prompt generation, response analysis, benchmark sweeps, and challenge
//! tracking. Everything dispatches through the model manager, so benchmark
//! traffic is rate-limited and metered like any other.

pub mod analyzer;
pub mod benchmarker;
pub mod generator;
pub mod tracker;

pub use analyzer::{PromptAnalyzer, REFUSAL_INDICATORS, Verdict};
pub use benchmarker::{Benchmarker, CategoryReport, CellResult, StrategyResult};
pub use generator::{AttackCategory, PromptGenerator};
pub use tracker::{ChallengeAttempt, ChallengeStatus, ChallengeTracker};
