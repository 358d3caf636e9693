//! # graybench-core
//!
//! Core library for graybench: multi-provider LLM orchestration with a
//! learning workspace and a red-team benchmarking toolkit.
//!
//! ## Architecture overview
//!
//! - `config/`: `graybench.toml` loader, per-section defaults, and the
//!   centralized constants (model ids, endpoints, rate limits).
//! - `llm/`: the unified provider abstraction and the vendor adapters
//!   (Anthropic, OpenAI, Gemini, OpenRouter, CAMeL-AI).
//! - `core/`: the model manager and the passes it applies to every
//!   generation — response cache, sliding-window rate limiting, content
//!   filtering, quality checks, metrics — plus the three-tier fallback
//!   chain (simplified retry, alternate providers, canned response).
//! - `workspace/` + `agents/`: query routing to specialized agents over a
//!   keyword topic hierarchy.
//! - `redteam/`: adversarial prompt generation, response analysis,
//!   benchmark sweeps, and challenge tracking.
//! - `storage/`: the file-backed JSON document store behind sessions,
//!   benchmark runs, and challenge records.
//!
//! ## Quickstart
//!
//! ```rust,no_run
//! use graybench_core::config::ConfigManager;
//! use graybench_core::core::manager::{GenerateRequest, ModelManager};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = ConfigManager::load()?;
//!     let manager = ModelManager::new(&config);
//!
//!     let outcome = manager
//!         .generate(GenerateRequest::new("What is a manifold?"))
//!         .await?;
//!     println!("{}", outcome.content.unwrap_or_default());
//!     Ok(())
//! }
//! ```

pub mod agents;
pub mod config;
pub mod core;
pub mod llm;
pub mod redteam;
pub mod storage;
pub mod workspace;

pub use config::{ConfigManager, GraybenchConfig};
pub use core::manager::{GenerateOutcome, GenerateRequest, ModelManager};
pub use storage::DocStore;
pub use workspace::Workspace;
