//! Configuration loading for graybench
//!
//! `graybench.toml` is searched in the workspace root, then `.graybench/`
//! inside the workspace, then `~/.graybench/`. Missing sections fall back to
//! defaults, so an empty file is a valid configuration.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::config::types::{
    AgentConfig, CacheConfig, ContentFilterConfig, FallbackConfig, MetricsConfig, QualityConfig,
    RateLimitConfig, RedteamConfig, StorageConfig, WorkspaceSettings,
};

pub const CONFIG_FILE_NAME: &str = "graybench.toml";
pub const CONFIG_DIR_NAME: &str = ".graybench";

/// Main configuration structure for graybench
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct GraybenchConfig {
    /// Default provider/model and sampling parameters
    #[serde(default)]
    pub agent: AgentConfig,

    /// Response cache
    #[serde(default)]
    pub cache: CacheConfig,

    /// Per-provider request budgets
    #[serde(default)]
    pub rate_limits: RateLimitConfig,

    /// Content filter
    #[serde(default)]
    pub content_filter: ContentFilterConfig,

    /// Response quality thresholds
    #[serde(default)]
    pub quality: QualityConfig,

    /// Metrics recorder
    #[serde(default)]
    pub metrics: MetricsConfig,

    /// Fallback chain
    #[serde(default)]
    pub fallback: FallbackConfig,

    /// Learning workspace
    #[serde(default)]
    pub workspace: WorkspaceSettings,

    /// Red-team toolkit
    #[serde(default)]
    pub redteam: RedteamConfig,

    /// Document store
    #[serde(default)]
    pub storage: StorageConfig,
}

impl GraybenchConfig {
    /// Write a default `graybench.toml` into `workspace` unless one exists
    pub fn bootstrap<P: AsRef<Path>>(workspace: P, force: bool) -> Result<Option<PathBuf>> {
        let config_path = workspace.as_ref().join(CONFIG_FILE_NAME);
        if config_path.exists() && !force {
            return Ok(None);
        }

        let content = toml::to_string_pretty(&GraybenchConfig::default())
            .context("Failed to serialize default configuration")?;
        fs::write(&config_path, content)
            .with_context(|| format!("Failed to write config file: {}", config_path.display()))?;

        Ok(Some(config_path))
    }
}

/// Loads and holds a [`GraybenchConfig`] plus where it came from
#[derive(Debug, Clone)]
pub struct ConfigManager {
    config: GraybenchConfig,
    config_path: Option<PathBuf>,
}

impl ConfigManager {
    /// Load configuration from the default locations
    pub fn load() -> Result<Self> {
        Self::load_from_workspace(std::env::current_dir()?)
    }

    /// Load configuration from a specific workspace
    pub fn load_from_workspace(workspace: impl AsRef<Path>) -> Result<Self> {
        let workspace = workspace.as_ref();

        let candidates = [
            workspace.join(CONFIG_FILE_NAME),
            workspace.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME),
        ];
        for candidate in candidates {
            if candidate.exists() {
                return Self::load_from_file(candidate);
            }
        }

        if let Some(home) = Self::home_dir() {
            let home_config = home.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME);
            if home_config.exists() {
                return Self::load_from_file(home_config);
            }
        }

        Ok(Self {
            config: GraybenchConfig::default(),
            config_path: None,
        })
    }

    /// Load configuration from a specific file
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: GraybenchConfig = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(Self {
            config,
            config_path: Some(path.to_path_buf()),
        })
    }

    /// Build a manager around an in-memory config (tests, embedding)
    pub fn from_config(config: GraybenchConfig) -> Self {
        Self {
            config,
            config_path: None,
        }
    }

    pub fn config(&self) -> &GraybenchConfig {
        &self.config
    }

    pub fn config_path(&self) -> Option<&Path> {
        self.config_path.as_deref()
    }

    fn home_dir() -> Option<PathBuf> {
        if let Ok(home) = std::env::var("HOME") {
            return Some(PathBuf::from(home));
        }
        dirs::home_dir()
    }
}
