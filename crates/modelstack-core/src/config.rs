use crate::error::{DeployError, Result};
use crate::io;
use crate::paths;
use serde::{Deserialize, Serialize};
use std::path::Path;

// ---------------------------------------------------------------------------
// ProjectConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectConfig {
    #[serde(default = "default_project_name")]
    pub name: String,
}

fn default_project_name() -> String {
    "modelstack".to_string()
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            name: default_project_name(),
        }
    }
}

// ---------------------------------------------------------------------------
// ConvergeConfig
// ---------------------------------------------------------------------------

/// Poll tuning for the convergence loop. Both values are deliberately
/// configuration, not constants: interval requirements differ between
/// providers and the wait must always be bounded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConvergeConfig {
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,
    #[serde(default = "default_max_polls")]
    pub max_polls: u32,
}

fn default_poll_interval_secs() -> u64 {
    10
}

fn default_max_polls() -> u32 {
    120
}

impl Default for ConvergeConfig {
    fn default() -> Self {
        Self {
            poll_interval_secs: default_poll_interval_secs(),
            max_polls: default_max_polls(),
        }
    }
}

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub project: ProjectConfig,

    #[serde(default = "default_region")]
    pub region: String,

    /// Base URL of the provider's infrastructure API. No usable default:
    /// deployment commands fail with a clear message until this is set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,

    #[serde(default = "default_stack_prefix")]
    pub stack_prefix: String,

    #[serde(default)]
    pub converge: ConvergeConfig,
}

fn default_region() -> String {
    "us-east-1".to_string()
}

fn default_stack_prefix() -> String {
    "modelstack".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            project: ProjectConfig::default(),
            region: default_region(),
            endpoint: None,
            stack_prefix: default_stack_prefix(),
            converge: ConvergeConfig::default(),
        }
    }
}

impl Config {
    pub fn load(root: &Path) -> Result<Self> {
        let path = paths::config_path(root);
        if !path.exists() {
            return Err(DeployError::NotInitialized);
        }
        let data = std::fs::read_to_string(&path)?;
        let config: Config = serde_yaml::from_str(&data)?;
        Ok(config)
    }

    pub fn save(&self, root: &Path) -> Result<()> {
        let path = paths::config_path(root);
        let data = serde_yaml::to_string(self)?;
        io::atomic_write(&path, data.as_bytes())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
