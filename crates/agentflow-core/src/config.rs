use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::error::{AgentFlowError, Result};

pub const DEFAULT_PORT: u16 = 8787;
pub const DEFAULT_BIND: &str = "127.0.0.1";
/// Approximate token-unit budget the `memory_loader` node trims history to.
pub const DEFAULT_CONTEXT_BUDGET: usize = 4000;
pub const DEFAULT_SUMMARY_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_CHAT_MODEL: &str = "gpt-4o-mini";

/// Top-level config (agentflow.toml + AGENTFLOW_* env overrides).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentFlowConfig {
    #[serde(default)]
    pub gateway: GatewayConfig,
    #[serde(default)]
    pub pipeline: PipelineConfig,
}

impl Default for AgentFlowConfig {
    fn default() -> Self {
        Self {
            gateway: GatewayConfig::default(),
            pipeline: PipelineConfig::default(),
        }
    }
}

impl AgentFlowConfig {
    /// Load from an explicit path, else `./agentflow.toml`, layered with
    /// `AGENTFLOW_*` env var overrides. Falls back to defaults if neither
    /// source is present — mirrors `SkynetConfig::load`.
    pub fn load(path: Option<&str>) -> Result<Self> {
        let toml_path = path.unwrap_or("agentflow.toml");
        let figment = Figment::from(Toml::file(toml_path))
            .merge(Env::prefixed("AGENTFLOW_").split("__"));

        figment
            .extract()
            .or_else(|_| Ok(Self::default()))
            .map_err(|e: figment::Error| AgentFlowError::Config(e.to_string()))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_bind")]
    pub bind: String,
    #[serde(default)]
    pub auth: AuthConfig,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            bind: default_bind(),
            auth: AuthConfig::default(),
        }
    }
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

fn default_bind() -> String {
    DEFAULT_BIND.to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    pub mode: AuthMode,
    pub token: Option<String>,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            mode: AuthMode::None,
            token: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum AuthMode {
    Token,
    None,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    #[serde(default = "default_context_budget")]
    pub context_budget_tokens: usize,
    #[serde(default = "default_summary_model")]
    pub summary_model: String,
    #[serde(default = "default_chat_model")]
    pub default_chat_model: String,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            context_budget_tokens: default_context_budget(),
            summary_model: default_summary_model(),
            default_chat_model: default_chat_model(),
        }
    }
}

fn default_context_budget() -> usize {
    DEFAULT_CONTEXT_BUDGET
}

fn default_summary_model() -> String {
    DEFAULT_SUMMARY_MODEL.to_string()
}

fn default_chat_model() -> String {
    DEFAULT_CHAT_MODEL.to_string()
}
