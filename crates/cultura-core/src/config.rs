//! CulturaCheck configuration system.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::Result;

/// Root configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CulturaConfig {
    #[serde(default = "default_api_key")]
    pub api_key: String,
    #[serde(default = "default_provider")]
    pub default_provider: String,
    #[serde(default = "default_model")]
    pub default_model: String,
    #[serde(default = "default_temperature")]
    pub default_temperature: f32,
    #[serde(default)]
    pub knowledge: KnowledgeConfig,
    #[serde(default)]
    pub agent: AgentConfig,
    #[serde(default)]
    pub gateway: GatewayConfig,
}

fn default_api_key() -> String {
    String::new()
}
fn default_provider() -> String {
    "anthropic".into()
}
fn default_model() -> String {
    "claude-sonnet-4-5".into()
}
fn default_temperature() -> f32 {
    0.0
}

impl Default for CulturaConfig {
    fn default() -> Self {
        Self {
            api_key: default_api_key(),
            default_provider: default_provider(),
            default_model: default_model(),
            default_temperature: default_temperature(),
            knowledge: KnowledgeConfig::default(),
            agent: AgentConfig::default(),
            gateway: GatewayConfig::default(),
        }
    }
}

impl CulturaConfig {
    /// Load config from the default path (~/.culturacheck/config.toml).
    pub fn load() -> Result<Self> {
        let path = Self::default_path();
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load config from a specific path.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            crate::error::CulturaError::Config(format!("Failed to read config: {e}"))
        })?;
        let config: Self = toml::from_str(&content).map_err(|e| {
            crate::error::CulturaError::Config(format!("Failed to parse config: {e}"))
        })?;
        Ok(config)
    }

    /// Save config to the default path.
    pub fn save(&self) -> Result<()> {
        let path = Self::default_path();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self).map_err(|e| {
            crate::error::CulturaError::Config(format!("Failed to serialize config: {e}"))
        })?;
        std::fs::write(&path, content)?;
        Ok(())
    }

    /// Get the default config path.
    pub fn default_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".culturacheck")
            .join("config.toml")
    }

    /// Get the CulturaCheck home directory.
    pub fn home_dir() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".culturacheck")
    }
}

/// Knowledge corpus configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KnowledgeConfig {
    /// Path to the knowledge snapshot artifact (JSON array of records).
    #[serde(default = "default_corpus_path")]
    pub corpus_path: String,
    /// Whether to run the LLM keyword-expansion pass before ranking.
    #[serde(default = "bool_true")]
    pub expansion_enabled: bool,
    /// Model used for keyword extraction. Empty = use `default_model`.
    #[serde(default)]
    pub expansion_model: String,
}

fn default_corpus_path() -> String {
    "knowledge-base.json".into()
}
fn bool_true() -> bool {
    true
}

impl Default for KnowledgeConfig {
    fn default() -> Self {
        Self {
            corpus_path: default_corpus_path(),
            expansion_enabled: true,
            expansion_model: String::new(),
        }
    }
}

/// Agent (report/chat assembly) configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentConfig {
    /// Max tokens for a compliance-check report.
    #[serde(default = "default_check_max_tokens")]
    pub check_max_tokens: u32,
    /// Max tokens for a chat reply.
    #[serde(default = "default_chat_max_tokens")]
    pub chat_max_tokens: u32,
    /// Longest input text accepted for review, in characters.
    #[serde(default = "default_max_text_length")]
    pub max_text_length: usize,
}

fn default_check_max_tokens() -> u32 {
    4096
}
fn default_chat_max_tokens() -> u32 {
    1024
}
fn default_max_text_length() -> usize {
    10000
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            check_max_tokens: default_check_max_tokens(),
            chat_max_tokens: default_chat_max_tokens(),
            max_text_length: default_max_text_length(),
        }
    }
}

/// HTTP gateway configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "127.0.0.1".into()
}
fn default_port() -> u16 {
    8787
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}
