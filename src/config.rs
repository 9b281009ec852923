//! Agnoflow Configuration Module
//!
//! Config is stored in `~/.config/agnoflow/config.toml`.
//!
//! ## Priority Order (highest to lowest)
//!
//! 1. Environment variables (`OPENAI_API_KEY`, `ANTHROPIC_API_KEY`, `DATABASE_URL`)
//! 2. Config file (`~/.config/agnoflow/config.toml`)
//! 3. Defaults

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{FlowError, Result};
use crate::util::{CONDITION_MODEL, PROVIDER_TIMEOUT};

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct AgnoflowConfig {
    /// API keys for LLM providers
    #[serde(default)]
    pub api_keys: ApiKeys,

    /// Knowledge-base backend settings
    #[serde(default)]
    pub knowledge: KnowledgeSettings,

    /// Engine tuning
    #[serde(default)]
    pub engine: EngineSettings,
}

/// API keys configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ApiKeys {
    /// Anthropic API key (sk-ant-...)
    pub anthropic: Option<String>,

    /// OpenAI API key (sk-proj-... or sk-...)
    pub openai: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct KnowledgeSettings {
    /// Postgres URL for pgvector-backed knowledge bases
    pub database_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct EngineSettings {
    /// Upper bound for a single provider call, in milliseconds
    pub provider_timeout_ms: u64,
    /// Provider used to evaluate conditional nodes
    pub condition_provider: String,
    pub condition_model: String,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            provider_timeout_ms: PROVIDER_TIMEOUT.as_millis() as u64,
            condition_provider: "openai".to_string(),
            condition_model: CONDITION_MODEL.to_string(),
        }
    }
}

impl EngineSettings {
    pub fn provider_timeout(&self) -> Duration {
        Duration::from_millis(self.provider_timeout_ms)
    }
}

impl AgnoflowConfig {
    /// Returns `~/.config/agnoflow/` on Unix, `%APPDATA%/agnoflow/` on Windows
    pub fn config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("agnoflow")
    }

    pub fn config_path() -> PathBuf {
        Self::config_dir().join("config.toml")
    }

    /// Load configuration from the default path
    ///
    /// Returns default config if file doesn't exist.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path())
    }

    /// Load configuration from an explicit path
    ///
    /// Returns default config if file doesn't exist, error if it is malformed.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path).map_err(|e| FlowError::ConfigError {
            reason: format!("Failed to read config file: {}", e),
        })?;

        toml::from_str(&content).map_err(|e| FlowError::ConfigError {
            reason: format!("Failed to parse config file: {}", e),
        })
    }

    /// Save configuration to an explicit path, creating parent directories
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir).map_err(|e| FlowError::ConfigError {
                reason: format!("Failed to create config directory: {}", e),
            })?;
        }

        let content = toml::to_string_pretty(self).map_err(|e| FlowError::ConfigError {
            reason: format!("Failed to serialize config: {}", e),
        })?;

        fs::write(path, content).map_err(|e| FlowError::ConfigError {
            reason: format!("Failed to write config file: {}", e),
        })
    }

    /// Merge with process environment variables
    pub fn with_env(self) -> Self {
        self.with_env_from(|key| std::env::var(key).ok())
    }

    /// Merge with variables from `lookup`; empty values never override
    pub fn with_env_from<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.is_empty());

        if let Some(key) = non_empty("OPENAI_API_KEY") {
            self.api_keys.openai = Some(key);
        }
        if let Some(key) = non_empty("ANTHROPIC_API_KEY") {
            self.api_keys.anthropic = Some(key);
        }
        if let Some(url) = non_empty("DATABASE_URL") {
            self.knowledge.database_url = Some(url);
        }

        self
    }

    pub fn openai_key(&self) -> Option<&str> {
        self.api_keys.openai.as_deref()
    }

    pub fn anthropic_key(&self) -> Option<&str> {
        self.api_keys.anthropic.as_deref()
    }

    pub fn database_url(&self) -> Option<&str> {
        self.knowledge.database_url.as_deref()
    }

    pub fn has_any_key(&self) -> bool {
        self.api_keys.anthropic.is_some() || self.api_keys.openai.is_some()
    }
}

/// Mask an API key for display
///
/// Shows first N chars + asterisks, e.g. "sk-proj***"
pub fn mask_api_key(key: &str, visible_chars: usize) -> String {
    if key.is_empty() {
        return String::new();
    }

    let visible: String = key.chars().take(visible_chars).collect();
    format!("{}***", visible)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_config_path_contains_agnoflow() {
        let path = AgnoflowConfig::config_path();
        assert!(path.to_string_lossy().contains("agnoflow"));
        assert!(path.to_string_lossy().ends_with("config.toml"));
        assert_eq!(path.parent().unwrap(), AgnoflowConfig::config_dir());
    }

    #[test]
    fn test_defaults() {
        let config = AgnoflowConfig::default();
        assert!(!config.has_any_key());
        assert!(config.database_url().is_none());
        assert_eq!(config.engine.provider_timeout(), PROVIDER_TIMEOUT);
        assert_eq!(config.engine.condition_model, "gpt-4o-mini");
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let config = AgnoflowConfig {
            api_keys: ApiKeys {
                anthropic: Some("sk-ant-test".into()),
                openai: None,
            },
            knowledge: KnowledgeSettings {
                database_url: Some("postgresql://localhost/kb".into()),
            },
            engine: EngineSettings {
                provider_timeout_ms: 5_000,
                ..Default::default()
            },
        };

        config.save_to(&path).unwrap();
        let loaded = AgnoflowConfig::load_from(&path).unwrap();
        assert_eq!(config, loaded);
    }

    #[test]
    fn test_load_missing_file_returns_default() {
        let dir = TempDir::new().unwrap();
        let config = AgnoflowConfig::load_from(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config, AgnoflowConfig::default());
    }

    #[test]
    fn test_load_malformed_file_is_config_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[api_keys\nopenai = ").unwrap();

        let err = AgnoflowConfig::load_from(&path).unwrap_err();
        assert_eq!(err.code(), "AF-090");
    }

    #[test]
    fn test_partial_engine_section_keeps_defaults() {
        let config: AgnoflowConfig = toml::from_str("[engine]\nprovider_timeout_ms = 3000\n").unwrap();
        assert_eq!(config.engine.provider_timeout(), Duration::from_secs(3));
        assert_eq!(config.engine.condition_provider, "openai");
    }

    #[test]
    fn test_env_overrides_config() {
        let config = AgnoflowConfig {
            api_keys: ApiKeys {
                anthropic: Some("sk-ant-from-config".into()),
                openai: None,
            },
            ..Default::default()
        }
        .with_env_from(env(&[
            ("ANTHROPIC_API_KEY", "sk-ant-from-env"),
            ("DATABASE_URL", "postgresql://db/kb"),
        ]));

        assert_eq!(config.anthropic_key(), Some("sk-ant-from-env"));
        assert_eq!(config.database_url(), Some("postgresql://db/kb"));
        assert!(config.openai_key().is_none());
    }

    #[test]
    fn test_empty_env_does_not_override() {
        let config = AgnoflowConfig {
            api_keys: ApiKeys {
                anthropic: None,
                openai: Some("sk-from-config".into()),
            },
            ..Default::default()
        }
        .with_env_from(env(&[("OPENAI_API_KEY", "")]));

        assert_eq!(config.openai_key(), Some("sk-from-config"));
    }

    #[test]
    fn test_mask_api_key() {
        assert_eq!(mask_api_key("sk-proj-abc", 7), "sk-proj***");
        assert_eq!(mask_api_key("short", 10), "short***");
        assert_eq!(mask_api_key("", 10), "");
    }
}
