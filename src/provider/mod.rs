//! # Provider Abstraction Layer
//!
//! The engine never talks to a backend directly. Every compute node carries
//! a [`ProviderDescriptor`] and the engine resolves `descriptor.provider`
//! through a [`ProviderRegistry`].
//!
//! - [`Provider`] - uniform `execute(descriptor, input)` contract
//! - [`OpenAIProvider`] / [`ClaudeProvider`] - HTTP chat backends
//! - [`MockProvider`] - scripted responses for tests and `--provider mock`
//! - [`RetrievalProvider`] - knowledge-base loading and querying
//!
//! ## Available Providers
//!
//! | Key | Backend | Requires |
//! |-----|---------|----------|
//! | `openai` | OpenAI Chat Completions / Responses | `OPENAI_API_KEY` |
//! | `anthropic` | Anthropic Messages | `ANTHROPIC_API_KEY` |
//! | `mock` | In-process | Nothing |

mod claude;
mod mock;
mod openai;
pub mod retrieval;
mod types;

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use rustc_hash::FxHashMap;

use crate::config::AgnoflowConfig;
use crate::error::FlowError;

pub use claude::ClaudeProvider;
pub use mock::{MockProvider, MockRequest};
pub use openai::OpenAIProvider;
pub use retrieval::{InMemoryRetriever, RetrievalProvider, RetrievalSettings};
pub use types::{ProviderDescriptor, ProviderOutput};

// ============================================================================
// PROVIDER TRAIT
// ============================================================================

/// Core trait that every execution backend implements
///
/// Implementations format the request for their API, call it, and return
/// either plain text or a structured JSON value.
#[async_trait]
pub trait Provider: Send + Sync {
    /// Returns the provider name (e.g., "openai", "anthropic", "mock")
    fn name(&self) -> &str;

    /// Run one node's work against `input` (the aggregated upstream text)
    async fn execute(&self, descriptor: &ProviderDescriptor, input: &str)
        -> Result<ProviderOutput>;

    /// Whether the backend is usable (e.g. API key present)
    fn is_available(&self) -> bool {
        true
    }
}

// ============================================================================
// REGISTRY
// ============================================================================

/// Name -> provider lookup used by the engine
#[derive(Clone, Default)]
pub struct ProviderRegistry {
    providers: FxHashMap<String, Arc<dyn Provider>>,
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or replace) the provider for `key`
    pub fn register(&mut self, key: impl Into<String>, provider: Arc<dyn Provider>) {
        self.providers.insert(key.into(), provider);
    }

    /// Builder form of [`register`](Self::register)
    pub fn with(mut self, key: impl Into<String>, provider: Arc<dyn Provider>) -> Self {
        self.register(key, provider);
        self
    }

    pub fn get(&self, key: &str) -> Option<Arc<dyn Provider>> {
        self.providers.get(key).cloned()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.providers.contains_key(key)
    }

    /// Registered keys, sorted
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.providers.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }

    /// Register every backend that has credentials in `config`
    pub fn from_config(config: &AgnoflowConfig) -> crate::error::Result<Self> {
        let mut registry = Self::new();

        if let Some(key) = config.openai_key() {
            let provider =
                OpenAIProvider::new(key).map_err(|e| FlowError::Provider(e.to_string()))?;
            registry.register("openai", Arc::new(provider));
        }

        if let Some(key) = config.anthropic_key() {
            let provider =
                ClaudeProvider::new(key).map_err(|e| FlowError::Provider(e.to_string()))?;
            registry.register("anthropic", Arc::new(provider));
        }

        tracing::debug!(providers = ?registry.names(), "provider registry built");
        Ok(registry)
    }
}

// ============================================================================
// PROVIDER FACTORY
// ============================================================================

/// Create a provider instance by name
///
/// | Name | Description | Requires |
/// |------|-------------|----------|
/// | `openai` | OpenAI API | OpenAI key in config/env |
/// | `anthropic` / `claude` | Anthropic API | Anthropic key in config/env |
/// | `mock` | Echo provider | Nothing |
pub fn create_provider(name: &str, config: &AgnoflowConfig) -> Result<Arc<dyn Provider>> {
    match name.to_lowercase().as_str() {
        "openai" => {
            let key = config.openai_key().ok_or_else(|| FlowError::MissingApiKey {
                provider: "openai".to_string(),
            })?;
            Ok(Arc::new(OpenAIProvider::new(key)?))
        }
        "anthropic" | "claude" => {
            let key = config
                .anthropic_key()
                .ok_or_else(|| FlowError::MissingApiKey {
                    provider: "anthropic".to_string(),
                })?;
            Ok(Arc::new(ClaudeProvider::new(key)?))
        }
        "mock" => Ok(Arc::new(MockProvider::new())),
        _ => anyhow::bail!(
            "Unknown provider: '{}'. Available: openai, anthropic, mock",
            name
        ),
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ApiKeys;

    #[test]
    fn test_registry_lookup() {
        let registry = ProviderRegistry::new()
            .with("openai", Arc::new(MockProvider::new()))
            .with("firecrawl_scrape", Arc::new(MockProvider::new()));

        assert_eq!(registry.len(), 2);
        assert!(registry.contains("openai"));
        assert!(registry.get("anthropic").is_none());
        assert_eq!(registry.names(), vec!["firecrawl_scrape", "openai"]);
    }

    #[test]
    fn test_from_config_registers_only_keyed_backends() {
        let empty = ProviderRegistry::from_config(&AgnoflowConfig::default()).unwrap();
        assert!(empty.is_empty());

        let config = AgnoflowConfig {
            api_keys: ApiKeys {
                anthropic: Some("sk-ant-test".into()),
                openai: Some("sk-test".into()),
            },
            ..Default::default()
        };
        let registry = ProviderRegistry::from_config(&config).unwrap();
        assert_eq!(registry.names(), vec!["anthropic", "openai"]);
        assert_eq!(registry.get("anthropic").unwrap().name(), "claude");
    }

    #[test]
    fn test_create_provider_mock() {
        let provider = create_provider("mock", &AgnoflowConfig::default()).unwrap();
        assert_eq!(provider.name(), "mock");
    }

    #[test]
    fn test_create_provider_without_key() {
        let err = create_provider("openai", &AgnoflowConfig::default())
            .err()
            .unwrap();
        assert!(err.to_string().contains("AF-052"));
    }

    #[test]
    fn test_create_provider_unknown() {
        assert!(create_provider("unknown", &AgnoflowConfig::default()).is_err());
    }
}
