//! Provider request/response types

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Everything a provider needs to run one node, produced at compile time
///
/// `provider` is the registry key the engine resolves at run time
/// (e.g. "openai", "anthropic", "firecrawl_scrape").
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderDescriptor {
    pub provider: String,
    #[serde(default)]
    pub model: String,
    #[serde(default)]
    pub instructions: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tools: Vec<String>,
    #[serde(default)]
    pub markdown: bool,
    /// Opaque handle resolved by an external credential store
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credential_id: Option<String>,
    /// Service-specific settings
    #[serde(default)]
    pub settings: Value,
}

impl ProviderDescriptor {
    pub fn new(provider: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            provider: provider.into(),
            model: model.into(),
            instructions: String::new(),
            temperature: None,
            max_tokens: None,
            tools: Vec::new(),
            markdown: false,
            credential_id: None,
            settings: Value::Null,
        }
    }

    pub fn with_instructions(mut self, instructions: impl Into<String>) -> Self {
        self.instructions = instructions.into();
        self
    }

    pub fn with_tools(mut self, tools: Vec<String>) -> Self {
        self.tools = tools;
        self
    }

    pub fn with_settings(mut self, settings: Value) -> Self {
        self.settings = settings;
        self
    }

    pub fn has_tool(&self, tool: &str) -> bool {
        self.tools.iter().any(|t| t == tool)
    }
}

/// Result of a provider call
#[derive(Debug, Clone, PartialEq)]
pub enum ProviderOutput {
    Text(String),
    Structured(Value),
}

impl ProviderOutput {
    /// Textual form recorded as the node's output (structured values as JSON)
    pub fn to_text(&self) -> String {
        match self {
            Self::Text(text) => text.clone(),
            Self::Structured(value) => value.to_string(),
        }
    }

    /// JSON form carried in `node_output` event data
    pub fn into_value(self) -> Value {
        match self {
            Self::Text(text) => Value::String(text),
            Self::Structured(value) => value,
        }
    }
}

impl From<String> for ProviderOutput {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<&str> for ProviderOutput {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl From<Value> for ProviderOutput {
    fn from(value: Value) -> Self {
        Self::Structured(value)
    }
}
