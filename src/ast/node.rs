//! Node types and their per-type configuration
//!
//! `NodeConfig` is a sum type: each variant carries only its own fields,
//! and a node holds at most one of them.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::util::{DEFAULT_CHUNK_OVERLAP, DEFAULT_CHUNK_SIZE};

/// Every node type the canvas can produce
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeType {
    Agent,
    Team,
    Tool,
    KnowledgeBase,
    Prompt,
    Input,
    Output,
    Conditional,
    Loop,
    Webhook,
    Schedule,
    FirecrawlScrape,
    McpServer,
    HuggingfaceInference,
    ApifyActor,
}

impl NodeType {
    /// Wire tag for this type (matches the serde representation)
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Agent => "agent",
            Self::Team => "team",
            Self::Tool => "tool",
            Self::KnowledgeBase => "knowledge_base",
            Self::Prompt => "prompt",
            Self::Input => "input",
            Self::Output => "output",
            Self::Conditional => "conditional",
            Self::Loop => "loop",
            Self::Webhook => "webhook",
            Self::Schedule => "schedule",
            Self::FirecrawlScrape => "firecrawl_scrape",
            Self::McpServer => "mcp_server",
            Self::HuggingfaceInference => "huggingface_inference",
            Self::ApifyActor => "apify_actor",
        }
    }

    /// External-service integrations normalized through an envelope
    pub fn is_integration(&self) -> bool {
        matches!(
            self,
            Self::FirecrawlScrape | Self::McpServer | Self::HuggingfaceInference | Self::ApifyActor
        )
    }
}

impl fmt::Display for NodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-type node configuration (externally tagged: `{"agent": {...}}`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeConfig {
    Agent(AgentConfig),
    Team(TeamConfig),
    Tool(ToolConfig),
    KnowledgeBase(KnowledgeBaseConfig),
    Prompt(PromptConfig),
    Conditional(ConditionalConfig),
    Loop(LoopConfig),
    Webhook(WebhookConfig),
    Schedule(ScheduleConfig),
    InputOutput(InputOutputConfig),
    FirecrawlScrape(FirecrawlScrapeConfig),
    McpServer(McpServerConfig),
    HuggingfaceInference(HuggingFaceInferenceConfig),
    ApifyActor(ApifyActorConfig),
}

// ═══════════════════════════════════════════════════════════════
// COMPUTE NODES
// ═══════════════════════════════════════════════════════════════

/// Supported LLM providers for agent nodes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AgentProvider {
    #[default]
    Openai,
    Anthropic,
    Google,
    Groq,
    Ollama,
}

impl AgentProvider {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Openai => "openai",
            Self::Anthropic => "anthropic",
            Self::Google => "google",
            Self::Groq => "groq",
            Self::Ollama => "ollama",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    pub name: String,
    pub provider: AgentProvider,
    pub model: String,
    pub system_prompt: String,
    pub temperature: f32,
    pub max_tokens: Option<u32>,
    pub tools: Vec<String>,
    pub knowledge_bases: Vec<String>,
    pub instructions: Vec<String>,
    pub show_tool_calls: bool,
    pub markdown: bool,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            name: "Unnamed Agent".to_string(),
            provider: AgentProvider::Openai,
            model: "gpt-4o".to_string(),
            system_prompt: String::new(),
            temperature: 0.7,
            max_tokens: None,
            tools: Vec::new(),
            knowledge_bases: Vec::new(),
            instructions: Vec::new(),
            show_tool_calls: true,
            markdown: true,
        }
    }
}

/// Team coordination modes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TeamMode {
    #[default]
    Coordinate,
    Route,
    Collaborate,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TeamConfig {
    pub name: String,
    pub mode: TeamMode,
    pub members: Vec<String>,
    pub instructions: Vec<String>,
    pub success_criteria: String,
    pub enable_agentic_context: bool,
    pub share_member_interactions: bool,
}

impl Default for TeamConfig {
    fn default() -> Self {
        Self {
            name: "Unnamed Team".to_string(),
            mode: TeamMode::Coordinate,
            members: Vec::new(),
            instructions: Vec::new(),
            success_criteria: String::new(),
            enable_agentic_context: true,
            share_member_interactions: true,
        }
    }
}

/// Tool node (web search today)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolConfig {
    pub tool_type: String,
    pub parameters: Map<String, Value>,
}

// ═══════════════════════════════════════════════════════════════
// RETRIEVAL
// ═══════════════════════════════════════════════════════════════

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KnowledgeBaseConfig {
    /// pdf, url, text, ...
    pub kb_type: String,
    pub vector_db: String,
    pub sources: Vec<String>,
    pub chunk_size: usize,
    pub chunk_overlap: usize,
}

impl Default for KnowledgeBaseConfig {
    fn default() -> Self {
        Self {
            kb_type: "pdf".to_string(),
            vector_db: "pgvector".to_string(),
            sources: Vec::new(),
            chunk_size: DEFAULT_CHUNK_SIZE,
            chunk_overlap: DEFAULT_CHUNK_OVERLAP,
        }
    }
}

// ═══════════════════════════════════════════════════════════════
// CONTROL / IO NODES
// ═══════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PromptConfig {
    pub template: String,
    pub variables: BTreeMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConditionalConfig {
    pub condition_expression: String,
    pub true_label: String,
    pub false_label: String,
}

impl Default for ConditionalConfig {
    fn default() -> Self {
        Self {
            condition_expression: String::new(),
            true_label: "Yes".to_string(),
            false_label: "No".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoopConfig {
    pub max_iterations: u32,
    pub break_condition: String,
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            max_iterations: 10,
            break_condition: String::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WebhookConfig {
    pub path: String,
    pub method: String,
}

impl Default for WebhookConfig {
    fn default() -> Self {
        Self {
            path: "/webhook".to_string(),
            method: "POST".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScheduleConfig {
    pub cron_expression: String,
    pub timezone: String,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            cron_expression: "0 * * * *".to_string(),
            timezone: "UTC".to_string(),
        }
    }
}

/// Shared by input and output nodes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InputOutputConfig {
    pub label: String,
    /// text, json, file
    pub data_type: String,
}

impl Default for InputOutputConfig {
    fn default() -> Self {
        Self {
            label: String::new(),
            data_type: "text".to_string(),
        }
    }
}

// ═══════════════════════════════════════════════════════════════
// EXTERNAL-SERVICE INTEGRATIONS
// ═══════════════════════════════════════════════════════════════

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FirecrawlScrapeConfig {
    pub url: String,
    pub formats: Vec<String>,
    pub include_metadata: bool,
    pub credential_id: Option<String>,
}

impl Default for FirecrawlScrapeConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            formats: vec!["markdown".to_string()],
            include_metadata: true,
            credential_id: None,
        }
    }
}

/// MCP transport kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum McpServerType {
    #[default]
    Stdio,
    Sse,
    Http,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct McpServerConfig {
    pub server_name: String,
    pub server_url: String,
    pub server_type: McpServerType,
    pub instructions: String,
    pub credential_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HuggingFaceInferenceConfig {
    pub model_id: String,
    pub task: String,
    pub parameters: Map<String, Value>,
    pub input_key: String,
    pub credential_id: Option<String>,
}

impl Default for HuggingFaceInferenceConfig {
    fn default() -> Self {
        Self {
            model_id: String::new(),
            task: "text-generation".to_string(),
            parameters: Map::new(),
            input_key: "inputs".to_string(),
            credential_id: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApifyActorConfig {
    pub actor_id: String,
    pub input: Map<String, Value>,
    pub max_items: u32,
    pub timeout_secs: u64,
    pub credential_id: Option<String>,
}

impl Default for ApifyActorConfig {
    fn default() -> Self {
        Self {
            actor_id: String::new(),
            input: Map::new(),
            max_items: 100,
            timeout_secs: 300,
            credential_id: None,
        }
    }
}
