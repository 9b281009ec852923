//! AST module - flow definition types
//!
//! - `graph`: GraphDefinition, Node, Edge, FlowMetadata
//! - `node`: NodeType and the per-type NodeConfig sum type

mod graph;
mod node;

pub use graph::{Edge, FlowMetadata, GraphDefinition, Node, NodePosition};
pub use node::{
    AgentConfig, AgentProvider, ApifyActorConfig, ConditionalConfig, FirecrawlScrapeConfig,
    HuggingFaceInferenceConfig, InputOutputConfig, KnowledgeBaseConfig, LoopConfig,
    McpServerConfig, McpServerType, NodeConfig, NodeType, PromptConfig, ScheduleConfig,
    TeamConfig, TeamMode, ToolConfig, WebhookConfig,
};
