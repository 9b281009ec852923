//! Node compiler trait and the type -> compiler registry

use std::sync::Arc;

use rustc_hash::FxHashMap;

use super::nodes::{
    AgentCompiler, ConditionalCompiler, InputCompiler, IntegrationCompiler,
    KnowledgeBaseCompiler, OutputCompiler, WebSearchCompiler,
};
use super::plan::{CompiledNode, CompiledNodes};
use crate::ast::{Node, NodeType};
use crate::config::AgnoflowConfig;
use crate::error::Result;

/// Turns one node into its compiled payload
///
/// `prior` holds every node compiled earlier in execution order.
pub trait NodeCompiler: Send + Sync {
    fn node_type(&self) -> NodeType;
    fn compile(&self, node: &Node, prior: &CompiledNodes) -> Result<CompiledNode>;
}

/// Immutable map from node type to compiler
#[derive(Clone, Default)]
pub struct NodeCompilerRegistry {
    compilers: FxHashMap<NodeType, Arc<dyn NodeCompiler>>,
}

impl NodeCompilerRegistry {
    /// Empty registry: every node compiles to a raw passthrough
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with every built-in compiler
    pub fn with_defaults(config: &AgnoflowConfig) -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(InputCompiler));
        registry.register(Arc::new(OutputCompiler));
        registry.register(Arc::new(AgentCompiler));
        registry.register(Arc::new(WebSearchCompiler));
        registry.register(Arc::new(ConditionalCompiler));
        registry.register(Arc::new(KnowledgeBaseCompiler::new(
            config.database_url().map(str::to_string),
        )));
        for service in [
            NodeType::FirecrawlScrape,
            NodeType::McpServer,
            NodeType::HuggingfaceInference,
            NodeType::ApifyActor,
        ] {
            registry.register(Arc::new(IntegrationCompiler::new(service)));
        }
        registry
    }

    /// Register under the compiler's own type, replacing any previous one
    pub fn register(&mut self, compiler: Arc<dyn NodeCompiler>) {
        self.compilers.insert(compiler.node_type(), compiler);
    }

    pub fn get(&self, node_type: NodeType) -> Option<&Arc<dyn NodeCompiler>> {
        self.compilers.get(&node_type)
    }

    pub fn contains(&self, node_type: NodeType) -> bool {
        self.compilers.contains_key(&node_type)
    }

    pub fn len(&self) -> usize {
        self.compilers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.compilers.is_empty()
    }
}
