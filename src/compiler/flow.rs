//! FlowCompiler - validate, order, compile
//!
//! Either every node compiles and a full plan comes back, or the first
//! problem is returned and nothing else is.

use std::collections::BTreeMap;

use serde_json::Value;
use tracing::{debug, info, instrument};

use super::plan::{CompiledNode, CompiledNodes, CompiledPayload, ExecutionPlan};
use super::registry::NodeCompilerRegistry;
use crate::ast::{GraphDefinition, Node};
use crate::config::AgnoflowConfig;
use crate::dag::{FlowGraph, FlowValidator};
use crate::error::{FlowError, Result};

pub struct FlowCompiler {
    registry: NodeCompilerRegistry,
}

impl FlowCompiler {
    pub fn new(registry: NodeCompilerRegistry) -> Self {
        Self { registry }
    }

    /// Compiler with every built-in node compiler registered
    pub fn with_defaults(config: &AgnoflowConfig) -> Self {
        Self::new(NodeCompilerRegistry::with_defaults(config))
    }

    pub fn registry(&self) -> &NodeCompilerRegistry {
        &self.registry
    }

    #[instrument(skip_all, fields(flow_id = %graph.id, nodes = graph.nodes.len()))]
    pub fn compile(&self, graph: &GraphDefinition) -> Result<ExecutionPlan> {
        // 1. Structure
        let errors = FlowValidator::validate(graph);
        if !errors.is_empty() {
            debug!(count = errors.len(), "flow validation failed");
            return Err(FlowError::ValidationFailed { errors });
        }

        // 2. Adjacency + 3. order
        let flow_graph = FlowGraph::from_graph(graph);
        let order = flow_graph.topological_order()?;

        // 4. Per-node compilation in execution order
        let nodes_by_id: BTreeMap<&str, &Node> =
            graph.nodes.iter().map(|n| (n.id.as_str(), n)).collect();
        let mut compiled = CompiledNodes::new();

        for node_id in &order {
            let Some(node) = nodes_by_id.get(node_id.as_ref()) else {
                continue;
            };
            let compiled_node = self.compile_node(node, &compiled)?;
            compiled.insert(node.id.clone(), compiled_node);
        }

        // 5. Assemble
        let execution_order: Vec<String> = order.iter().map(|id| id.to_string()).collect();
        let adjacency = flow_graph.adjacency_map().into_iter().collect();

        info!(nodes = compiled.len(), "flow compiled");

        Ok(ExecutionPlan {
            flow_id: graph.id.clone(),
            flow_name: graph.name.clone(),
            nodes: compiled,
            adjacency,
            edges: graph.edges.clone(),
            execution_order,
        })
    }

    fn compile_node(&self, node: &Node, prior: &CompiledNodes) -> Result<CompiledNode> {
        match self.registry.get(node.node_type) {
            Some(compiler) => compiler.compile(node, prior),
            None => {
                debug!(node_id = %node.id, node_type = %node.node_type, "no compiler registered, passing through");
                let config = match &node.config {
                    Some(cfg) => serde_json::to_value(cfg)?,
                    None => Value::Null,
                };
                Ok(CompiledNode::new(
                    &node.id,
                    node.node_type,
                    CompiledPayload::Raw { config },
                ))
            }
        }
    }
}
