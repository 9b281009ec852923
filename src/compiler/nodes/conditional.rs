//! Conditional (branching) nodes

use crate::ast::{Node, NodeConfig, NodeType};
use crate::compiler::{CompiledNode, CompiledNodes, CompiledPayload, NodeCompiler};
use crate::error::Result;

pub struct ConditionalCompiler;

impl NodeCompiler for ConditionalCompiler {
    fn node_type(&self) -> NodeType {
        NodeType::Conditional
    }

    fn compile(&self, node: &Node, _prior: &CompiledNodes) -> Result<CompiledNode> {
        let payload = match &node.config {
            Some(NodeConfig::Conditional(cfg)) => CompiledPayload::Conditional {
                condition: cfg.condition_expression.clone(),
                true_label: cfg.true_label.clone(),
                false_label: cfg.false_label.clone(),
            },
            _ => CompiledPayload::Conditional {
                condition: String::new(),
                true_label: "True".to_string(),
                false_label: "False".to_string(),
            },
        };

        Ok(CompiledNode::new(&node.id, NodeType::Conditional, payload))
    }
}
