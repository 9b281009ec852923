//! Input and output nodes

use crate::ast::{InputOutputConfig, Node, NodeConfig, NodeType};
use crate::compiler::{CompiledNode, CompiledNodes, CompiledPayload, NodeCompiler};
use crate::error::Result;

fn io_config(node: &Node) -> InputOutputConfig {
    match &node.config {
        Some(NodeConfig::InputOutput(io)) => io.clone(),
        _ => InputOutputConfig::default(),
    }
}

/// Entry point; its label doubles as the default value
pub struct InputCompiler;

impl NodeCompiler for InputCompiler {
    fn node_type(&self) -> NodeType {
        NodeType::Input
    }

    fn compile(&self, node: &Node, _prior: &CompiledNodes) -> Result<CompiledNode> {
        let io = io_config(node);
        Ok(CompiledNode::new(
            &node.id,
            NodeType::Input,
            CompiledPayload::Input {
                default_value: io.label,
                data_type: io.data_type,
            },
        ))
    }
}

pub struct OutputCompiler;

impl NodeCompiler for OutputCompiler {
    fn node_type(&self) -> NodeType {
        NodeType::Output
    }

    fn compile(&self, node: &Node, _prior: &CompiledNodes) -> Result<CompiledNode> {
        Ok(CompiledNode::new(
            &node.id,
            NodeType::Output,
            CompiledPayload::Output {
                display_format: io_config(node).data_type,
            },
        ))
    }
}
