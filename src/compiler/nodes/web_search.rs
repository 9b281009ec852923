//! Tool nodes (web search)

use serde_json::json;

use crate::ast::{Node, NodeConfig, NodeType};
use crate::compiler::{CompiledNode, CompiledNodes, CompiledPayload, NodeCompiler};
use crate::error::Result;
use crate::provider::ProviderDescriptor;
use crate::util::WEB_SEARCH_MODEL;

const DEFAULT_RESULT_COUNT: u64 = 5;
const WEB_SEARCH_INSTRUCTIONS: &str = "Search the web and return relevant results.";

pub struct WebSearchCompiler;

impl NodeCompiler for WebSearchCompiler {
    fn node_type(&self) -> NodeType {
        NodeType::Tool
    }

    fn compile(&self, node: &Node, _prior: &CompiledNodes) -> Result<CompiledNode> {
        let result_count = match &node.config {
            Some(NodeConfig::Tool(tool)) => tool
                .parameters
                .get("result_count")
                .and_then(|v| v.as_u64())
                .unwrap_or(DEFAULT_RESULT_COUNT),
            _ => DEFAULT_RESULT_COUNT,
        };

        let mut descriptor = ProviderDescriptor::new("openai", WEB_SEARCH_MODEL)
            .with_instructions(WEB_SEARCH_INSTRUCTIONS)
            .with_tools(vec!["web_search".to_string()])
            .with_settings(json!({ "result_count": result_count }));
        descriptor.markdown = true;

        Ok(CompiledNode::new(
            &node.id,
            NodeType::Tool,
            CompiledPayload::WebSearch {
                descriptor,
                result_count,
            },
        ))
    }
}
