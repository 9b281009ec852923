//! LLM agent nodes

use serde_json::json;

use super::missing_config;
use crate::ast::{Node, NodeConfig, NodeType};
use crate::compiler::{CompiledNode, CompiledNodes, CompiledPayload, NodeCompiler};
use crate::error::{FlowError, Result};
use crate::provider::ProviderDescriptor;

pub struct AgentCompiler;

impl NodeCompiler for AgentCompiler {
    fn node_type(&self) -> NodeType {
        NodeType::Agent
    }

    fn compile(&self, node: &Node, _prior: &CompiledNodes) -> Result<CompiledNode> {
        let Some(NodeConfig::Agent(cfg)) = &node.config else {
            return Err(missing_config(node));
        };

        if !(0.0..=2.0).contains(&cfg.temperature) {
            return Err(FlowError::InvalidNodeConfig {
                node_id: node.id.clone(),
                reason: format!("temperature {} outside 0.0..=2.0", cfg.temperature),
            });
        }

        // system prompt wins over the instruction list
        let instructions = if cfg.system_prompt.is_empty() {
            cfg.instructions.join("\n")
        } else {
            cfg.system_prompt.clone()
        };

        let descriptor = ProviderDescriptor {
            provider: cfg.provider.as_str().to_string(),
            model: cfg.model.clone(),
            instructions,
            temperature: Some(cfg.temperature),
            max_tokens: cfg.max_tokens,
            tools: cfg.tools.clone(),
            markdown: cfg.markdown,
            credential_id: None,
            settings: json!({
                "name": cfg.name,
                "show_tool_calls": cfg.show_tool_calls,
                "knowledge_bases": cfg.knowledge_bases,
            }),
        };

        tracing::debug!(node_id = %node.id, provider = %descriptor.provider, model = %descriptor.model, "compiled agent");

        Ok(CompiledNode::new(
            &node.id,
            NodeType::Agent,
            CompiledPayload::Agent { descriptor },
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{AgentConfig, AgentProvider};

    fn agent_node(cfg: AgentConfig) -> Node {
        Node::new("agent-1", NodeType::Agent).with_config(NodeConfig::Agent(cfg))
    }

    #[test]
    fn test_missing_config_is_error() {
        let err = AgentCompiler
            .compile(&Node::new("agent-1", NodeType::Agent), &CompiledNodes::new())
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "[AF-030] Node 'agent-1' missing agent configuration"
        );
    }

    #[test]
    fn test_system_prompt_wins_over_instructions() {
        let node = agent_node(AgentConfig {
            system_prompt: "Be terse".into(),
            instructions: vec!["ignored".into()],
            ..Default::default()
        });
        let compiled = AgentCompiler.compile(&node, &CompiledNodes::new()).unwrap();
        assert_eq!(compiled.descriptor().unwrap().instructions, "Be terse");
    }

    #[test]
    fn test_instruction_list_is_joined() {
        let node = agent_node(AgentConfig {
            provider: AgentProvider::Anthropic,
            model: "claude-sonnet".into(),
            instructions: vec!["Step one".into(), "Step two".into()],
            max_tokens: Some(256),
            ..Default::default()
        });
        let compiled = AgentCompiler.compile(&node, &CompiledNodes::new()).unwrap();
        let d = compiled.descriptor().unwrap();

        assert_eq!(d.provider, "anthropic");
        assert_eq!(d.instructions, "Step one\nStep two");
        assert_eq!(d.max_tokens, Some(256));
        assert!(d.markdown);
        assert_eq!(d.settings["name"], "Unnamed Agent");
    }

    #[test]
    fn test_temperature_out_of_range() {
        let node = agent_node(AgentConfig {
            temperature: 2.5,
            ..Default::default()
        });
        let err = AgentCompiler.compile(&node, &CompiledNodes::new()).unwrap_err();
        assert_eq!(err.code(), "AF-031");
    }
}
