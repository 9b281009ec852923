//! External-service integration nodes
//!
//! Firecrawl, MCP, Hugging Face and Apify nodes all compile the same way:
//! the service's settings go into a descriptor whose provider key is the
//! service tag, and the credential id is carried through opaquely.

use serde::Serialize;
use serde_json::Value;

use super::missing_config;
use crate::ast::{Node, NodeConfig, NodeType};
use crate::compiler::{CompiledNode, CompiledNodes, CompiledPayload, NodeCompiler};
use crate::error::Result;
use crate::provider::ProviderDescriptor;

pub struct IntegrationCompiler {
    service: NodeType,
}

impl IntegrationCompiler {
    pub fn new(service: NodeType) -> Self {
        debug_assert!(service.is_integration());
        Self { service }
    }
}

/// Service settings as JSON, with the credential id split out
fn split_credential<T: Serialize>(cfg: &T) -> Result<(Value, Option<String>)> {
    let mut settings = serde_json::to_value(cfg)?;
    let credential_id = settings
        .as_object_mut()
        .and_then(|map| map.remove("credential_id"))
        .and_then(|v| v.as_str().map(str::to_string));
    Ok((settings, credential_id))
}

impl NodeCompiler for IntegrationCompiler {
    fn node_type(&self) -> NodeType {
        self.service
    }

    fn compile(&self, node: &Node, _prior: &CompiledNodes) -> Result<CompiledNode> {
        let (settings, credential_id, instructions) = match (self.service, &node.config) {
            (NodeType::FirecrawlScrape, Some(NodeConfig::FirecrawlScrape(cfg))) => {
                let (s, c) = split_credential(cfg)?;
                (s, c, String::new())
            }
            (NodeType::McpServer, Some(NodeConfig::McpServer(cfg))) => {
                let (s, c) = split_credential(cfg)?;
                (s, c, cfg.instructions.clone())
            }
            (NodeType::HuggingfaceInference, Some(NodeConfig::HuggingfaceInference(cfg))) => {
                let (s, c) = split_credential(cfg)?;
                (s, c, String::new())
            }
            (NodeType::ApifyActor, Some(NodeConfig::ApifyActor(cfg))) => {
                let (s, c) = split_credential(cfg)?;
                (s, c, String::new())
            }
            _ => return Err(missing_config(node)),
        };

        let mut descriptor = ProviderDescriptor::new(self.service.as_str(), "")
            .with_instructions(instructions)
            .with_settings(settings);
        descriptor.credential_id = credential_id;

        Ok(CompiledNode::new(
            &node.id,
            self.service,
            CompiledPayload::Integration {
                service: self.service,
                descriptor,
            },
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{ApifyActorConfig, FirecrawlScrapeConfig, McpServerConfig};

    #[test]
    fn test_firecrawl_descriptor() {
        let node = Node::new("scrape", NodeType::FirecrawlScrape).with_config(
            NodeConfig::FirecrawlScrape(FirecrawlScrapeConfig {
                url: "https://example.com".into(),
                credential_id: Some("cred-42".into()),
                ..Default::default()
            }),
        );

        let compiled = IntegrationCompiler::new(NodeType::FirecrawlScrape)
            .compile(&node, &CompiledNodes::new())
            .unwrap();
        let d = compiled.descriptor().unwrap();

        assert_eq!(d.provider, "firecrawl_scrape");
        assert_eq!(d.credential_id.as_deref(), Some("cred-42"));
        assert_eq!(d.settings["url"], "https://example.com");
        assert_eq!(d.settings["formats"][0], "markdown");
        assert!(d.settings.get("credential_id").is_none());
    }

    #[test]
    fn test_mcp_carries_instructions() {
        let node = Node::new("mcp", NodeType::McpServer).with_config(NodeConfig::McpServer(
            McpServerConfig {
                server_name: "files".into(),
                instructions: "List the repo".into(),
                ..Default::default()
            },
        ));
        let compiled = IntegrationCompiler::new(NodeType::McpServer)
            .compile(&node, &CompiledNodes::new())
            .unwrap();
        assert_eq!(compiled.descriptor().unwrap().instructions, "List the repo");
        assert_eq!(compiled.descriptor().unwrap().settings["server_type"], "stdio");
    }

    #[test]
    fn test_mismatched_config_is_missing() {
        let node = Node::new("actor", NodeType::ApifyActor).with_config(NodeConfig::McpServer(
            McpServerConfig::default(),
        ));
        let err = IntegrationCompiler::new(NodeType::ApifyActor)
            .compile(&node, &CompiledNodes::new())
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "[AF-030] Node 'actor' missing apify_actor configuration"
        );
    }

    #[test]
    fn test_apify_settings() {
        let node = Node::new("actor", NodeType::ApifyActor).with_config(NodeConfig::ApifyActor(
            ApifyActorConfig {
                actor_id: "apify/web-scraper".into(),
                max_items: 50,
                ..Default::default()
            },
        ));
        let compiled = IntegrationCompiler::new(NodeType::ApifyActor)
            .compile(&node, &CompiledNodes::new())
            .unwrap();
        match compiled.payload {
            CompiledPayload::Integration {
                service,
                descriptor,
            } => {
                assert_eq!(service, NodeType::ApifyActor);
                assert_eq!(descriptor.settings["max_items"], 50);
            }
            other => panic!("unexpected payload {other:?}"),
        }
    }
}
