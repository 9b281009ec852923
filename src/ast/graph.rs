//! Graph definition - the caller-supplied flow (nodes + edges)

use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::node::{NodeConfig, NodeType};
use crate::error::Result;

/// Top-level flow definition, as produced by the canvas
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphDefinition {
    pub id: String,
    #[serde(default = "default_flow_name")]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub nodes: Vec<Node>,
    #[serde(default)]
    pub edges: Vec<Edge>,
    #[serde(default)]
    pub metadata: FlowMetadata,
}

fn default_flow_name() -> String {
    "Untitled Flow".to_string()
}

impl GraphDefinition {
    /// Parse from JSON text
    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Parse from YAML text
    pub fn from_yaml(text: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(text)?)
    }

    /// Load from a file; `.yaml`/`.yml` are parsed as YAML, everything else as JSON
    pub async fn load(path: &Path) -> Result<Self> {
        let text = tokio::fs::read_to_string(path).await?;
        match path.extension().and_then(|e| e.to_str()) {
            Some("yaml") | Some("yml") => Self::from_yaml(&text),
            _ => Self::from_json(&text),
        }
    }

    /// Find a node by id
    pub fn node(&self, id: &str) -> Option<&Node> {
        self.nodes.iter().find(|n| n.id == id)
    }
}

/// A single node in the flow graph
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id: String,
    #[serde(rename = "type")]
    pub node_type: NodeType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config: Option<NodeConfig>,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub position: NodePosition,
}

impl Node {
    /// Build a node with no configuration
    pub fn new(id: impl Into<String>, node_type: NodeType) -> Self {
        Self {
            id: id.into(),
            node_type,
            config: None,
            label: String::new(),
            position: NodePosition::default(),
        }
    }

    /// Attach a configuration variant
    pub fn with_config(mut self, config: NodeConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Set the display label
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }
}

/// Canvas coordinates (opaque to the compiler)
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct NodePosition {
    #[serde(default)]
    pub x: f64,
    #[serde(default)]
    pub y: f64,
}

/// A directed edge between two nodes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edge {
    pub id: String,
    pub source: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_handle: Option<String>,
    pub target: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_handle: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl Edge {
    pub fn new(id: impl Into<String>, source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            source: source.into(),
            source_handle: None,
            target: target.into(),
            target_handle: None,
            label: None,
        }
    }

    /// Set the branch selector on the source side (e.g. "true"/"false")
    pub fn with_source_handle(mut self, handle: impl Into<String>) -> Self {
        self.source_handle = Some(handle.into());
        self
    }
}

/// Metadata attached to a flow definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlowMetadata {
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
    #[serde(default = "Utc::now")]
    pub updated_at: DateTime<Utc>,
    #[serde(default = "default_version")]
    pub version: String,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

fn default_version() -> String {
    "1.0.0".to_string()
}

impl Default for FlowMetadata {
    fn default() -> Self {
        let now = Utc::now();
        Self {
            created_at: now,
            updated_at: now,
            version: default_version(),
            author: None,
            tags: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::node::InputOutputConfig;
    use serde_json::json;

    #[test]
    fn parses_canvas_json() {
        let graph: GraphDefinition = serde_json::from_value(json!({
            "id": "flow-1",
            "nodes": [
                {"id": "in", "type": "input", "config": {"input_output": {"label": "hi"}}},
                {"id": "out", "type": "output"}
            ],
            "edges": [
                {"id": "e1", "source": "in", "target": "out"}
            ]
        }))
        .unwrap();

        assert_eq!(graph.name, "Untitled Flow");
        assert_eq!(graph.nodes.len(), 2);
        assert_eq!(graph.nodes[1].config, None);
        assert_eq!(graph.edges[0].source_handle, None);
        assert_eq!(graph.metadata.version, "1.0.0");
        match &graph.nodes[0].config {
            Some(NodeConfig::InputOutput(io)) => assert_eq!(io.label, "hi"),
            other => panic!("unexpected config {:?}", other),
        }
    }

    #[test]
    fn parses_yaml() {
        let yaml = r#"
id: flow-yaml
name: Branching
nodes:
  - id: cond
    type: conditional
    config:
      conditional:
        condition_expression: "mentions rain"
  - id: yes
    type: output
edges:
  - id: e1
    source: cond
    source_handle: "true"
    target: yes
"#;
        let graph = GraphDefinition::from_yaml(yaml).unwrap();
        assert_eq!(graph.name, "Branching");
        assert_eq!(graph.edges[0].source_handle.as_deref(), Some("true"));
    }

    #[test]
    fn unknown_node_type_is_parse_error() {
        let err = GraphDefinition::from_json(
            r#"{"id":"f","nodes":[{"id":"x","type":"teleporter"}],"edges":[]}"#,
        )
        .unwrap_err();
        assert_eq!(err.code(), "AF-001");
    }

    #[test]
    fn builder_helpers() {
        let node = Node::new("in", NodeType::Input)
            .with_label("Question")
            .with_config(NodeConfig::InputOutput(InputOutputConfig::default()));
        assert_eq!(node.label, "Question");
        assert!(node.config.is_some());

        let edge = Edge::new("e1", "cond", "out").with_source_handle("false");
        assert_eq!(edge.source_handle.as_deref(), Some("false"));
    }

    #[tokio::test]
    async fn load_picks_format_from_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("flow.yaml");
        tokio::fs::write(&path, "id: f\nnodes:\n  - id: a\n    type: input\n")
            .await
            .unwrap();

        let graph = GraphDefinition::load(&path).await.unwrap();
        assert_eq!(graph.id, "f");
        assert!(graph.node("a").is_some());
        assert!(graph.node("b").is_none());
    }
}
