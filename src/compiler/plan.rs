//! Compiled output: per-node payloads and the execution plan

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::ast::{Edge, NodeType};
use crate::provider::{ProviderDescriptor, RetrievalSettings};

/// Nodes compiled so far, visible to later compilers
pub type CompiledNodes = BTreeMap<String, CompiledNode>;

/// One node after its type's compiler ran
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompiledNode {
    pub node_id: String,
    pub node_type: NodeType,
    pub payload: CompiledPayload,
}

impl CompiledNode {
    pub fn new(node_id: impl Into<String>, node_type: NodeType, payload: CompiledPayload) -> Self {
        Self {
            node_id: node_id.into(),
            node_type,
            payload,
        }
    }

    /// Descriptor the engine hands to a provider, if this payload has one
    pub fn descriptor(&self) -> Option<&ProviderDescriptor> {
        match &self.payload {
            CompiledPayload::Agent { descriptor }
            | CompiledPayload::WebSearch { descriptor, .. }
            | CompiledPayload::Integration { descriptor, .. } => Some(descriptor),
            _ => None,
        }
    }
}

/// Type-specific compiled data
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CompiledPayload {
    Input {
        default_value: String,
        data_type: String,
    },
    Output {
        display_format: String,
    },
    Agent {
        descriptor: ProviderDescriptor,
    },
    WebSearch {
        descriptor: ProviderDescriptor,
        result_count: u64,
    },
    Conditional {
        condition: String,
        true_label: String,
        false_label: String,
    },
    KnowledgeBase {
        settings: RetrievalSettings,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        backend: Option<KnowledgeBackend>,
        /// Why no backend could be built (non-fatal)
        #[serde(default, skip_serializing_if = "Option::is_none")]
        unavailable: Option<String>,
    },
    Integration {
        service: NodeType,
        descriptor: ProviderDescriptor,
    },
    /// Unregistered node type, carried through untouched
    Raw {
        #[serde(default)]
        config: Value,
    },
}

/// Where a knowledge base stores its vectors
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "store", rename_all = "snake_case")]
pub enum KnowledgeBackend {
    PgVector {
        table_name: String,
        /// Connection string; never serialized
        #[serde(skip)]
        database_url: String,
    },
    InMemory,
}

impl KnowledgeBackend {
    /// Store tag, as serialized
    pub fn store_name(&self) -> &'static str {
        match self {
            Self::PgVector { .. } => "pg_vector",
            Self::InMemory => "in_memory",
        }
    }
}

/// Validated, ordered, compiled flow ready for the engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionPlan {
    pub flow_id: String,
    pub flow_name: String,
    pub nodes: BTreeMap<String, CompiledNode>,
    /// source -> targets, in edge order
    pub adjacency: BTreeMap<String, Vec<String>>,
    pub edges: Vec<Edge>,
    pub execution_order: Vec<String>,
}

impl ExecutionPlan {
    pub fn node(&self, node_id: &str) -> Option<&CompiledNode> {
        self.nodes.get(node_id)
    }

    /// Edges whose target is `node_id`, in declaration order
    pub fn incoming(&self, node_id: &str) -> impl Iterator<Item = &Edge> + '_ {
        let node_id = node_id.to_string();
        self.edges.iter().filter(move |e| e.target == node_id)
    }

    /// Position of `node_id` in `execution_order`
    pub fn position(&self, node_id: &str) -> Option<usize> {
        self.execution_order.iter().position(|id| id == node_id)
    }

    pub fn to_json_pretty(&self) -> crate::error::Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
