//! Knowledge-base (RAG) nodes
//!
//! A missing database URL does not fail compilation: the payload records why
//! the backend is unavailable and the engine emits a placeholder instead.

use super::missing_config;
use crate::ast::{Node, NodeConfig, NodeType};
use crate::compiler::{CompiledNode, CompiledNodes, CompiledPayload, KnowledgeBackend, NodeCompiler};
use crate::error::Result;
use crate::provider::RetrievalSettings;

const PGVECTOR_TABLE: &str = "kb_embeddings";

pub struct KnowledgeBaseCompiler {
    database_url: Option<String>,
}

impl KnowledgeBaseCompiler {
    pub fn new(database_url: Option<String>) -> Self {
        Self { database_url }
    }
}

impl NodeCompiler for KnowledgeBaseCompiler {
    fn node_type(&self) -> NodeType {
        NodeType::KnowledgeBase
    }

    fn compile(&self, node: &Node, _prior: &CompiledNodes) -> Result<CompiledNode> {
        let Some(NodeConfig::KnowledgeBase(cfg)) = &node.config else {
            return Err(missing_config(node));
        };

        let settings = RetrievalSettings {
            collection: node.id.clone(),
            kb_type: cfg.kb_type.clone(),
            sources: cfg.sources.clone(),
            chunk_size: cfg.chunk_size,
            chunk_overlap: cfg.chunk_overlap,
        };

        let (backend, unavailable) = if cfg.sources.is_empty() {
            (None, None)
        } else {
            match cfg.vector_db.as_str() {
                "pgvector" => match self.database_url.as_deref().filter(|u| !u.is_empty()) {
                    Some(url) => (
                        Some(KnowledgeBackend::PgVector {
                            table_name: PGVECTOR_TABLE.to_string(),
                            database_url: url.to_string(),
                        }),
                        None,
                    ),
                    None => (
                        None,
                        Some("DATABASE_URL not set - cannot initialise PgVector".to_string()),
                    ),
                },
                "memory" | "in_memory" => (Some(KnowledgeBackend::InMemory), None),
                other => (None, Some(format!("Unsupported vector database: {}", other))),
            }
        };

        if let Some(reason) = &unavailable {
            tracing::warn!(node_id = %node.id, reason = %reason, "knowledge base backend unavailable");
        }

        Ok(CompiledNode::new(
            &node.id,
            NodeType::KnowledgeBase,
            CompiledPayload::KnowledgeBase {
                settings,
                backend,
                unavailable,
            },
        ))
    }
}
