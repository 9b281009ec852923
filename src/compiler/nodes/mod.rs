//! Built-in node compilers

mod agent;
mod conditional;
mod integration;
mod io;
mod knowledge_base;
mod web_search;

pub use agent::AgentCompiler;
pub use conditional::ConditionalCompiler;
pub use integration::IntegrationCompiler;
pub use io::{InputCompiler, OutputCompiler};
pub use knowledge_base::KnowledgeBaseCompiler;
pub use web_search::WebSearchCompiler;

use crate::ast::Node;
use crate::error::FlowError;

fn missing_config(node: &Node) -> FlowError {
    FlowError::MissingConfiguration {
        node_id: node.id.clone(),
        node_type: node.node_type.to_string(),
    }
}
