//! Structural validation of a graph definition
//!
//! Accumulates every problem instead of stopping at the first one.
//! Cycles are not checked here; ordering reports them.

use rustc_hash::FxHashSet;

use crate::ast::GraphDefinition;

/// Checks node presence, id uniqueness and edge endpoints
pub struct FlowValidator;

impl FlowValidator {
    /// Return all structural problems; empty means valid
    pub fn validate(graph: &GraphDefinition) -> Vec<String> {
        let mut errors = Vec::new();

        if graph.nodes.is_empty() {
            errors.push("Flow must have at least one node.".to_string());
        }

        let mut node_ids: FxHashSet<&str> = FxHashSet::default();
        for node in &graph.nodes {
            if !node_ids.insert(node.id.as_str()) {
                errors.push(format!("Duplicate node id: {}", node.id));
            }
        }

        for edge in &graph.edges {
            if !node_ids.contains(edge.source.as_str()) {
                errors.push(format!(
                    "Edge {} references unknown source: {}",
                    edge.id, edge.source
                ));
            }
            if !node_ids.contains(edge.target.as_str()) {
                errors.push(format!(
                    "Edge {} references unknown target: {}",
                    edge.id, edge.target
                ));
            }
        }

        errors
    }
}
