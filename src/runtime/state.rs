//! Per-run state: outputs, skipped nodes, branch decisions
//!
//! Created inside each `execute` call and dropped with the stream.

use rustc_hash::{FxHashMap, FxHashSet};

use crate::ast::Edge;
use crate::compiler::ExecutionPlan;

#[derive(Debug, Default)]
pub struct RunState {
    outputs: FxHashMap<String, String>,
    skipped: FxHashSet<String>,
    /// conditional node id -> "true" / "false"
    decisions: FxHashMap<String, String>,
}

impl RunState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_output(&mut self, node_id: &str, output: String) {
        self.outputs.insert(node_id.to_string(), output);
    }

    pub fn output(&self, node_id: &str) -> Option<&str> {
        self.outputs.get(node_id).map(String::as_str)
    }

    pub fn mark_skipped(&mut self, node_id: &str) {
        self.skipped.insert(node_id.to_string());
    }

    pub fn is_skipped(&self, node_id: &str) -> bool {
        self.skipped.contains(node_id)
    }

    pub fn record_decision(&mut self, node_id: &str, branch: &str) {
        self.decisions
            .insert(node_id.to_string(), branch.to_string());
    }

    pub fn decision(&self, node_id: &str) -> Option<&str> {
        self.decisions.get(node_id).map(String::as_str)
    }

    /// An edge is dead when its source was skipped, or its source decided a
    /// branch and the edge's handle names the other one.
    fn is_dead(&self, edge: &Edge) -> bool {
        if self.is_skipped(&edge.source) {
            return true;
        }
        match (self.decision(&edge.source), edge.source_handle.as_deref()) {
            (Some(decision), Some(handle)) => decision != handle,
            _ => false,
        }
    }

    /// Skip iff the node has incoming edges and every one of them is dead.
    /// Roots always run.
    pub fn should_skip(&self, plan: &ExecutionPlan, node_id: &str) -> bool {
        let mut incoming = plan.incoming(node_id).peekable();
        if incoming.peek().is_none() {
            return false;
        }
        incoming.all(|edge| self.is_dead(edge))
    }

    /// Combine the recorded outputs of upstream nodes, in edge order
    ///
    /// One upstream output is returned verbatim; several are labelled
    /// `[Input from {id}]:` and separated by blank lines; none gives "".
    pub fn aggregate_upstream(&self, plan: &ExecutionPlan, node_id: &str) -> String {
        let parts: Vec<(&str, &str)> = plan
            .incoming(node_id)
            .filter_map(|edge| {
                self.output(&edge.source)
                    .map(|out| (edge.source.as_str(), out))
            })
            .collect();

        match parts.as_slice() {
            [] => String::new(),
            [(_, only)] => (*only).to_string(),
            many => many
                .iter()
                .map(|(id, out)| format!("[Input from {}]:\n{}", id, out))
                .collect::<Vec<_>>()
                .join("\n\n"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn plan(edges: Vec<Edge>) -> ExecutionPlan {
        ExecutionPlan {
            flow_id: "f".into(),
            flow_name: "f".into(),
            nodes: BTreeMap::new(),
            adjacency: BTreeMap::new(),
            edges,
            execution_order: Vec::new(),
        }
    }

    #[test]
    fn test_roots_never_skip() {
        let p = plan(vec![]);
        assert!(!RunState::new().should_skip(&p, "root"));
    }

    #[test]
    fn test_branch_handles() {
        let p = plan(vec![
            Edge::new("e1", "cond", "yes").with_source_handle("true"),
            Edge::new("e2", "cond", "no").with_source_handle("false"),
            Edge::new("e3", "cond", "always"),
        ]);
        let mut state = RunState::new();
        state.record_decision("cond", "true");

        assert!(!state.should_skip(&p, "yes"));
        assert!(state.should_skip(&p, "no"));
        // no handle: live regardless of the decision
        assert!(!state.should_skip(&p, "always"));
    }

    #[test]
    fn test_skip_cascades_and_or_semantics() {
        let p = plan(vec![
            Edge::new("e1", "skipped", "child"),
            Edge::new("e2", "skipped", "join"),
            Edge::new("e3", "alive", "join"),
        ]);
        let mut state = RunState::new();
        state.mark_skipped("skipped");
        state.record_output("alive", "ok".into());

        assert!(state.should_skip(&p, "child"));
        // one live edge is enough
        assert!(!state.should_skip(&p, "join"));
        assert_eq!(state.aggregate_upstream(&p, "join"), "ok");
    }

    #[test]
    fn test_aggregate_single_is_verbatim() {
        let p = plan(vec![Edge::new("e1", "a", "b")]);
        let mut state = RunState::new();
        state.record_output("a", "X".into());
        assert_eq!(state.aggregate_upstream(&p, "b"), "X");
    }

    #[test]
    fn test_aggregate_many_labels_in_edge_order() {
        let p = plan(vec![Edge::new("e1", "n2", "c"), Edge::new("e2", "n1", "c")]);
        let mut state = RunState::new();
        state.record_output("n1", "one".into());
        state.record_output("n2", "two".into());

        assert_eq!(
            state.aggregate_upstream(&p, "c"),
            "[Input from n2]:\ntwo\n\n[Input from n1]:\none"
        );
    }

    #[test]
    fn test_aggregate_none_is_empty() {
        let p = plan(vec![Edge::new("e1", "a", "b")]);
        assert_eq!(RunState::new().aggregate_upstream(&p, "b"), "");
        assert_eq!(RunState::new().aggregate_upstream(&p, "a"), "");
    }
}
