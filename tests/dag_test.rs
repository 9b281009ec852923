//! DAG Integration Tests
//!
//! Ordering, cycle detection and structural validation on generated graphs.

use agnoflow::ast::{Edge, GraphDefinition, Node, NodeType};
use agnoflow::dag::{FlowGraph, FlowValidator, TopologicalSorter};
use agnoflow::FlowError;
use proptest::prelude::*;

fn graph(nodes: Vec<Node>, edges: Vec<Edge>) -> GraphDefinition {
    GraphDefinition {
        id: "g".into(),
        name: "g".into(),
        description: String::new(),
        nodes,
        edges,
        metadata: Default::default(),
    }
}

/// Nodes `n0..n{count}` declared in `declared` order, with `pairs` turned
/// into forward edges (lower index -> higher index), so the graph is acyclic.
fn forward_graph(declared: &[usize], pairs: &[(usize, usize)]) -> GraphDefinition {
    let nodes = declared
        .iter()
        .map(|i| Node::new(format!("n{i}"), NodeType::Agent))
        .collect();
    let edges = pairs
        .iter()
        .filter(|(a, b)| a != b)
        .enumerate()
        .map(|(k, (a, b))| {
            let (from, to) = if a < b { (a, b) } else { (b, a) };
            Edge::new(format!("e{k}"), format!("n{from}"), format!("n{to}"))
        })
        .collect();
    graph(nodes, edges)
}

fn dag_strategy() -> impl Strategy<Value = (Vec<usize>, Vec<(usize, usize)>)> {
    (1usize..12).prop_flat_map(|n| {
        (
            Just((0..n).collect::<Vec<_>>()).prop_shuffle(),
            prop::collection::vec((0..n, 0..n), 0..30),
        )
    })
}

proptest! {
    #[test]
    fn prop_order_is_a_topological_permutation((declared, pairs) in dag_strategy()) {
        let g = forward_graph(&declared, &pairs);
        let order = TopologicalSorter::sort(&g).unwrap();

        prop_assert_eq!(order.len(), g.nodes.len());
        let position = |id: &str| order.iter().position(|o| o == id).unwrap();
        for edge in &g.edges {
            prop_assert!(position(&edge.source) < position(&edge.target));
        }
    }

    #[test]
    fn prop_back_edge_creates_cycle((declared, pairs) in dag_strategy()) {
        let mut g = forward_graph(&declared, &pairs);
        let Some(first) = g.edges.first().cloned() else {
            return Ok(());
        };
        g.edges.push(Edge::new("back", first.target.clone(), first.source.clone()));

        match TopologicalSorter::sort(&g) {
            Err(FlowError::CycleDetected { nodes }) => {
                prop_assert!(nodes.contains(&first.source));
                prop_assert!(nodes.contains(&first.target));
            }
            other => prop_assert!(false, "expected a cycle, got {:?}", other),
        }
    }

    #[test]
    fn prop_sort_is_deterministic((declared, pairs) in dag_strategy()) {
        let g = forward_graph(&declared, &pairs);
        prop_assert_eq!(TopologicalSorter::sort(&g).unwrap(), TopologicalSorter::sort(&g).unwrap());
    }
}

#[test]
fn test_independent_nodes_keep_declaration_order() {
    let g = graph(
        vec![
            Node::new("c", NodeType::Input),
            Node::new("a", NodeType::Input),
            Node::new("b", NodeType::Input),
        ],
        vec![],
    );
    assert_eq!(TopologicalSorter::sort(&g).unwrap(), vec!["c", "a", "b"]);
}

#[test]
fn test_self_loop_is_cycle() {
    let g = graph(
        vec![Node::new("a", NodeType::Agent)],
        vec![Edge::new("e1", "a", "a")],
    );
    assert!(matches!(
        TopologicalSorter::sort(&g),
        Err(FlowError::CycleDetected { .. })
    ));
}

#[test]
fn test_cycle_lists_only_unplaced_nodes() {
    let g = graph(
        vec![
            Node::new("in", NodeType::Input),
            Node::new("x", NodeType::Agent),
            Node::new("y", NodeType::Agent),
            Node::new("z", NodeType::Agent),
        ],
        vec![
            Edge::new("e1", "in", "x"),
            Edge::new("e2", "x", "y"),
            Edge::new("e3", "y", "x"),
            Edge::new("e4", "y", "z"),
        ],
    );
    match TopologicalSorter::sort(&g) {
        Err(FlowError::CycleDetected { nodes }) => assert_eq!(nodes, vec!["x", "y", "z"]),
        other => panic!("expected a cycle, got {other:?}"),
    }
}

#[test]
fn test_flow_graph_queries() {
    let g = graph(
        vec![
            Node::new("in", NodeType::Input),
            Node::new("mid", NodeType::Agent),
            Node::new("out", NodeType::Output),
        ],
        vec![Edge::new("e1", "in", "mid"), Edge::new("e2", "mid", "out")],
    );
    let flow = FlowGraph::from_graph(&g);

    assert!(flow.has_path("in", "out"));
    assert!(!flow.has_path("out", "in"));
    assert_eq!(flow.get_final_nodes().len(), 1);
    assert!(FlowValidator::validate(&g).is_empty());
}
