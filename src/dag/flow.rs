//! FlowGraph - DAG structure built from graph edges
//!
//! - Arc<str> for zero-cost cloning of node IDs
//! - FxHashMap for faster hashing
//! - SmallVec for stack-allocated small dependency lists (0-4 items)
//!
//! Ordering uses Kahn's algorithm with a FIFO queue seeded in declaration
//! order, so equal-rank nodes keep the order the caller declared them in.

use std::collections::VecDeque;
use std::sync::Arc;

use rustc_hash::{FxHashMap, FxHashSet};
use smallvec::SmallVec;

use crate::ast::GraphDefinition;
use crate::error::{FlowError, Result};

/// Stack-allocated deps: most nodes have 0-4 neighbours
pub type DepVec = SmallVec<[Arc<str>; 4]>;

/// Graph of node dependencies built from edges
pub struct FlowGraph {
    /// node_id -> successor node_ids, in edge order
    adjacency: FxHashMap<Arc<str>, DepVec>,
    /// node_id -> predecessor node_ids, in edge order
    predecessors: FxHashMap<Arc<str>, DepVec>,
    /// All node IDs in declaration order
    node_ids: Vec<Arc<str>>,
}

impl FlowGraph {
    /// Build from a graph definition. Edges naming unknown nodes are ignored
    /// (the validator reports them before a graph reaches here).
    pub fn from_graph(graph: &GraphDefinition) -> Self {
        let capacity = graph.nodes.len();
        let mut adjacency: FxHashMap<Arc<str>, DepVec> =
            FxHashMap::with_capacity_and_hasher(capacity, Default::default());
        let mut predecessors: FxHashMap<Arc<str>, DepVec> =
            FxHashMap::with_capacity_and_hasher(capacity, Default::default());
        let mut node_ids: Vec<Arc<str>> = Vec::with_capacity(capacity);
        let mut node_set: FxHashSet<Arc<str>> =
            FxHashSet::with_capacity_and_hasher(capacity, Default::default());

        for node in &graph.nodes {
            let id: Arc<str> = Arc::from(node.id.as_str());
            if !node_set.insert(Arc::clone(&id)) {
                continue;
            }
            node_ids.push(Arc::clone(&id));
            adjacency.insert(Arc::clone(&id), DepVec::new());
            predecessors.insert(id, DepVec::new());
        }

        for edge in &graph.edges {
            let (Some(src), Some(tgt)) = (
                node_set.get(edge.source.as_str()).cloned(),
                node_set.get(edge.target.as_str()).cloned(),
            ) else {
                continue;
            };

            adjacency
                .entry(Arc::clone(&src))
                .or_default()
                .push(Arc::clone(&tgt));
            predecessors.entry(tgt).or_default().push(src);
        }

        Self {
            adjacency,
            predecessors,
            node_ids,
        }
    }

    /// Node ids in declaration order
    pub fn node_ids(&self) -> &[Arc<str>] {
        &self.node_ids
    }

    /// Get dependencies (sources of incoming edges) of a node
    #[inline]
    pub fn get_dependencies(&self, node_id: &str) -> &[Arc<str>] {
        static EMPTY: &[Arc<str>] = &[];
        self.predecessors
            .get(node_id)
            .map_or(EMPTY, SmallVec::as_slice)
    }

    /// Get successors (targets of outgoing edges) of a node
    #[inline]
    pub fn get_successors(&self, node_id: &str) -> &[Arc<str>] {
        static EMPTY: &[Arc<str>] = &[];
        self.adjacency
            .get(node_id)
            .map_or(EMPTY, SmallVec::as_slice)
    }

    /// Find nodes with no successors (final nodes)
    pub fn get_final_nodes(&self) -> Vec<Arc<str>> {
        self.node_ids
            .iter()
            .filter(|id| {
                self.adjacency
                    .get(id.as_ref())
                    .is_none_or(SmallVec::is_empty)
            })
            .cloned()
            .collect()
    }

    #[inline]
    pub fn contains(&self, node_id: &str) -> bool {
        self.adjacency.contains_key(node_id)
    }

    /// Check if there's a path from `from` to `to` (BFS)
    pub fn has_path(&self, from: &str, to: &str) -> bool {
        if from == to {
            return true;
        }

        let mut visited: FxHashSet<&str> = FxHashSet::default();
        let mut queue: VecDeque<&str> = VecDeque::new();

        queue.push_back(from);
        visited.insert(from);

        while let Some(current) = queue.pop_front() {
            if let Some(neighbors) = self.adjacency.get(current) {
                for neighbor in neighbors {
                    if neighbor.as_ref() == to {
                        return true;
                    }
                    if visited.insert(neighbor.as_ref()) {
                        queue.push_back(neighbor.as_ref());
                    }
                }
            }
        }

        false
    }

    /// Successor lists keyed by node id (String keys, for serialization)
    pub fn adjacency_map(&self) -> FxHashMap<String, Vec<String>> {
        self.node_ids
            .iter()
            .map(|id| {
                let targets = self
                    .get_successors(id)
                    .iter()
                    .map(|t| t.to_string())
                    .collect();
                (id.to_string(), targets)
            })
            .collect()
    }

    /// Deterministic topological order (Kahn).
    ///
    /// Returns `CycleDetected` naming every node that could not be placed.
    pub fn topological_order(&self) -> Result<Vec<Arc<str>>> {
        let mut in_degree: FxHashMap<&str, usize> = self
            .node_ids
            .iter()
            .map(|id| (id.as_ref(), self.get_dependencies(id).len()))
            .collect();

        let mut queue: VecDeque<&Arc<str>> = self
            .node_ids
            .iter()
            .filter(|id| in_degree.get(id.as_ref()) == Some(&0))
            .collect();

        let mut order: Vec<Arc<str>> = Vec::with_capacity(self.node_ids.len());

        while let Some(current) = queue.pop_front() {
            order.push(Arc::clone(current));

            for successor in self.get_successors(current) {
                if let Some(degree) = in_degree.get_mut(successor.as_ref()) {
                    *degree -= 1;
                    if *degree == 0 {
                        queue.push_back(successor);
                    }
                }
            }
        }

        if order.len() < self.node_ids.len() {
            let placed: FxHashSet<&str> = order.iter().map(|id| id.as_ref()).collect();
            let nodes = self
                .node_ids
                .iter()
                .filter(|id| !placed.contains(id.as_ref()))
                .map(|id| id.to_string())
                .collect();
            return Err(FlowError::CycleDetected { nodes });
        }

        Ok(order)
    }
}

/// Stateless entry point for ordering a graph definition
pub struct TopologicalSorter;

impl TopologicalSorter {
    /// Order node ids so every edge points forward
    pub fn sort(graph: &GraphDefinition) -> Result<Vec<String>> {
        let order = FlowGraph::from_graph(graph).topological_order()?;
        Ok(order.iter().map(|id| id.to_string()).collect())
    }
}
