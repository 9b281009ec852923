//! DAG module - flow graph, ordering and structural validation

mod flow;
mod validate;

pub use flow::{DepVec, FlowGraph, TopologicalSorter};
pub use validate::FlowValidator;
