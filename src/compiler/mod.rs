//! Compiler module - graph definition to execution plan
//!
//! - `registry`: `NodeCompiler` trait and the type -> compiler map
//! - `nodes`: built-in compilers (input, output, agent, tool, conditional,
//!   knowledge base, integrations)
//! - `plan`: `CompiledNode`, `CompiledPayload`, `ExecutionPlan`
//! - `flow`: `FlowCompiler` (validate -> order -> compile)

mod flow;
pub mod nodes;
mod plan;
mod registry;

pub use flow::FlowCompiler;
pub use plan::{CompiledNode, CompiledNodes, CompiledPayload, ExecutionPlan, KnowledgeBackend};
pub use registry::{NodeCompiler, NodeCompilerRegistry};
