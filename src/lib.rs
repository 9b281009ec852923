//! Agnoflow - graph compiler and streaming execution engine for agent flows
//!
//! A flow is a graph of typed nodes (input, agent, tool, conditional,
//! knowledge base, output, integrations) wired by edges. [`FlowCompiler`]
//! validates and orders it into an [`ExecutionPlan`]; [`ExecutionEngine`]
//! runs the plan and yields [`ExecutionEvent`]s as a lazy stream.

pub mod ast;
pub mod compiler;
pub mod config;
pub mod dag;
pub mod error;
pub mod event;
pub mod provider;
pub mod resilience;
pub mod runtime;
pub mod util;

pub use ast::{Edge, GraphDefinition, Node, NodeConfig, NodeType};
pub use compiler::{CompiledNode, CompiledPayload, ExecutionPlan, FlowCompiler};
pub use config::AgnoflowConfig;
pub use dag::{FlowValidator, TopologicalSorter};
pub use error::{FixSuggestion, FlowError, Result};
pub use event::{EventLog, EventType, ExecutionEvent};
pub use provider::{Provider, ProviderDescriptor, ProviderOutput, ProviderRegistry};
pub use runtime::{ConditionEvaluator, EventStream, ExecutionEngine};
