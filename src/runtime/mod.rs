//! Runtime module - plan execution
//!
//! - `engine`: `ExecutionEngine`, the lazy event stream over a plan
//! - `state`: per-run outputs, skips and branch decisions
//! - `condition`: `ConditionEvaluator` seam for conditional nodes
//!
//! For compile-time structure, see the `compiler` module.

mod condition;
mod engine;
mod state;

pub use condition::{
    parse_verdict, ConditionEvaluator, FnConditionEvaluator, ProviderConditionEvaluator,
};
pub use engine::{EventStream, ExecutionEngine};
pub use state::RunState;
