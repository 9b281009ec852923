//! Event Module - execution events for flow runs
//!
//! - `ExecutionEvent` / `EventType`: items of the run stream
//! - `EventLog`: thread-safe, append-only collector
//! - `Envelope`: normalized shape for external-service results
//! - `TraceWriter`: NDJSON file writer for debugging

mod envelope;
mod log;
mod trace;

pub use envelope::{Envelope, EnvelopeStatus};
pub use log::{EventLog, EventType, ExecutionEvent};
pub use trace::{read_trace, TraceWriter};
