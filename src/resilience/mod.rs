//! Resilience patterns for provider calls
//!
//! - [`retry`]: exponential backoff and a retrying `Provider` wrapper

pub mod retry;

pub use retry::{RetryConfig, RetryPolicy, RetryingProvider};
