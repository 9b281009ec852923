//! Centralized constants for agnoflow runtime configuration
//!
//! All timeout and limit values in one place for easy tuning.

use std::time::Duration;

// ═══════════════════════════════════════════════════════════════
// Execution Timeouts
// ═══════════════════════════════════════════════════════════════

/// Default ceiling for a single provider call made by the engine
pub const PROVIDER_TIMEOUT: Duration = Duration::from_secs(120);

/// HTTP request timeout for LLM inference providers
pub const INFER_TIMEOUT: Duration = Duration::from_secs(120);

/// Timeout for establishing HTTP connections
pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

// ═══════════════════════════════════════════════════════════════
// HTTP Client Limits
// ═══════════════════════════════════════════════════════════════

/// Maximum number of HTTP redirects to follow
pub const REDIRECT_LIMIT: usize = 5;

// ═══════════════════════════════════════════════════════════════
// Node defaults
// ═══════════════════════════════════════════════════════════════

/// Model used by the provider-backed condition evaluator
pub const CONDITION_MODEL: &str = "gpt-4o-mini";

/// Model used by compiled web search nodes
pub const WEB_SEARCH_MODEL: &str = "gpt-4o-mini";

/// Knowledge base chunking defaults
pub const DEFAULT_CHUNK_SIZE: usize = 1000;
pub const DEFAULT_CHUNK_OVERLAP: usize = 200;
