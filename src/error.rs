// The #[error] attribute from thiserror uses struct fields via string interpolation,
// but Rust's unused_assignments lint doesn't recognize this.
#![allow(unused_assignments)]

//! Agnoflow Error Types with Error Codes
//!
//! Error code ranges:
//! - AF-000-009: Input / parsing errors
//! - AF-010-019: Graph validation errors
//! - AF-020-029: Ordering errors
//! - AF-030-039: Node compilation errors
//! - AF-040-049: Node execution errors
//! - AF-050-059: Provider errors
//! - AF-090-099: Config / IO errors

use miette::Diagnostic;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, FlowError>;

/// Trait for errors that provide fix suggestions
pub trait FixSuggestion {
    fn fix_suggestion(&self) -> Option<&str>;
}

/// All error variants are part of the public API.
///
/// Implements both `thiserror::Error` for std error compatibility
/// and `miette::Diagnostic` for fancy terminal error display.
#[derive(Error, Debug, Diagnostic)]
pub enum FlowError {
    // ═══════════════════════════════════════════
    // INPUT ERRORS (000-009)
    // ═══════════════════════════════════════════
    #[error("[AF-001] Failed to parse flow definition: {details}")]
    #[diagnostic(
        code(agnoflow::parse_error),
        help("Check the graph JSON/YAML matches the flow definition format")
    )]
    ParseError { details: String },

    // ═══════════════════════════════════════════
    // VALIDATION ERRORS (010-019)
    // ═══════════════════════════════════════════
    #[error("[AF-010] Flow validation failed: {}", .errors.join("; "))]
    #[diagnostic(
        code(agnoflow::validation_failed),
        help("Fix every listed problem, then compile again")
    )]
    ValidationFailed { errors: Vec<String> },

    // ═══════════════════════════════════════════
    // ORDERING ERRORS (020-029)
    // ═══════════════════════════════════════════
    #[error("[AF-020] Flow contains a cycle: nodes [{}] could not be ordered", .nodes.join(", "))]
    #[diagnostic(
        code(agnoflow::cycle_detected),
        help("Remove an edge so the graph becomes acyclic")
    )]
    CycleDetected { nodes: Vec<String> },

    // ═══════════════════════════════════════════
    // COMPILATION ERRORS (030-039)
    // ═══════════════════════════════════════════
    #[error("[AF-030] Node '{node_id}' missing {node_type} configuration")]
    #[diagnostic(code(agnoflow::missing_configuration))]
    MissingConfiguration { node_id: String, node_type: String },

    #[error("[AF-031] Node '{node_id}' has invalid configuration: {reason}")]
    #[diagnostic(code(agnoflow::invalid_node_config))]
    InvalidNodeConfig { node_id: String, reason: String },

    // ═══════════════════════════════════════════
    // EXECUTION ERRORS (040-049)
    // ═══════════════════════════════════════════
    #[error("[AF-040] Node '{node_id}' failed: {reason}")]
    #[diagnostic(code(agnoflow::node_execution))]
    NodeExecution { node_id: String, reason: String },

    // ═══════════════════════════════════════════
    // PROVIDER ERRORS (050-059)
    // ═══════════════════════════════════════════
    /// Simple provider error carrying the backend's message
    #[error("Provider error: {0}")]
    Provider(String),

    #[error("[AF-050] Provider '{provider}' not configured")]
    #[diagnostic(code(agnoflow::provider_not_configured))]
    ProviderNotConfigured { provider: String },

    #[error("[AF-051] Provider '{provider}' timed out after {timeout_ms}ms")]
    #[diagnostic(code(agnoflow::provider_timeout))]
    ProviderTimeout { provider: String, timeout_ms: u64 },

    #[error("[AF-052] Missing API key for provider '{provider}'")]
    #[diagnostic(code(agnoflow::missing_api_key))]
    MissingApiKey { provider: String },

    // ═══════════════════════════════════════════
    // CONFIG / IO ERRORS (090-099)
    // ═══════════════════════════════════════════
    #[error("[AF-090] Configuration error: {reason}")]
    #[diagnostic(code(agnoflow::config_error))]
    ConfigError { reason: String },

    #[error("[AF-091] IO error: {0}")]
    #[diagnostic(code(agnoflow::io_error))]
    Io(#[from] std::io::Error),
}

impl FlowError {
    /// Stable error code (e.g. "AF-020")
    pub fn code(&self) -> &'static str {
        match self {
            Self::ParseError { .. } => "AF-001",
            Self::ValidationFailed { .. } => "AF-010",
            Self::CycleDetected { .. } => "AF-020",
            Self::MissingConfiguration { .. } => "AF-030",
            Self::InvalidNodeConfig { .. } => "AF-031",
            Self::NodeExecution { .. } => "AF-040",
            Self::Provider(_) => "AF-050",
            Self::ProviderNotConfigured { .. } => "AF-050",
            Self::ProviderTimeout { .. } => "AF-051",
            Self::MissingApiKey { .. } => "AF-052",
            Self::ConfigError { .. } => "AF-090",
            Self::Io(_) => "AF-091",
        }
    }

    /// Compile-time errors never produce a plan; the graph must be fixed first.
    pub fn is_compile_error(&self) -> bool {
        matches!(
            self,
            Self::ValidationFailed { .. }
                | Self::CycleDetected { .. }
                | Self::MissingConfiguration { .. }
                | Self::InvalidNodeConfig { .. }
        )
    }

    /// Whether a provider-level wrapper may retry the failed call
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::Provider(_) | Self::ProviderTimeout { .. })
    }
}

impl FixSuggestion for FlowError {
    fn fix_suggestion(&self) -> Option<&str> {
        match self {
            FlowError::ParseError { .. } => Some("Check JSON/YAML syntax and node type tags"),
            FlowError::ValidationFailed { .. } => {
                Some("Every edge must reference existing node ids and the flow needs a node")
            }
            FlowError::CycleDetected { .. } => {
                Some("Flows must be acyclic: remove the back-edge between the listed nodes")
            }
            FlowError::MissingConfiguration { .. } => {
                Some("Add the matching config block for the node's type")
            }
            FlowError::InvalidNodeConfig { .. } => Some("Check the node's config fields"),
            FlowError::NodeExecution { .. } => Some("Inspect the failing node's provider output"),
            FlowError::Provider(_) => Some("Check provider availability and credentials"),
            FlowError::ProviderNotConfigured { .. } => {
                Some("Set the provider's API key or run with --provider mock")
            }
            FlowError::ProviderTimeout { .. } => {
                Some("Raise engine.provider_timeout_ms in config.toml")
            }
            FlowError::MissingApiKey { .. } => {
                Some("Set OPENAI_API_KEY / ANTHROPIC_API_KEY or add it to config.toml")
            }
            FlowError::ConfigError { .. } => Some("Check ~/.config/agnoflow/config.toml syntax"),
            FlowError::Io(_) => Some("Check file path and permissions"),
        }
    }
}

impl From<serde_json::Error> for FlowError {
    fn from(e: serde_json::Error) -> Self {
        FlowError::ParseError {
            details: e.to_string(),
        }
    }
}

impl From<serde_yaml::Error> for FlowError {
    fn from(e: serde_yaml::Error) -> Self {
        FlowError::ParseError {
            details: e.to_string(),
        }
    }
}
