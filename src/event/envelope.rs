//! Normalized wrapper for external-service results
//!
//! Every integration provider (scrapers, actors, MCP servers, inference
//! endpoints) returns its payload inside an `Envelope` so downstream nodes
//! see one shape regardless of the service.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::provider::ProviderOutput;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnvelopeStatus {
    #[default]
    Success,
    Error,
    Partial,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    /// Service identifier (e.g. "firecrawl_scrape")
    pub source: String,
    pub timestamp: DateTime<Utc>,
    pub data: Value,
    #[serde(default)]
    pub metadata: Map<String, Value>,
    #[serde(default)]
    pub status: EnvelopeStatus,
}

impl Envelope {
    /// Wrap a successful payload with empty metadata
    pub fn wrap(source: impl Into<String>, data: Value) -> Self {
        Self {
            source: source.into(),
            timestamp: Utc::now(),
            data,
            metadata: Map::new(),
            status: EnvelopeStatus::Success,
        }
    }

    pub fn with_metadata(mut self, metadata: Map<String, Value>) -> Self {
        self.metadata = metadata;
        self
    }

    pub fn with_status(mut self, status: EnvelopeStatus) -> Self {
        self.status = status;
        self
    }

    pub fn is_success(&self) -> bool {
        self.status == EnvelopeStatus::Success
    }

    /// Normalize a provider result: envelopes pass through, anything else
    /// is wrapped as a successful payload from `source`
    pub fn from_output(source: &str, output: ProviderOutput) -> Self {
        let value = output.into_value();
        if let Ok(envelope) = serde_json::from_value::<Envelope>(value.clone()) {
            return envelope;
        }
        Self::wrap(source, value)
    }
}

impl From<Envelope> for ProviderOutput {
    fn from(envelope: Envelope) -> Self {
        // Envelope fields are all plain JSON; serialization cannot fail
        ProviderOutput::Structured(serde_json::to_value(envelope).unwrap_or(Value::Null))
    }
}
