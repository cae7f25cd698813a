//! Summary encoder
//!
//! Serializes reading summaries to text for downstream consumers: the bare form is
//! embedded in feedback prompts, the enveloped form is stored per answer attempt.

use chrono::Utc;
use uuid::Uuid;

use crate::error::ReadpathError;
use crate::types::{ReadingSummary, SummaryEnvelope, SummaryProducer};
use crate::{PRODUCER_NAME, READPATH_VERSION};

/// Current envelope schema version
pub const SUMMARY_SCHEMA_VERSION: &str = "readpath.summary.v1";

/// Summary encoder
pub struct SummaryEncoder {
    instance_id: String,
}

impl Default for SummaryEncoder {
    fn default() -> Self {
        Self::new()
    }
}

impl SummaryEncoder {
    /// Create a new encoder with a unique instance ID
    pub fn new() -> Self {
        Self {
            instance_id: Uuid::new_v4().to_string(),
        }
    }

    /// Create an encoder with a specific instance ID
    pub fn with_instance_id(instance_id: String) -> Self {
        Self { instance_id }
    }

    pub fn instance_id(&self) -> &str {
        &self.instance_id
    }

    /// Bare summary JSON (compact, stable field order)
    pub fn encode_compact(&self, summary: &ReadingSummary) -> Result<String, ReadpathError> {
        serde_json::to_string(summary).map_err(ReadpathError::JsonError)
    }

    /// Wrap a summary with producer metadata
    pub fn encode(&self, summary: &ReadingSummary, trace_id: Option<&str>) -> SummaryEnvelope {
        SummaryEnvelope {
            schema_version: SUMMARY_SCHEMA_VERSION.to_string(),
            producer: SummaryProducer {
                name: PRODUCER_NAME.to_string(),
                version: READPATH_VERSION.to_string(),
                instance_id: self.instance_id.clone(),
            },
            computed_at_utc: Utc::now().to_rfc3339(),
            trace_id: trace_id.map(str::to_string),
            summary: summary.clone(),
        }
    }

    /// Encode the envelope to pretty JSON
    pub fn encode_to_json(
        &self,
        summary: &ReadingSummary,
        trace_id: Option<&str>,
    ) -> Result<String, ReadpathError> {
        let envelope = self.encode(summary, trace_id);
        serde_json::to_string_pretty(&envelope).map_err(ReadpathError::JsonError)
    }
}

/// Decode a stored summary, accepting either the bare or the enveloped form
pub fn decode_summary(text: &str) -> Result<ReadingSummary, ReadpathError> {
    let value: serde_json::Value = serde_json::from_str(text)?;

    let summary_value = if value.get("schema_version").is_some() {
        let schema = value["schema_version"].as_str().unwrap_or_default();
        if schema != SUMMARY_SCHEMA_VERSION {
            return Err(ReadpathError::ParseError(format!(
                "Unsupported summary schema: {schema}"
            )));
        }
        value
            .get("summary")
            .cloned()
            .ok_or_else(|| ReadpathError::ParseError("Envelope has no summary".to_string()))?
    } else {
        value
    };

    serde_json::from_value(summary_value)
        .map_err(|e| ReadpathError::ParseError(format!("Failed to parse reading summary: {}", e)))
}
