//! Report encoding
//!
//! This module wraps a score result in a versioned report envelope with
//! producer metadata and a computation timestamp. The result itself stays
//! deterministic; provenance lives only in the envelope.

use crate::error::ScoreError;
use crate::types::ScoreOutput;
use crate::{ENGINE_VERSION, PRODUCER_NAME};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Current report schema version
pub const REPORT_SCHEMA_VERSION: &str = "lmi.score_report.v1";

/// Who produced a report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportProducer {
    pub name: String,
    pub version: String,
    pub instance_id: String,
}

/// A score result with provenance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreReport {
    pub schema_version: String,
    pub producer: ReportProducer,
    pub computed_at_utc: DateTime<Utc>,
    pub result: ScoreOutput,
}

/// Report encoder for one engine instance
#[derive(Debug, Clone)]
pub struct ReportEncoder {
    instance_id: String,
}

impl Default for ReportEncoder {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportEncoder {
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

    pub fn encode(&self, result: ScoreOutput) -> ScoreReport {
        ScoreReport {
            schema_version: REPORT_SCHEMA_VERSION.to_string(),
            producer: ReportProducer {
                name: PRODUCER_NAME.to_string(),
                version: ENGINE_VERSION.to_string(),
                instance_id: self.instance_id.clone(),
            },
            computed_at_utc: Utc::now(),
            result,
        }
    }

    /// Encode to pretty-printed JSON
    pub fn encode_to_json(&self, result: ScoreOutput) -> Result<String, ScoreError> {
        let report = self.encode(result);
        serde_json::to_string_pretty(&report)
            .map_err(|e| ScoreError::EncodingError(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::score_lmi;
    use crate::types::{Answer, ScoreInput, TimeCategory, TimeRow};

    fn sample_output() -> ScoreOutput {
        score_lmi(&ScoreInput::new(
            vec![Answer::scored(6.0), Answer::scored(3.0).with_note("long commute")],
            vec![TimeRow::neutral(TimeCategory::Sleep, 56.0)],
        ))
    }

    #[test]
    fn test_encoder_creates_valid_report() {
        let encoder = ReportEncoder::new();
        let before = Utc::now();
        let report = encoder.encode(sample_output());

        assert_eq!(report.schema_version, REPORT_SCHEMA_VERSION);
        assert_eq!(report.producer.name, PRODUCER_NAME);
        assert_eq!(report.producer.version, ENGINE_VERSION);
        assert!(Uuid::parse_str(&report.producer.instance_id).is_ok());
        assert!(report.computed_at_utc >= before);
    }

    #[test]
    fn test_instance_id_is_stable_per_encoder() {
        let encoder = ReportEncoder::with_instance_id("test-instance".to_string());
        let first = encoder.encode(sample_output());
        let second = encoder.encode(sample_output());

        assert_eq!(first.producer.instance_id, "test-instance");
        assert_eq!(first.producer.instance_id, second.producer.instance_id);
        assert_eq!(first.result, second.result);
        assert_ne!(ReportEncoder::new().instance_id(), encoder.instance_id());
    }

    #[test]
    fn test_encode_to_json() {
        let encoder = ReportEncoder::with_instance_id("json-test".to_string());
        let json = encoder.encode_to_json(sample_output()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["schemaVersion"], REPORT_SCHEMA_VERSION);
        assert_eq!(value["producer"]["instanceId"], "json-test");
        assert_eq!(value["result"]["topDrainers"][0]["note"], "long commute");

        let decoded: ScoreReport = serde_json::from_str(&json).unwrap();
        assert_eq!(decoded.producer.instance_id, "json-test");
    }
}
