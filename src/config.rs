//! Summarizer configuration
//!
//! The defaults reproduce the reference behavior: a 4000 ms gap clamp, a 2-unit
//! hit-test margin, and silent non-matching of non-finite coordinates.

use crate::error::ReadpathError;
use serde::{Deserialize, Serialize};

/// Longest interval (ms) a single sample can contribute to a sentence's dwell
pub const DEFAULT_MAX_GAP_MS: i64 = 4000;

/// Slack (coordinate units) added to every region edge during hit-testing
pub const DEFAULT_EDGE_MARGIN: f64 = 2.0;

/// How non-finite coordinates are treated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CoordinatePolicy {
    /// Non-finite samples and regions match nothing
    #[default]
    Lenient,
    /// Non-finite samples, non-finite regions and duplicate region ids are rejected
    Strict,
}

/// Tunables for a summarization pass
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SummaryConfig {
    pub max_gap_ms: i64,
    pub edge_margin: f64,
    pub coordinate_policy: CoordinatePolicy,
}

impl Default for SummaryConfig {
    fn default() -> Self {
        Self {
            max_gap_ms: DEFAULT_MAX_GAP_MS,
            edge_margin: DEFAULT_EDGE_MARGIN,
            coordinate_policy: CoordinatePolicy::Lenient,
        }
    }
}

impl SummaryConfig {
    pub fn with_max_gap_ms(mut self, max_gap_ms: i64) -> Self {
        self.max_gap_ms = max_gap_ms;
        self
    }

    pub fn with_edge_margin(mut self, edge_margin: f64) -> Self {
        self.edge_margin = edge_margin;
        self
    }

    pub fn with_coordinate_policy(mut self, policy: CoordinatePolicy) -> Self {
        self.coordinate_policy = policy;
        self
    }

    /// Shorthand for `with_coordinate_policy(CoordinatePolicy::Strict)`
    pub fn strict(self) -> Self {
        self.with_coordinate_policy(CoordinatePolicy::Strict)
    }

    pub fn is_strict(&self) -> bool {
        self.coordinate_policy == CoordinatePolicy::Strict
    }

    /// Check that the tunables are usable
    pub fn validate(&self) -> Result<(), ReadpathError> {
        if self.max_gap_ms < 0 {
            return Err(ReadpathError::InvalidConfig(format!(
                "max_gap_ms must be non-negative, got {}",
                self.max_gap_ms
            )));
        }
        if !self.edge_margin.is_finite() || self.edge_margin < 0.0 {
            return Err(ReadpathError::InvalidConfig(format!(
                "edge_margin must be a non-negative finite number, got {}",
                self.edge_margin
            )));
        }
        Ok(())
    }

    /// Load a configuration from JSON, filling omitted fields with defaults
    pub fn from_json(json: &str) -> Result<Self, ReadpathError> {
        let config: SummaryConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_reference_constants() {
        let config = SummaryConfig::default();
        assert_eq!(config.max_gap_ms, 4000);
        assert_eq!(config.edge_margin, 2.0);
        assert_eq!(config.coordinate_policy, CoordinatePolicy::Lenient);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder_setters() {
        let config = SummaryConfig::default()
            .with_max_gap_ms(1500)
            .with_edge_margin(0.0)
            .strict();
        assert_eq!(config.max_gap_ms, 1500);
        assert_eq!(config.edge_margin, 0.0);
        assert!(config.is_strict());
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        assert!(SummaryConfig::default().with_max_gap_ms(-1).validate().is_err());
        assert!(SummaryConfig::default().with_edge_margin(-0.5).validate().is_err());
        assert!(SummaryConfig::default()
            .with_edge_margin(f64::NAN)
            .validate()
            .is_err());
    }

    #[test]
    fn test_from_json_partial() {
        let config = SummaryConfig::from_json(r#"{"coordinate_policy": "strict"}"#).unwrap();
        assert!(config.is_strict());
        assert_eq!(config.max_gap_ms, DEFAULT_MAX_GAP_MS);

        let err = SummaryConfig::from_json(r#"{"max_gap_ms": -10}"#);
        assert!(matches!(err, Err(ReadpathError::InvalidConfig(_))));
    }
}
