//! Trace adapter
//!
//! Parses reading traces from JSON and NDJSON and reports suspicious input
//! without rejecting it.

use std::collections::HashSet;
use std::fmt;

use serde::Serialize;

use crate::error::ReadpathError;
use crate::types::{CursorSample, ReadingTrace};

/// Parse a reading trace JSON document (`{ trace_id?, samples, regions }`)
pub fn parse_trace(json: &str) -> Result<ReadingTrace, ReadpathError> {
    serde_json::from_str(json)
        .map_err(|e| ReadpathError::ParseError(format!("Failed to parse reading trace: {}", e)))
}

/// Parse a JSON array of cursor samples
pub fn parse_samples(json: &str) -> Result<Vec<CursorSample>, ReadpathError> {
    let samples: Vec<CursorSample> = serde_json::from_str(json)?;
    Ok(samples)
}

/// Parse NDJSON (one cursor sample per line), skipping blank lines
pub fn parse_samples_ndjson(ndjson: &str) -> Result<Vec<CursorSample>, ReadpathError> {
    let mut samples = Vec::new();
    for (line_num, line) in ndjson.lines().enumerate() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        match serde_json::from_str::<CursorSample>(trimmed) {
            Ok(sample) => samples.push(sample),
            Err(e) => {
                return Err(ReadpathError::ParseError(format!(
                    "Failed to parse line {}: {}",
                    line_num + 1,
                    e
                )));
            }
        }
    }
    Ok(samples)
}

/// Something in a trace the summarizer will tolerate but a caller may want to know about
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TraceIssue {
    /// Sample has a NaN or infinite coordinate
    NonFiniteSample { index: usize },
    /// Sample timestamp is earlier than the one before it
    OutOfOrderSample { index: usize, timestamp: i64, previous: i64 },
    /// Region has a NaN or infinite bound
    NonFiniteRegion { index: usize, id: u32 },
    /// Region has `right < left` or `bottom < top`
    InvertedRegion { index: usize, id: u32 },
    /// Region id already used by an earlier region
    DuplicateRegionId { index: usize, id: u32 },
}

impl fmt::Display for TraceIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TraceIssue::NonFiniteSample { index } => {
                write!(f, "sample {index} has a non-finite coordinate")
            }
            TraceIssue::OutOfOrderSample {
                index,
                timestamp,
                previous,
            } => write!(
                f,
                "sample {index} at {timestamp} ms precedes the previous sample at {previous} ms"
            ),
            TraceIssue::NonFiniteRegion { index, id } => {
                write!(f, "region {index} (sentence {id}) has a non-finite bound")
            }
            TraceIssue::InvertedRegion { index, id } => {
                write!(f, "region {index} (sentence {id}) is inverted")
            }
            TraceIssue::DuplicateRegionId { index, id } => {
                write!(f, "region {index} reuses sentence id {id}")
            }
        }
    }
}

/// Collect every issue in a trace, samples first, then regions
pub fn validate_trace(trace: &ReadingTrace) -> Vec<TraceIssue> {
    let mut issues = Vec::new();

    for (index, sample) in trace.samples.iter().enumerate() {
        if !sample.is_finite() {
            issues.push(TraceIssue::NonFiniteSample { index });
        }
        if index > 0 {
            let previous = trace.samples[index - 1].timestamp;
            if sample.timestamp < previous {
                issues.push(TraceIssue::OutOfOrderSample {
                    index,
                    timestamp: sample.timestamp,
                    previous,
                });
            }
        }
    }

    let mut seen = HashSet::with_capacity(trace.regions.len());
    for (index, region) in trace.regions.iter().enumerate() {
        if !region.is_finite() {
            issues.push(TraceIssue::NonFiniteRegion {
                index,
                id: region.id,
            });
        } else if region.is_inverted() {
            issues.push(TraceIssue::InvertedRegion {
                index,
                id: region.id,
            });
        }
        if !seen.insert(region.id) {
            issues.push(TraceIssue::DuplicateRegionId {
                index,
                id: region.id,
            });
        }
    }

    issues
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::SentenceRegion;
    use pretty_assertions::assert_eq;

    fn sample_trace_json() -> &'static str {
        r#"{
            "trace_id": "attempt-42",
            "samples": [
                {"x": 12.0, "y": 8.0, "timestamp": 1000},
                {"x": 40.0, "y": 9.0, "timestamp": 1050},
                {"x": 140.0, "y": 30.0, "t": 1100}
            ],
            "regions": [
                {"id": 0, "text": "The cat sat.", "left": 0, "top": 0, "right": 100, "bottom": 20},
                {"id": 1, "text": "It was warm.", "left": 100, "top": 22, "right": 200, "bottom": 42}
            ]
        }"#
    }

    #[test]
    fn test_parse_trace() {
        let trace = parse_trace(sample_trace_json()).unwrap();
        assert_eq!(trace.trace_id.as_deref(), Some("attempt-42"));
        assert_eq!(trace.samples.len(), 3);
        assert_eq!(trace.samples[2].timestamp, 1100);
        assert_eq!(trace.regions[1].text, "It was warm.");
        assert!(validate_trace(&trace).is_empty());
    }

    #[test]
    fn test_parse_trace_missing_fields_default_empty() {
        let trace = parse_trace("{}").unwrap();
        assert!(trace.trace_id.is_none());
        assert!(trace.samples.is_empty());
        assert!(trace.regions.is_empty());
    }

    #[test]
    fn test_parse_trace_invalid() {
        let err = parse_trace("not json").unwrap_err();
        assert!(matches!(err, ReadpathError::ParseError(_)));
    }

    #[test]
    fn test_parse_samples_array() {
        let samples = parse_samples(r#"[{"x": 1, "y": 2, "timestamp": 3}]"#).unwrap();
        assert_eq!(samples, vec![CursorSample::new(1.0, 2.0, 3)]);
    }

    #[test]
    fn test_parse_samples_ndjson() {
        let ndjson = "{\"x\": 1, \"y\": 2, \"timestamp\": 10}\n\n  {\"x\": 3, \"y\": 4, \"t\": 20}\n";
        let samples = parse_samples_ndjson(ndjson).unwrap();
        assert_eq!(
            samples,
            vec![CursorSample::new(1.0, 2.0, 10), CursorSample::new(3.0, 4.0, 20)]
        );
    }

    #[test]
    fn test_parse_samples_ndjson_reports_line() {
        let ndjson = "{\"x\": 1, \"y\": 2, \"timestamp\": 10}\n{\"x\": 1}\n";
        match parse_samples_ndjson(ndjson) {
            Err(ReadpathError::ParseError(msg)) => assert!(msg.contains("line 2")),
            other => panic!("expected ParseError, got {other:?}"),
        }
    }

    #[test]
    fn test_validate_trace_reports_every_issue() {
        let trace = ReadingTrace {
            trace_id: None,
            samples: vec![
                CursorSample::new(1.0, 1.0, 500),
                CursorSample::new(f64::NAN, 1.0, 400),
            ],
            regions: vec![
                SentenceRegion::new(0, "a", 0.0, 0.0, 10.0, 10.0),
                SentenceRegion::new(0, "b", 20.0, 0.0, 10.0, 10.0),
                SentenceRegion::new(2, "c", 0.0, f64::INFINITY, 10.0, 10.0),
            ],
        };

        assert_eq!(
            validate_trace(&trace),
            vec![
                TraceIssue::NonFiniteSample { index: 1 },
                TraceIssue::OutOfOrderSample {
                    index: 1,
                    timestamp: 400,
                    previous: 500
                },
                TraceIssue::InvertedRegion { index: 1, id: 0 },
                TraceIssue::DuplicateRegionId { index: 1, id: 0 },
                TraceIssue::NonFiniteRegion { index: 2, id: 2 },
            ]
        );
    }

    #[test]
    fn test_issue_display_and_serialization() {
        let issue = TraceIssue::DuplicateRegionId { index: 3, id: 1 };
        assert_eq!(issue.to_string(), "region 3 reuses sentence id 1");

        let json = serde_json::to_value(&issue).unwrap();
        assert_eq!(json["kind"], "duplicate_region_id");
        assert_eq!(json["id"], 1);
    }
}
