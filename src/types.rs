//! Core types for readpath
//!
//! This module defines the data structures that flow through the summarizer:
//! raw cursor samples and sentence geometry going in, the reading summary coming out.

use serde::{Deserialize, Serialize};

/// Timestamp in integer milliseconds
pub type Millis = i64;

/// A single throttled cursor position reported by the sampler
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CursorSample {
    /// Horizontal viewport coordinate
    pub x: f64,
    /// Vertical viewport coordinate
    pub y: f64,
    /// Sample time in milliseconds
    #[serde(alias = "t")]
    pub timestamp: Millis,
}

impl CursorSample {
    pub fn new(x: f64, y: f64, timestamp: Millis) -> Self {
        Self { x, y, timestamp }
    }

    /// Whether both coordinates are finite numbers
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

/// Measured bounding rectangle of one sentence, in the same frame as the cursor samples
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentenceRegion {
    /// Stable sentence index within the passage
    pub id: u32,
    /// Sentence text
    #[serde(default)]
    pub text: String,
    pub left: f64,
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
}

impl SentenceRegion {
    pub fn new(
        id: u32,
        text: impl Into<String>,
        left: f64,
        top: f64,
        right: f64,
        bottom: f64,
    ) -> Self {
        Self {
            id,
            text: text.into(),
            left,
            top,
            right,
            bottom,
        }
    }
}

/// Reading statistics for one sentence
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SentenceStat {
    /// Mirrors the originating `SentenceRegion::id`
    pub index: u32,
    /// Sentence text
    pub text: String,
    /// Accumulated time the cursor spent inside the sentence
    pub dwell_ms: u64,
    /// Number of times the cursor entered the sentence
    pub visits: u32,
    /// Zero-based rank by time of first entry, `None` if never visited
    pub first_visit_order: Option<u32>,
}

impl SentenceStat {
    /// An untouched sentence: no dwell, no visits, no order
    pub fn unvisited(index: u32, text: impl Into<String>) -> Self {
        Self {
            index,
            text: text.into(),
            dwell_ms: 0,
            visits: 0,
            first_visit_order: None,
        }
    }

    pub fn was_visited(&self) -> bool {
        self.first_visit_order.is_some()
    }
}

/// Summary of one cursor trace over one passage
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ReadingSummary {
    /// Wall-clock span between the first and last sample
    pub total_time_ms: u64,
    /// One entry per sentence region, in passage order
    pub sentences: Vec<SentenceStat>,
}

impl ReadingSummary {
    /// Number of distinct sentences the cursor entered at least once
    pub fn visited_count(&self) -> usize {
        self.sentences.iter().filter(|s| s.was_visited()).count()
    }

    /// Sum of dwell over every sentence
    pub fn total_dwell_ms(&self) -> u64 {
        self.sentences.iter().map(|s| s.dwell_ms).sum()
    }

    /// Sentence indices in the order they were first visited
    pub fn reading_order(&self) -> Vec<u32> {
        let mut visited: Vec<&SentenceStat> =
            self.sentences.iter().filter(|s| s.was_visited()).collect();
        visited.sort_by_key(|s| s.first_visit_order);
        visited.iter().map(|s| s.index).collect()
    }
}

/// A cursor trace together with the sentence geometry it was recorded over
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReadingTrace {
    /// Caller-supplied identifier (e.g. the answer attempt this trace belongs to)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trace_id: Option<String>,
    /// Cursor samples, in any order
    #[serde(default)]
    pub samples: Vec<CursorSample>,
    /// Sentence regions, in passage order
    #[serde(default)]
    pub regions: Vec<SentenceRegion>,
}

// ============================================================================
// Encoded output
// ============================================================================

/// Producer metadata embedded in every envelope
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryProducer {
    /// Name of the producing software
    pub name: String,
    /// Version of the producing software
    pub version: String,
    /// Unique encoder instance identifier (UUID)
    pub instance_id: String,
}

/// A reading summary wrapped with provenance, as stored per answer attempt
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryEnvelope {
    /// Envelope schema version
    pub schema_version: String,
    /// Producer metadata
    pub producer: SummaryProducer,
    /// When the summary was computed (RFC3339)
    pub computed_at_utc: String,
    /// Caller identifier copied from the trace
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trace_id: Option<String>,
    /// The summary itself
    pub summary: ReadingSummary,
}
