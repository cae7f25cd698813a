//! Pipeline orchestration
//!
//! This module provides the public API for trace processing.
//! It orchestrates parsing, summarization, encoding and analytics aggregation.

use log::info;

use crate::adapter::parse_trace;
use crate::aggregate::{AggregateReport, SentenceAggregator};
use crate::config::SummaryConfig;
use crate::encoder::SummaryEncoder;
use crate::error::ReadpathError;
use crate::summarizer::ReadingSummarizer;

/// Convert reading trace JSON to compact summary JSON (stateless, one-shot).
///
/// # Arguments
/// * `trace_json` - Reading trace JSON (`{ trace_id?, samples, regions }`)
///
/// # Returns
/// Bare reading summary JSON string
///
/// # Example
/// ```ignore
/// let summary_json = trace_to_summary_json(trace_json)?;
/// ```
pub fn trace_to_summary_json(trace_json: &str) -> Result<String, ReadpathError> {
    // Stage 1: Parse trace JSON
    let trace = parse_trace(trace_json)?;

    // Stage 2: Summarize with the reference configuration
    let summary = ReadingSummarizer::default().summarize(&trace.samples, &trace.regions)?;

    // Stage 3: Encode
    SummaryEncoder::new().encode_compact(&summary)
}

/// Stateful processor that keeps a running aggregate across attempts.
///
/// Use this when summarizing a batch of traces whose per-sentence averages are needed.
pub struct AnalyticsProcessor {
    summarizer: ReadingSummarizer,
    encoder: SummaryEncoder,
    aggregator: SentenceAggregator,
}

impl Default for AnalyticsProcessor {
    fn default() -> Self {
        Self::new()
    }
}

impl AnalyticsProcessor {
    /// Create a new processor with the reference configuration
    pub fn new() -> Self {
        Self::with_config(SummaryConfig::default())
    }

    /// Create a processor with specific summarizer tunables
    pub fn with_config(config: SummaryConfig) -> Self {
        Self {
            summarizer: ReadingSummarizer::new(config),
            encoder: SummaryEncoder::new(),
            aggregator: SentenceAggregator::new(),
        }
    }

    /// Summarize a trace, fold it into the aggregate and return the enveloped JSON
    ///
    /// # Arguments
    /// * `trace_json` - Reading trace JSON
    pub fn process(&mut self, trace_json: &str) -> Result<String, ReadpathError> {
        // Stage 1: Parse trace JSON
        let trace = parse_trace(trace_json)?;

        // Stage 2: Summarize
        let summary = self.summarizer.summarize(&trace.samples, &trace.regions)?;

        // Stage 3: Aggregate
        self.aggregator.add(&summary);
        info!(
            "processed trace {} ({} samples, {} of {} sentences visited)",
            trace.trace_id.as_deref().unwrap_or("<unnamed>"),
            trace.samples.len(),
            summary.visited_count(),
            summary.sentences.len()
        );

        // Stage 4: Encode envelope
        self.encoder
            .encode_to_json(&summary, trace.trace_id.as_deref())
    }

    /// Current per-sentence averages
    pub fn report(&self) -> AggregateReport {
        self.aggregator.report()
    }

    /// Save aggregate state to JSON for persistence
    pub fn save_aggregate(&self) -> Result<String, ReadpathError> {
        self.aggregator
            .to_json()
            .map_err(|e| ReadpathError::EncodingError(e.to_string()))
    }

    /// Load aggregate state from JSON
    pub fn load_aggregate(&mut self, json: &str) -> Result<(), ReadpathError> {
        self.aggregator = SentenceAggregator::from_json(json)
            .map_err(|e| ReadpathError::ParseError(e.to_string()))?;
        Ok(())
    }

    /// Number of traces folded into the aggregate
    pub fn attempt_count(&self) -> usize {
        self.aggregator.attempt_count()
    }

    /// Clear all aggregate data
    pub fn clear(&mut self) {
        self.aggregator.clear();
    }
}
