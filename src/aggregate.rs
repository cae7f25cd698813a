//! Cross-attempt reading analytics
//!
//! Folds many per-attempt reading summaries into per-sentence averages: mean dwell,
//! mean visit count and mean first-visit order across participants.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::types::ReadingSummary;

/// Running sums for one sentence index
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct SentenceTotals {
    /// Latest non-empty text seen for this sentence
    text: String,
    /// Summaries that contained this sentence
    attempts: u32,
    dwell_ms: u64,
    visits: u64,
    /// Summaries in which the sentence was visited at least once
    visited_attempts: u32,
    first_visit_order: u64,
}

/// Averaged reading statistics for one sentence
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentenceAggregate {
    pub index: u32,
    pub text: String,
    /// Summaries that contained this sentence
    pub attempts: u32,
    /// Summaries in which the sentence was visited
    pub visited_attempts: u32,
    /// Mean dwell over `attempts`
    pub mean_dwell_ms: f64,
    /// Mean visit count over `attempts`
    pub mean_visits: f64,
    /// Mean first-visit order over `visited_attempts`, `None` if never visited
    pub mean_first_visit_order: Option<f64>,
}

/// Aggregate report across all folded summaries
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregateReport {
    /// Number of summaries folded in
    pub attempts: u32,
    /// Mean `total_time_ms`, `None` with no attempts
    pub mean_total_time_ms: Option<f64>,
    /// One entry per sentence index seen, ascending by index
    pub sentences: Vec<SentenceAggregate>,
}

/// Accumulates reading summaries for simple averaging
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SentenceAggregator {
    attempts: u32,
    total_time_ms: u64,
    sentences: BTreeMap<u32, SentenceTotals>,
}

impl SentenceAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one attempt's summary into the running totals
    pub fn add(&mut self, summary: &ReadingSummary) {
        self.attempts += 1;
        self.total_time_ms = self.total_time_ms.saturating_add(summary.total_time_ms);

        for stat in &summary.sentences {
            let totals = self.sentences.entry(stat.index).or_default();
            if !stat.text.is_empty() {
                totals.text.clone_from(&stat.text);
            }
            totals.attempts += 1;
            totals.dwell_ms = totals.dwell_ms.saturating_add(stat.dwell_ms);
            totals.visits += u64::from(stat.visits);
            if let Some(order) = stat.first_visit_order {
                totals.visited_attempts += 1;
                totals.first_visit_order += u64::from(order);
            }
        }
    }

    /// Current averages
    pub fn report(&self) -> AggregateReport {
        let sentences = self
            .sentences
            .iter()
            .map(|(&index, totals)| SentenceAggregate {
                index,
                text: totals.text.clone(),
                attempts: totals.attempts,
                visited_attempts: totals.visited_attempts,
                mean_dwell_ms: mean(totals.dwell_ms, totals.attempts).unwrap_or(0.0),
                mean_visits: mean(totals.visits, totals.attempts).unwrap_or(0.0),
                mean_first_visit_order: mean(totals.first_visit_order, totals.visited_attempts),
            })
            .collect();

        AggregateReport {
            attempts: self.attempts,
            mean_total_time_ms: mean(self.total_time_ms, self.attempts),
            sentences,
        }
    }

    /// Number of summaries folded in
    pub fn attempt_count(&self) -> usize {
        self.attempts as usize
    }

    /// Load aggregator state from JSON
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Serialize aggregator state to JSON
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Drop all accumulated data
    pub fn clear(&mut self) {
        self.attempts = 0;
        self.total_time_ms = 0;
        self.sentences.clear();
    }
}

fn mean(sum: u64, count: u32) -> Option<f64> {
    if count == 0 {
        return None;
    }
    Some(sum as f64 / count as f64)
}
