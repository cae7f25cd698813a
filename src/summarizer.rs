//! Cursor trace summarization
//!
//! Converts a raw cursor trace and a snapshot of sentence geometry into per-sentence
//! dwell, visit and first-visit-order statistics.
//!
//! Pass: sort samples → clamp inter-sample deltas → hit-test → accumulate dwell
//! → detect visits → assemble one stat per region.

use std::collections::HashSet;

use log::{debug, warn};

use crate::config::SummaryConfig;
use crate::error::ReadpathError;
use crate::geometry::{HitTester, LinearHitTester};
use crate::types::{CursorSample, ReadingSummary, SentenceRegion, SentenceStat};

/// Summarize a trace with the default (lenient) configuration.
///
/// Never fails: unsorted or duplicate timestamps are normalized, long pauses are
/// clamped, and non-finite coordinates simply match no sentence.
pub fn summarize(samples: &[CursorSample], regions: &[SentenceRegion]) -> ReadingSummary {
    let config = SummaryConfig::default();
    let tester = LinearHitTester::new(regions, config.edge_margin);
    summarize_with(&tester, samples, regions, config.max_gap_ms)
}

/// Summarizer with explicit tunables
#[derive(Debug, Clone, Default)]
pub struct ReadingSummarizer {
    config: SummaryConfig,
}

impl ReadingSummarizer {
    pub fn new(config: SummaryConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SummaryConfig {
        &self.config
    }

    /// Summarize a trace.
    ///
    /// Errors only for an unusable configuration or, under the strict coordinate
    /// policy, for non-finite coordinates and duplicate region ids.
    pub fn summarize(
        &self,
        samples: &[CursorSample],
        regions: &[SentenceRegion],
    ) -> Result<ReadingSummary, ReadpathError> {
        self.config.validate()?;

        if self.config.is_strict() {
            check_samples(samples)?;
            check_regions(regions)?;
        } else {
            let dropped = samples.iter().filter(|s| !s.is_finite()).count();
            if dropped > 0 {
                warn!("{dropped} cursor samples with non-finite coordinates treated as off-text");
            }
            let unusable = regions.iter().filter(|r| !r.is_finite()).count();
            if unusable > 0 {
                warn!("{unusable} sentence regions with non-finite bounds will never match");
            }
        }

        let tester = LinearHitTester::new(regions, self.config.edge_margin);
        Ok(summarize_with(&tester, samples, regions, self.config.max_gap_ms))
    }
}

/// Per-region running totals for one pass
#[derive(Debug, Clone, Copy, Default)]
struct RegionAccumulator {
    dwell_ms: u64,
    visits: u32,
    first_visit_order: Option<u32>,
}

/// Summarize against any hit tester whose positions index into `regions`
pub fn summarize_with<H: HitTester>(
    tester: &H,
    samples: &[CursorSample],
    regions: &[SentenceRegion],
    max_gap_ms: i64,
) -> ReadingSummary {
    let ordered = sort_samples(samples);
    let max_gap_ms = max_gap_ms.max(0);

    let mut accumulators = vec![RegionAccumulator::default(); regions.len()];
    let mut previous: Option<usize> = None;
    let mut next_order: u32 = 0;

    for (i, sample) in ordered.iter().enumerate() {
        let dt = ordered
            .get(i + 1)
            .map(|next| clamp_delta(next.timestamp.saturating_sub(sample.timestamp), max_gap_ms))
            .unwrap_or(0);

        let current = tester.hit(sample.x, sample.y);

        if let Some(acc) = current.and_then(|slot| accumulators.get_mut(slot)) {
            acc.dwell_ms += dt;

            if previous != current {
                acc.visits += 1;
                if acc.first_visit_order.is_none() {
                    acc.first_visit_order = Some(next_order);
                    next_order += 1;
                }
            }
        }

        previous = current;
    }

    let total_time_ms = match (ordered.first(), ordered.last()) {
        (Some(first), Some(last)) => {
            clamp_delta(last.timestamp.saturating_sub(first.timestamp), i64::MAX)
        }
        _ => 0,
    };

    let sentences: Vec<SentenceStat> = regions
        .iter()
        .zip(accumulators)
        .map(|(region, acc)| SentenceStat {
            index: region.id,
            text: region.text.clone(),
            dwell_ms: acc.dwell_ms,
            visits: acc.visits,
            first_visit_order: acc.first_visit_order,
        })
        .collect();

    debug!(
        "summarized {} samples over {} regions: {} ms total, {} sentences visited",
        ordered.len(),
        regions.len(),
        total_time_ms,
        next_order
    );

    ReadingSummary {
        total_time_ms,
        sentences,
    }
}

/// Time-ascending copy of the samples.
///
/// Equal timestamps are ordered by cursor position so the result does not depend on the
/// order samples arrived in.
fn sort_samples(samples: &[CursorSample]) -> Vec<CursorSample> {
    let mut ordered = samples.to_vec();
    ordered.sort_by(|a, b| {
        a.timestamp
            .cmp(&b.timestamp)
            .then_with(|| a.x.total_cmp(&b.x))
            .then_with(|| a.y.total_cmp(&b.y))
    });
    ordered
}

/// Clamp a signed delta into `[0, max]` and widen to unsigned. `max` must be non-negative.
fn clamp_delta(delta: i64, max: i64) -> u64 {
    delta.clamp(0, max) as u64
}

fn check_samples(samples: &[CursorSample]) -> Result<(), ReadpathError> {
    for (index, sample) in samples.iter().enumerate() {
        if !sample.is_finite() {
            return Err(ReadpathError::InvalidSample {
                index,
                reason: format!("non-finite coordinate ({}, {})", sample.x, sample.y),
            });
        }
    }
    Ok(())
}

fn check_regions(regions: &[SentenceRegion]) -> Result<(), ReadpathError> {
    let mut seen = HashSet::with_capacity(regions.len());
    for (index, region) in regions.iter().enumerate() {
        if !region.is_finite() {
            return Err(ReadpathError::InvalidRegion {
                index,
                reason: format!("sentence {} has a non-finite bound", region.id),
            });
        }
        if !seen.insert(region.id) {
            return Err(ReadpathError::InvalidRegion {
                index,
                reason: format!("duplicate sentence id {}", region.id),
            });
        }
    }
    Ok(())
}
