//! readpath - Cursor-trace reading behavior summarizer
//!
//! readpath turns the mouse-cursor trace recorded while a participant reads a passage
//! into per-sentence reading statistics through a deterministic pipeline:
//! trace parsing → sample ordering → hit-testing → dwell/visit accounting → encoding.
//!
//! ## Modules
//!
//! - **Summarizer**: dwell time, visit count and first-visit order per sentence
//! - **Aggregate**: per-sentence averages across many answer attempts

pub mod adapter;
pub mod aggregate;
pub mod config;
pub mod encoder;
pub mod error;
pub mod geometry;
pub mod pipeline;
pub mod summarizer;
pub mod types;

// FFI bindings for C interop (always available for cdylib/staticlib builds)
pub mod ffi;

pub use aggregate::{AggregateReport, SentenceAggregate, SentenceAggregator};
pub use config::{CoordinatePolicy, SummaryConfig};
pub use error::ReadpathError;
pub use geometry::{HitTester, LinearHitTester};
pub use pipeline::{trace_to_summary_json, AnalyticsProcessor};
pub use summarizer::{summarize, ReadingSummarizer};
pub use types::{CursorSample, ReadingSummary, ReadingTrace, SentenceRegion, SentenceStat};

/// readpath version embedded in every encoded envelope
pub const READPATH_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Producer name for encoded envelopes
pub const PRODUCER_NAME: &str = "readpath";
