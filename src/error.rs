//! Error types for readpath

use thiserror::Error;

/// Errors that can occur while parsing, summarizing or encoding reading traces
#[derive(Debug, Error)]
pub enum ReadpathError {
    #[error("Failed to parse trace: {0}")]
    ParseError(String),

    #[error("Invalid JSON: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Invalid cursor sample at index {index}: {reason}")]
    InvalidSample { index: usize, reason: String },

    #[error("Invalid sentence region at index {index}: {reason}")]
    InvalidRegion { index: usize, reason: String },

    #[error("Invalid summarizer configuration: {0}")]
    InvalidConfig(String),

    #[error("Encoding error: {0}")]
    EncodingError(String),
}
