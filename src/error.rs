//! Error types for loading and scoring transaction batches

use std::fmt;
use thiserror::Error;

/// Maximum number of offending records spelled out in an error message.
const MAX_LISTED_ISSUES: usize = 5;

/// A single record that failed validation.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordIssue {
    /// Zero-based position of the record in its batch (data rows for CSV input)
    pub index: usize,
    /// Transaction identifier, if one could be read
    pub transaction_id: Option<String>,
    /// What is wrong with the record
    pub reason: String,
}

impl RecordIssue {
    pub fn new(index: usize, transaction_id: Option<String>, reason: impl Into<String>) -> Self {
        Self {
            index,
            transaction_id,
            reason: reason.into(),
        }
    }
}

impl fmt::Display for RecordIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.transaction_id {
            Some(id) => write!(f, "record {} ({}): {}", self.index, id, self.reason),
            None => write!(f, "record {}: {}", self.index, self.reason),
        }
    }
}

/// Renders the first few issues of a list, with a count of the remainder.
fn describe_issues(issues: &[RecordIssue]) -> String {
    let mut parts: Vec<String> = issues
        .iter()
        .take(MAX_LISTED_ISSUES)
        .map(ToString::to_string)
        .collect();
    if issues.len() > MAX_LISTED_ISSUES {
        parts.push(format!("... and {} more", issues.len() - MAX_LISTED_ISSUES));
    }
    parts.join("; ")
}

/// Errors raised by the anomaly scoring engine.
#[derive(Debug, Error)]
pub enum ScoringError {
    #[error("cannot score an empty batch")]
    EmptyBatch,

    #[error("{} invalid record(s) in batch: {}", .0.len(), describe_issues(.0))]
    InvalidRecords(Vec<RecordIssue>),

    #[error("invalid scoring configuration: {0}")]
    InvalidConfig(String),
}

/// Errors raised while reading or writing transaction datasets.
#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("dataset contains no transactions")]
    Empty,

    #[error("dataset generation failed: {0}")]
    Generator(String),

    #[error("{} invalid row(s) in dataset: {}", .0.len(), describe_issues(.0))]
    InvalidRecords(Vec<RecordIssue>),
}

/// Errors raised while exporting reports.
#[derive(Debug, Error)]
pub enum ReportError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
