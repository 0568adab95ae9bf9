//! UPI Transaction Analysis Library
//!
//! Loads a year of UPI payments, scores every transaction for anomalies
//! against its batch, and exports summaries of spending and fraud.

pub mod config;
pub mod dataset;
pub mod error;
pub mod metrics;
pub mod report;
pub mod scoring;
pub mod types;

pub use config::AppConfig;
pub use dataset::{DatasetGenerator, TransactionLoader};
pub use error::{DatasetError, ReportError, ScoringError};
pub use metrics::ScoringMetrics;
pub use report::ReportWriter;
pub use scoring::AnomalyScorer;
pub use types::{alert::FraudAlert, scored::ScoredBatch, transaction::Transaction};
