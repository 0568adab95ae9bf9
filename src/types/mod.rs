//! Type definitions for transaction analysis

pub mod alert;
pub mod scored;
pub mod transaction;

pub use alert::{FraudAlert, RiskLevel, RiskLevelThresholds};
pub use scored::{BatchStats, ScoreBreakdown, ScoredBatch, ScoredTransaction};
pub use transaction::Transaction;
