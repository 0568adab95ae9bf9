//! Scoring output: per-transaction results and the batch they belong to

use serde::Serialize;

use crate::types::alert::{FraudAlert, RiskLevel};
use crate::types::transaction::Transaction;

/// How an anomaly score was put together.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScoreBreakdown {
    /// Averaged percentile rank of the amount within the batch, 0.0 - 1.0
    pub percentile_rank: f64,
    /// Points from the percentile rank
    pub rank_points: f64,
    /// Points for falling in the odd-hour window
    pub odd_hour_points: f64,
    /// Points for exceeding the batch's high-value quantile
    pub high_value_points: f64,
}

impl ScoreBreakdown {
    pub fn total(&self) -> f64 {
        self.rank_points + self.odd_hour_points + self.high_value_points
    }
}

/// A transaction with its anomaly score and fraud flags.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredTransaction {
    pub transaction: Transaction,
    /// Rounded, clamped score in [0, 100]
    pub anomaly_score: u8,
    /// `anomaly_score` above the flag threshold
    pub is_flagged: bool,
    /// At least one fraud heuristic matched
    pub is_high_risk: bool,
    pub risk_level: RiskLevel,
    pub breakdown: ScoreBreakdown,
    /// Names of the heuristic rules that matched
    pub matched_rules: Vec<&'static str>,
}

impl ScoredTransaction {
    /// Score components and rules that contributed, as alert signal names.
    pub fn signals(&self) -> Vec<String> {
        let mut signals = Vec::new();
        if self.breakdown.odd_hour_points > 0.0 {
            signals.push("odd_hour".to_string());
        }
        if self.breakdown.high_value_points > 0.0 {
            signals.push("above_high_value_quantile".to_string());
        }
        signals.extend(self.matched_rules.iter().map(|r| format!("rule:{}", r)));
        signals
    }
}

/// Batch-level statistics computed in the first scoring pass.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchStats {
    pub size: usize,
    pub min_amount: f64,
    pub max_amount: f64,
    pub median_amount: f64,
    /// Amount at the configured high-value quantile (P95 by default)
    pub high_value_threshold: f64,
}

/// The result of scoring one batch, in input order.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredBatch {
    pub transactions: Vec<ScoredTransaction>,
    pub stats: BatchStats,
}

impl ScoredBatch {
    pub fn len(&self) -> usize {
        self.transactions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ScoredTransaction> {
        self.transactions.iter()
    }

    pub fn total_spend(&self) -> f64 {
        self.transactions.iter().map(|s| s.transaction.amount).sum()
    }

    pub fn average_transaction(&self) -> f64 {
        if self.transactions.is_empty() {
            return 0.0;
        }
        self.total_spend() / self.transactions.len() as f64
    }

    pub fn flagged_count(&self) -> usize {
        self.transactions.iter().filter(|s| s.is_flagged).count()
    }

    pub fn high_risk_count(&self) -> usize {
        self.transactions.iter().filter(|s| s.is_high_risk).count()
    }

    /// Fraction of transactions flagged by score, 0.0 - 1.0
    pub fn fraud_rate(&self) -> f64 {
        if self.transactions.is_empty() {
            return 0.0;
        }
        self.flagged_count() as f64 / self.transactions.len() as f64
    }

    pub fn filter<'a, P>(&'a self, predicate: P) -> impl Iterator<Item = &'a ScoredTransaction> + 'a
    where
        P: Fn(&ScoredTransaction) -> bool + 'a,
    {
        self.transactions.iter().filter(move |s| predicate(*s))
    }

    pub fn flagged(&self) -> Vec<&ScoredTransaction> {
        self.filter(|s| s.is_flagged).collect()
    }

    pub fn high_risk(&self) -> Vec<&ScoredTransaction> {
        self.filter(|s| s.is_high_risk).collect()
    }

    /// Transactions ordered by descending score; ties keep input order.
    pub fn sorted_by_score(&self) -> Vec<&ScoredTransaction> {
        let mut sorted: Vec<&ScoredTransaction> = self.transactions.iter().collect();
        sorted.sort_by(|a, b| b.anomaly_score.cmp(&a.anomaly_score));
        sorted
    }

    /// Transactions ordered by descending amount; ties keep input order.
    pub fn sorted_by_amount(&self) -> Vec<&ScoredTransaction> {
        let mut sorted: Vec<&ScoredTransaction> = self.transactions.iter().collect();
        sorted.sort_by(|a, b| b.transaction.amount.total_cmp(&a.transaction.amount));
        sorted
    }

    /// One alert per flagged or high-risk transaction.
    pub fn alerts(&self) -> Vec<FraudAlert> {
        self.transactions
            .iter()
            .filter_map(FraudAlert::from_scored)
            .collect()
    }
}
