//! Anomaly scoring engine.
//!
//! Scoring runs in two passes over a batch. The first pass computes
//! batch-relative statistics (percentile rank of every amount and the
//! high-value quantile); the second applies per-transaction rules:
//!
//! - `rank_weight * percentile_rank` (0 for the lowest amount, full weight
//!   for the highest)
//! - `odd_hour_bonus` when the hour falls in the odd-hour window
//! - `high_value_bonus` when the amount exceeds the high-value quantile
//!
//! The sum is rounded and clamped to [0, 100]. The fraud heuristics in
//! [`rules`] are evaluated independently of the score. Scores depend on
//! the batch they were computed in and are not comparable across batches.

pub mod percentile;
pub mod rules;

use crate::config::ScoringConfig;
use crate::error::{RecordIssue, ScoringError};
use crate::types::alert::{RiskLevel, RiskLevelThresholds};
use crate::types::scored::{BatchStats, ScoreBreakdown, ScoredBatch, ScoredTransaction};
use crate::types::transaction::Transaction;
use rules::RuleSet;
use tracing::{debug, info};

pub const MAX_SCORE: f64 = 100.0;

/// Rule-based anomaly scorer for transaction batches
#[derive(Debug, Clone)]
pub struct AnomalyScorer {
    config: ScoringConfig,
    risk_levels: RiskLevelThresholds,
    rules: RuleSet,
}

impl AnomalyScorer {
    /// Create a scorer, rejecting out-of-range configuration and risk
    /// tiers that disagree with the flag threshold
    pub fn new(config: ScoringConfig, risk_levels: RiskLevelThresholds) -> Result<Self, ScoringError> {
        config.validate()?;
        risk_levels.validate(config.flag_threshold)?;
        Ok(Self {
            config,
            risk_levels,
            rules: RuleSet::standard(),
        })
    }

    /// Replace the heuristic rule set
    pub fn with_rules(mut self, rules: RuleSet) -> Self {
        self.rules = rules;
        self
    }

    pub fn config(&self) -> &ScoringConfig {
        &self.config
    }

    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    /// Score a whole batch. Fails without partial results if the batch is
    /// empty or any record is invalid.
    pub fn score_batch(&self, transactions: &[Transaction]) -> Result<ScoredBatch, ScoringError> {
        validate_batch(transactions)?;

        let amounts: Vec<f64> = transactions.iter().map(|tx| tx.amount).collect();
        let stats = batch_stats(&amounts, self.config.high_value_quantile);
        let ranks = percentile::percentile_ranks(&amounts);

        debug!(
            size = stats.size,
            high_value_threshold = stats.high_value_threshold,
            median_amount = stats.median_amount,
            "Batch statistics computed"
        );

        let scored: Vec<ScoredTransaction> = transactions
            .iter()
            .zip(ranks)
            .map(|(tx, rank)| self.score_one(tx, rank, stats.high_value_threshold))
            .collect();

        let batch = ScoredBatch {
            transactions: scored,
            stats,
        };

        info!(
            transactions = batch.len(),
            flagged = batch.flagged_count(),
            high_risk = batch.high_risk_count(),
            "Batch scored"
        );

        Ok(batch)
    }

    fn score_one(&self, tx: &Transaction, percentile_rank: f64, high_value_threshold: f64) -> ScoredTransaction {
        let hour = tx.hour();

        let breakdown = ScoreBreakdown {
            percentile_rank,
            rank_points: percentile_rank * self.config.rank_weight,
            odd_hour_points: if self.config.is_odd_hour(hour) {
                self.config.odd_hour_bonus
            } else {
                0.0
            },
            high_value_points: if tx.amount > high_value_threshold {
                self.config.high_value_bonus
            } else {
                0.0
            },
        };

        let anomaly_score = breakdown.total().round().clamp(0.0, MAX_SCORE) as u8;
        let matched_rules = self.rules.matching(tx.amount, hour);

        ScoredTransaction {
            transaction: tx.clone(),
            anomaly_score,
            is_flagged: anomaly_score > self.config.flag_threshold,
            is_high_risk: !matched_rules.is_empty(),
            risk_level: RiskLevel::from_score(anomaly_score, &self.risk_levels),
            breakdown,
            matched_rules,
        }
    }
}

impl Default for AnomalyScorer {
    fn default() -> Self {
        Self {
            config: ScoringConfig::default(),
            risk_levels: RiskLevelThresholds::default(),
            rules: RuleSet::standard(),
        }
    }
}

fn validate_batch(transactions: &[Transaction]) -> Result<(), ScoringError> {
    if transactions.is_empty() {
        return Err(ScoringError::EmptyBatch);
    }

    let issues: Vec<RecordIssue> = transactions
        .iter()
        .enumerate()
        .filter_map(|(index, tx)| {
            let reason = if !tx.amount.is_finite() {
                format!("amount is not a finite number ({})", tx.amount)
            } else if tx.amount <= 0.0 {
                format!("amount must be positive, got {}", tx.amount)
            } else {
                return None;
            };
            Some(RecordIssue::new(index, Some(tx.transaction_id.clone()), reason))
        })
        .collect();

    if issues.is_empty() {
        Ok(())
    } else {
        Err(ScoringError::InvalidRecords(issues))
    }
}

fn batch_stats(amounts: &[f64], high_value_quantile: f64) -> BatchStats {
    let mut sorted = amounts.to_vec();
    sorted.sort_by(f64::total_cmp);

    BatchStats {
        size: sorted.len(),
        min_amount: sorted.first().copied().unwrap_or(0.0),
        max_amount: sorted.last().copied().unwrap_or(0.0),
        median_amount: percentile::quantile_sorted(&sorted, 0.5).unwrap_or(0.0),
        high_value_threshold: percentile::quantile_sorted(&sorted, high_value_quantile).unwrap_or(0.0),
    }
}
