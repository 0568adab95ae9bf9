//! Aggregate views over a scored batch

use crate::types::scored::{ScoredBatch, ScoredTransaction};
use crate::types::transaction::{MONTH_NAMES, WEEKDAY_NAMES};
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::{HashMap, HashSet};

/// Headline figures for a scored batch
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KpiSummary {
    pub total_transactions: usize,
    pub total_spend: f64,
    pub avg_transaction: f64,
    pub median_transaction: f64,
    pub first_date: NaiveDate,
    pub last_date: NaiveDate,
    pub unique_merchants: usize,
    pub unique_categories: usize,
    pub flagged_count: usize,
    pub high_risk_count: usize,
    /// Share of flagged transactions, in percent
    pub fraud_rate_pct: f64,
    /// Transactions the source labelled as fraud
    pub labelled_fraud_count: usize,
    /// Labelled fraud that the score also flagged
    pub labelled_fraud_flagged: usize,
    /// Labelled fraud that a heuristic also matched
    pub labelled_fraud_high_risk: usize,
}

/// One row of a grouped summary
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupSummary {
    pub key: String,
    pub transaction_count: usize,
    pub total_spend: f64,
    pub avg_spend: f64,
    pub flagged: usize,
    pub high_risk: usize,
    /// Spend of the flagged transactions in the group
    pub flagged_amount: f64,
    /// Transactions the source labelled as fraud
    pub labelled_fraud: usize,
}

impl GroupSummary {
    fn empty(key: String) -> Self {
        Self {
            key,
            transaction_count: 0,
            total_spend: 0.0,
            avg_spend: 0.0,
            flagged: 0,
            high_risk: 0,
            flagged_amount: 0.0,
            labelled_fraud: 0,
        }
    }

    fn add(&mut self, scored: &ScoredTransaction) {
        let amount = scored.transaction.amount;
        self.transaction_count += 1;
        self.total_spend += amount;
        if scored.is_flagged {
            self.flagged += 1;
            self.flagged_amount += amount;
        }
        if scored.is_high_risk {
            self.high_risk += 1;
        }
        if scored.transaction.is_labelled_fraud() {
            self.labelled_fraud += 1;
        }
    }

    fn finish(mut self) -> Self {
        if self.transaction_count > 0 {
            self.avg_spend = self.total_spend / self.transaction_count as f64;
        }
        self
    }
}

pub fn kpi_summary(batch: &ScoredBatch) -> KpiSummary {
    let first_date = batch
        .iter()
        .map(|s| s.transaction.timestamp.date())
        .min()
        .unwrap_or_default();
    let last_date = batch
        .iter()
        .map(|s| s.transaction.timestamp.date())
        .max()
        .unwrap_or_default();

    let merchants: HashSet<&str> = batch.iter().map(|s| s.transaction.merchant.as_str()).collect();
    let categories: HashSet<&str> = batch.iter().map(|s| s.transaction.category.as_str()).collect();
    let labelled: Vec<&ScoredTransaction> = batch
        .filter(|s| s.transaction.is_labelled_fraud())
        .collect();

    KpiSummary {
        total_transactions: batch.len(),
        total_spend: batch.total_spend(),
        avg_transaction: round2(batch.average_transaction()),
        median_transaction: batch.stats.median_amount,
        first_date,
        last_date,
        unique_merchants: merchants.len(),
        unique_categories: categories.len(),
        flagged_count: batch.flagged_count(),
        high_risk_count: batch.high_risk_count(),
        fraud_rate_pct: round2(batch.fraud_rate() * 100.0),
        labelled_fraud_count: labelled.len(),
        labelled_fraud_flagged: labelled.iter().filter(|s| s.is_flagged).count(),
        labelled_fraud_high_risk: labelled.iter().filter(|s| s.is_high_risk).count(),
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Group transactions by key, preserving first-seen key order.
fn group_by<F>(batch: &ScoredBatch, key_of: F) -> Vec<GroupSummary>
where
    F: Fn(&ScoredTransaction) -> String,
{
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut groups: Vec<GroupSummary> = Vec::new();

    for scored in batch.iter() {
        let key = key_of(scored);
        let slot = match index.get(&key) {
            Some(&slot) => slot,
            None => {
                index.insert(key.clone(), groups.len());
                groups.push(GroupSummary::empty(key));
                groups.len() - 1
            }
        };
        groups[slot].add(scored);
    }

    groups.into_iter().map(GroupSummary::finish).collect()
}

/// Reorder groups to follow a fixed key sequence, dropping absent keys.
fn in_key_order(groups: Vec<GroupSummary>, order: &[&str]) -> Vec<GroupSummary> {
    let mut by_key: HashMap<String, GroupSummary> =
        groups.into_iter().map(|g| (g.key.clone(), g)).collect();
    order
        .iter()
        .filter_map(|key| by_key.remove(*key))
        .collect()
}

fn by_spend_desc(mut groups: Vec<GroupSummary>) -> Vec<GroupSummary> {
    groups.sort_by(|a, b| b.total_spend.total_cmp(&a.total_spend));
    groups
}

fn by_key_asc(mut groups: Vec<GroupSummary>) -> Vec<GroupSummary> {
    groups.sort_by(|a, b| a.key.cmp(&b.key));
    groups
}

/// Spend, count and flags per month in calendar order
pub fn monthly_summary(batch: &ScoredBatch) -> Vec<GroupSummary> {
    let groups = group_by(batch, |s| s.transaction.month_name().to_string());
    in_key_order(groups, &MONTH_NAMES)
}

/// Per-category figures, highest spend first
pub fn category_summary(batch: &ScoredBatch) -> Vec<GroupSummary> {
    by_spend_desc(group_by(batch, |s| s.transaction.category.clone()))
}

/// The `n` merchants with the highest spend
pub fn top_merchants(batch: &ScoredBatch, n: usize) -> Vec<GroupSummary> {
    let mut groups = by_spend_desc(group_by(batch, |s| s.transaction.merchant.clone()));
    groups.truncate(n);
    groups
}

/// Monday through Sunday
pub fn day_of_week_summary(batch: &ScoredBatch) -> Vec<GroupSummary> {
    let groups = group_by(batch, |s| s.transaction.day_name().to_string());
    in_key_order(groups, &WEEKDAY_NAMES)
}

/// Hours that saw at least one transaction, ascending. Keys are zero-padded.
pub fn hourly_summary(batch: &ScoredBatch) -> Vec<GroupSummary> {
    by_key_asc(group_by(batch, |s| format!("{:02}", s.transaction.hour())))
}

pub fn payment_mode_summary(batch: &ScoredBatch) -> Vec<GroupSummary> {
    by_key_asc(group_by(batch, |s| s.transaction.payment_mode.clone()))
}

pub fn state_summary(batch: &ScoredBatch) -> Vec<GroupSummary> {
    by_spend_desc(group_by(batch, |s| s.transaction.state.clone()))
}

/// Categories ordered by number of flagged transactions
pub fn fraud_by_category(batch: &ScoredBatch) -> Vec<GroupSummary> {
    let mut groups = group_by(batch, |s| s.transaction.category.clone());
    groups.sort_by(|a, b| b.flagged.cmp(&a.flagged));
    groups
}

/// Flagged transactions, largest amount first
pub fn flagged_transactions(batch: &ScoredBatch) -> Vec<&ScoredTransaction> {
    batch
        .sorted_by_amount()
        .into_iter()
        .filter(|s| s.is_flagged)
        .collect()
}

/// Transactions matching a fraud heuristic, largest amount first
pub fn high_risk_transactions(batch: &ScoredBatch) -> Vec<&ScoredTransaction> {
    batch
        .sorted_by_amount()
        .into_iter()
        .filter(|s| s.is_high_risk)
        .collect()
}
