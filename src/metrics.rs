//! Run statistics for a scoring pass and the terminal summary banner.

use crate::report::summary::KpiSummary;
use crate::types::alert::RiskLevel;
use crate::types::scored::ScoredBatch;
use std::collections::BTreeMap;
use std::time::Duration;
use tracing::info;

/// Metrics collected from one scored batch
#[derive(Debug, Default)]
pub struct ScoringMetrics {
    /// Transactions scored
    pub transactions_scored: u64,
    /// Transactions above the flag threshold
    pub flagged: u64,
    /// Transactions matching a fraud heuristic
    pub high_risk: u64,
    /// Alerts raised (flagged or high-risk)
    pub alerts_generated: u64,
    /// Alerts by risk tier
    alerts_by_level: BTreeMap<RiskLevel, u64>,
    /// Anomaly score distribution, ten points per bucket
    score_buckets: [u64; 10],
    /// Wall time spent scoring
    scoring_time: Duration,
}

impl ScoringMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a scored batch and how long scoring took
    pub fn record_batch(&mut self, batch: &ScoredBatch, scoring_time: Duration) {
        self.scoring_time += scoring_time;

        for scored in batch.iter() {
            self.transactions_scored += 1;

            let bucket = (scored.anomaly_score as usize / 10).min(9);
            self.score_buckets[bucket] += 1;

            if scored.is_flagged {
                self.flagged += 1;
            }
            if scored.is_high_risk {
                self.high_risk += 1;
            }
            if scored.is_flagged || scored.is_high_risk {
                self.alerts_generated += 1;
                *self.alerts_by_level.entry(scored.risk_level).or_insert(0) += 1;
            }
        }
    }

    pub fn score_distribution(&self) -> [u64; 10] {
        self.score_buckets
    }

    pub fn alerts_by_level(&self) -> &BTreeMap<RiskLevel, u64> {
        &self.alerts_by_level
    }

    /// Scored transactions per second
    pub fn throughput(&self) -> f64 {
        let elapsed = self.scoring_time.as_secs_f64();
        if elapsed > 0.0 {
            self.transactions_scored as f64 / elapsed
        } else {
            0.0
        }
    }

    /// Share of scored transactions that were flagged, in percent
    pub fn flag_rate(&self) -> f64 {
        if self.transactions_scored > 0 {
            (self.flagged as f64 / self.transactions_scored as f64) * 100.0
        } else {
            0.0
        }
    }

    /// Log the headline figures of a batch
    pub fn print_kpis(&self, kpi: &KpiSummary) {
        info!("╔══════════════════════════════════════════════════════════════╗");
        info!("║              UPI TRANSACTION ANALYSIS - OVERVIEW             ║");
        info!("╠══════════════════════════════════════════════════════════════╣");
        info!(
            "║ Transactions: {:>8}  │  Total Spend: ₹{:>10.2}L          ║",
            kpi.total_transactions,
            kpi.total_spend / 100_000.0
        );
        info!(
            "║ Avg Txn:    ₹{:>9.0}  │  Median Txn:  ₹{:>10.0}           ║",
            kpi.avg_transaction, kpi.median_transaction
        );
        info!(
            "║ Fraud Rate:  {:>8.2}%  │  Flagged: {:>5}  High-risk: {:>5}  ║",
            kpi.fraud_rate_pct, kpi.flagged_count, kpi.high_risk_count
        );
        info!(
            "║ Period: {} → {}  │  Merchants: {:>3}  Categories: {:>2} ║",
            kpi.first_date, kpi.last_date, kpi.unique_merchants, kpi.unique_categories
        );
        if kpi.labelled_fraud_count > 0 {
            info!(
                "║ Labelled Fraud: {:>5}  │  Flagged: {:>5}  High-risk: {:>5}  ║",
                kpi.labelled_fraud_count, kpi.labelled_fraud_flagged, kpi.labelled_fraud_high_risk
            );
        }
        info!("╚══════════════════════════════════════════════════════════════╝");
    }

    /// Print summary statistics
    pub fn print_summary(&self) {
        info!("╔══════════════════════════════════════════════════════════════╗");
        info!("║               ANOMALY SCORING - METRICS SUMMARY              ║");
        info!("╠══════════════════════════════════════════════════════════════╣");
        info!(
            "║ Transactions Scored: {:>8}  │  Throughput: {:>9.0} tx/s ║",
            self.transactions_scored,
            self.throughput()
        );
        info!(
            "║ Flagged: {:>6} ({:>5.1}%)  │  High-risk: {:>6}            ║",
            self.flagged,
            self.flag_rate(),
            self.high_risk
        );
        info!(
            "║ Alerts Generated: {:>6}  │  Scoring time: {:>8} μs      ║",
            self.alerts_generated,
            self.scoring_time.as_micros()
        );
        info!("╠══════════════════════════════════════════════════════════════╣");
        info!("║ Alerts by Risk Level:                                        ║");
        for (level, count) in &self.alerts_by_level {
            let pct = if self.alerts_generated > 0 {
                (*count as f64 / self.alerts_generated as f64) * 100.0
            } else {
                0.0
            };
            info!("║   {:10}: {:>6} ({:>5.1}%)                                ║", level.as_str(), count, pct);
        }
        info!("╠══════════════════════════════════════════════════════════════╣");
        info!("║ Anomaly Score Distribution:                                  ║");
        let total: u64 = self.score_buckets.iter().sum();
        for (i, &count) in self.score_buckets.iter().enumerate() {
            let pct = if total > 0 { (count as f64 / total as f64) * 100.0 } else { 0.0 };
            let bar_len = (pct / 2.0) as usize;
            let bar: String = "█".repeat(bar_len.min(20));
            let upper = if i == 9 { 100 } else { (i + 1) * 10 - 1 };
            info!(
                "║   {:>3}-{:<3}: {:>6} ({:>5.1}%) {}",
                i * 10,
                upper,
                count,
                pct,
                bar
            );
        }
        info!("╚══════════════════════════════════════════════════════════════╝");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::AnomalyScorer;
    use crate::types::transaction::Transaction;
    use chrono::NaiveDate;

    fn batch() -> ScoredBatch {
        let at = |hour: u32| {
            NaiveDate::from_ymd_opt(2024, 2, 14)
                .unwrap()
                .and_hms_opt(hour, 0, 0)
                .unwrap()
        };
        let txs = vec![
            Transaction::new("a", 100.0, at(14)),
            Transaction::new("b", 9000.0, at(3)),
            Transaction::new("c", 4500.0, at(3)),
            Transaction::new("d", 250.0, at(11)),
        ];
        AnomalyScorer::default().score_batch(&txs).unwrap()
    }

    #[test]
    fn test_metrics_recording() {
        let mut metrics = ScoringMetrics::new();
        metrics.record_batch(&batch(), Duration::from_micros(200));

        assert_eq!(metrics.transactions_scored, 4);
        assert_eq!(metrics.flagged, 1);
        assert_eq!(metrics.high_risk, 2);
        assert_eq!(metrics.alerts_generated, 2);
        assert_eq!(metrics.score_distribution().iter().sum::<u64>(), 4);
        assert_eq!(metrics.score_distribution()[9], 1);
        assert_eq!(metrics.alerts_by_level().get(&RiskLevel::Critical), Some(&1));
        assert!((metrics.flag_rate() - 25.0).abs() < 1e-9);
        assert!(metrics.throughput() > 0.0);
    }

    #[test]
    fn test_empty_metrics() {
        let metrics = ScoringMetrics::new();
        assert_eq!(metrics.flag_rate(), 0.0);
        assert_eq!(metrics.throughput(), 0.0);
        metrics.print_summary();
    }
}
