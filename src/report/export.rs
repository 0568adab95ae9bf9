//! CSV and JSON export of scored batches and their summaries

use crate::error::ReportError;
use crate::report::summary::{self, GroupSummary};
use crate::types::alert::FraudAlert;
use crate::types::scored::{ScoredBatch, ScoredTransaction};
use serde::Serialize;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Flat CSV row: the dataset columns followed by the scoring columns
#[derive(Debug, Serialize)]
struct ScoredRecord<'a> {
    transaction_id: &'a str,
    date: String,
    time: String,
    datetime: String,
    month: u32,
    month_name: &'a str,
    day_of_week: &'a str,
    hour: u32,
    category: &'a str,
    merchant: &'a str,
    amount: f64,
    payment_mode: &'a str,
    sender_bank: &'a str,
    receiver_bank: &'a str,
    state: &'a str,
    status: Option<&'a str>,
    is_fraud: Option<u8>,
    anomaly_score: u8,
    is_flagged: bool,
    is_high_risk: bool,
    risk_level: &'a str,
}

impl<'a> From<&'a ScoredTransaction> for ScoredRecord<'a> {
    fn from(scored: &'a ScoredTransaction) -> Self {
        let tx = &scored.transaction;
        Self {
            transaction_id: &tx.transaction_id,
            date: tx.timestamp.format("%Y-%m-%d").to_string(),
            time: tx.timestamp.format("%H:%M:%S").to_string(),
            datetime: tx.timestamp.format("%Y-%m-%d %H:%M:%S").to_string(),
            month: tx.month(),
            month_name: tx.month_name(),
            day_of_week: tx.day_name(),
            hour: tx.hour(),
            category: &tx.category,
            merchant: &tx.merchant,
            amount: tx.amount,
            payment_mode: &tx.payment_mode,
            sender_bank: &tx.sender_bank,
            receiver_bank: &tx.receiver_bank,
            state: &tx.state,
            status: tx.status.as_deref(),
            is_fraud: tx.is_fraud.map(u8::from),
            anomaly_score: scored.anomaly_score,
            is_flagged: scored.is_flagged,
            is_high_risk: scored.is_high_risk,
            risk_level: scored.risk_level.as_str(),
        }
    }
}

/// Write scored transactions as CSV.
pub fn write_scored_csv<'a, W, I>(writer: W, rows: I) -> Result<(), ReportError>
where
    W: Write,
    I: IntoIterator<Item = &'a ScoredTransaction>,
{
    let mut csv_writer = csv::Writer::from_writer(writer);
    for scored in rows {
        csv_writer.serialize(ScoredRecord::from(scored))?;
    }
    csv_writer.flush()?;
    Ok(())
}

/// Write any serializable rows as CSV.
pub fn write_rows_csv<W: Write, T: Serialize>(writer: W, rows: &[T]) -> Result<(), ReportError> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    for row in rows {
        csv_writer.serialize(row)?;
    }
    csv_writer.flush()?;
    Ok(())
}

/// Exports every report for a scored batch into one directory
pub struct ReportWriter {
    output_dir: PathBuf,
    top_merchants: usize,
}

impl ReportWriter {
    pub fn new<P: AsRef<Path>>(output_dir: P, top_merchants: usize) -> Self {
        Self {
            output_dir: output_dir.as_ref().to_path_buf(),
            top_merchants,
        }
    }

    /// Write all reports, returning the paths written.
    pub fn write_all(&self, batch: &ScoredBatch) -> Result<Vec<PathBuf>, ReportError> {
        fs::create_dir_all(&self.output_dir)?;
        let mut written = Vec::new();

        written.push(self.scored_csv("scored_transactions.csv", batch.iter())?);
        written.push(self.scored_csv(
            "flagged_transactions.csv",
            summary::flagged_transactions(batch),
        )?);
        written.push(self.scored_csv(
            "high_risk_transactions.csv",
            summary::high_risk_transactions(batch),
        )?);

        let groups: [(&str, Vec<GroupSummary>); 8] = [
            ("monthly_summary.csv", summary::monthly_summary(batch)),
            ("category_summary.csv", summary::category_summary(batch)),
            (
                "top_merchants.csv",
                summary::top_merchants(batch, self.top_merchants),
            ),
            ("dayofweek_summary.csv", summary::day_of_week_summary(batch)),
            ("hourly_summary.csv", summary::hourly_summary(batch)),
            ("payment_mode_summary.csv", summary::payment_mode_summary(batch)),
            ("state_summary.csv", summary::state_summary(batch)),
            ("fraud_by_category.csv", summary::fraud_by_category(batch)),
        ];
        for (name, rows) in &groups {
            let path = self.path(name);
            write_rows_csv(File::create(&path)?, rows)?;
            debug!(path = %path.display(), rows = rows.len(), "Summary written");
            written.push(path);
        }

        written.push(self.json("kpi_summary.json", &summary::kpi_summary(batch))?);
        let alerts: Vec<FraudAlert> = batch.alerts();
        written.push(self.json("alerts.json", &alerts)?);

        info!(
            output_dir = %self.output_dir.display(),
            files = written.len(),
            alerts = alerts.len(),
            "Reports exported"
        );

        Ok(written)
    }

    fn path(&self, name: &str) -> PathBuf {
        self.output_dir.join(name)
    }

    fn scored_csv<'a, I>(&self, name: &str, rows: I) -> Result<PathBuf, ReportError>
    where
        I: IntoIterator<Item = &'a ScoredTransaction>,
    {
        let path = self.path(name);
        write_scored_csv(File::create(&path)?, rows)?;
        debug!(path = %path.display(), "Scored transactions written");
        Ok(path)
    }

    fn json<T: Serialize + ?Sized>(&self, name: &str, value: &T) -> Result<PathBuf, ReportError> {
        let path = self.path(name);
        let file = File::create(&path)?;
        serde_json::to_writer_pretty(file, value)?;
        Ok(path)
    }
}
