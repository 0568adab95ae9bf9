//! CSV transaction loader

use crate::error::{DatasetError, RecordIssue};
use crate::types::transaction::Transaction;
use chrono::{Datelike, NaiveDateTime};
use serde::Deserialize;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::{debug, info};

/// Timestamp layouts accepted in the `datetime` column.
const DATETIME_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"];

/// One CSV row as read, before validation. Every field is optional so that
/// missing values are reported per row instead of aborting the read.
#[derive(Debug, Deserialize)]
struct RawRecord {
    #[serde(default)]
    transaction_id: Option<String>,
    #[serde(default, alias = "timestamp")]
    datetime: Option<String>,
    #[serde(default)]
    category: Option<String>,
    #[serde(default)]
    merchant: Option<String>,
    #[serde(default)]
    amount: Option<String>,
    #[serde(default)]
    payment_mode: Option<String>,
    #[serde(default, alias = "bank")]
    sender_bank: Option<String>,
    #[serde(default)]
    receiver_bank: Option<String>,
    #[serde(default)]
    state: Option<String>,
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    is_fraud: Option<String>,
}

/// Reads transaction tables and rejects them whole if any row is invalid
#[derive(Debug, Clone)]
pub struct TransactionLoader {
    /// Calendar year every timestamp must fall in, if restricted
    year: Option<i32>,
}

impl TransactionLoader {
    /// Loader that accepts any year
    pub fn new() -> Self {
        Self { year: None }
    }

    /// Loader that requires every timestamp to fall in `year`
    pub fn for_year(year: i32) -> Self {
        Self { year: Some(year) }
    }

    /// Load transactions from a CSV file
    pub fn load_path<P: AsRef<Path>>(&self, path: P) -> Result<Vec<Transaction>, DatasetError> {
        let path = path.as_ref();
        info!(path = %path.display(), "Loading transactions");
        let file = File::open(path)?;
        let transactions = self.load_reader(file)?;
        info!(
            path = %path.display(),
            count = transactions.len(),
            "Transactions loaded"
        );
        Ok(transactions)
    }

    /// Load transactions from any CSV source with a header row
    pub fn load_reader<R: Read>(&self, reader: R) -> Result<Vec<Transaction>, DatasetError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);

        let mut transactions = Vec::new();
        let mut issues = Vec::new();

        for (index, row) in csv_reader.deserialize::<RawRecord>().enumerate() {
            let raw = row?;
            match self.parse_record(index, raw) {
                Ok(tx) => transactions.push(tx),
                Err(issue) => issues.push(issue),
            }
        }

        if !issues.is_empty() {
            debug!(invalid = issues.len(), "Rejecting dataset");
            return Err(DatasetError::InvalidRecords(issues));
        }
        if transactions.is_empty() {
            return Err(DatasetError::Empty);
        }

        Ok(transactions)
    }

    fn parse_record(&self, index: usize, raw: RawRecord) -> Result<Transaction, RecordIssue> {
        let id = raw.transaction_id.clone();
        let issue = |reason: String| RecordIssue::new(index, id.clone(), reason);

        let amount_text = raw.amount.ok_or_else(|| issue("missing amount".to_string()))?;
        let amount: f64 = amount_text
            .parse()
            .map_err(|_| issue(format!("amount {:?} is not numeric", amount_text)))?;
        if !amount.is_finite() || amount <= 0.0 {
            return Err(issue(format!("amount must be positive, got {}", amount_text)));
        }

        let datetime_text = raw.datetime.ok_or_else(|| issue("missing datetime".to_string()))?;
        let timestamp = parse_datetime(&datetime_text)
            .ok_or_else(|| issue(format!("unparseable datetime {:?}", datetime_text)))?;
        if let Some(year) = self.year {
            if timestamp.year() != year {
                return Err(issue(format!(
                    "datetime {} is outside {}",
                    datetime_text, year
                )));
            }
        }

        let require = |value: Option<String>, field: &str| {
            value.ok_or_else(|| issue(format!("missing {}", field)))
        };
        let category = require(raw.category, "category")?;
        let merchant = require(raw.merchant, "merchant")?;
        let payment_mode = require(raw.payment_mode, "payment_mode")?;
        let sender_bank = require(raw.sender_bank, "sender_bank")?;
        let state = require(raw.state, "state")?;
        let receiver_bank = raw.receiver_bank.unwrap_or_else(|| sender_bank.clone());
        let is_fraud = match raw.is_fraud {
            Some(text) => Some(
                parse_label(&text).ok_or_else(|| issue(format!("is_fraud {:?} is not a label", text)))?,
            ),
            None => None,
        };

        Ok(Transaction {
            transaction_id: raw
                .transaction_id
                .unwrap_or_else(|| format!("ROW{:05}", index + 1)),
            timestamp,
            category,
            merchant,
            amount,
            payment_mode,
            sender_bank,
            receiver_bank,
            state,
            status: raw.status,
            is_fraud,
        })
    }
}

impl Default for TransactionLoader {
    fn default() -> Self {
        Self::new()
    }
}

fn parse_datetime(text: &str) -> Option<NaiveDateTime> {
    DATETIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(text, format).ok())
}

/// Accepts `1`/`0` as written by the generator and `true`/`false` in any case.
fn parse_label(text: &str) -> Option<bool> {
    match text.to_ascii_lowercase().as_str() {
        "1" | "true" => Some(true),
        "0" | "false" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;

    const HEADER: &str = "transaction_id,datetime,hour,category,merchant,amount,payment_mode,sender_bank,receiver_bank,state,status";

    fn csv_of(rows: &[&str]) -> String {
        let mut text = String::from(HEADER);
        for row in rows {
            text.push('\n');
            text.push_str(row);
        }
        text
    }

    #[test]
    fn test_loads_generator_layout() {
        let data = csv_of(&[
            "TXN00001,2024-01-01 03:12:45,3,Food & Dining,Swiggy,412,UPI ID,SBI,HDFC,Karnataka,Success",
            "TXN00002,2024-01-01 08:46:40.360360360,8,Travel,OYO,5120,QR Code,Axis,BOB,Delhi,Success",
        ]);

        let txs = TransactionLoader::for_year(2024)
            .load_reader(data.as_bytes())
            .unwrap();

        assert_eq!(txs.len(), 2);
        assert_eq!(txs[0].transaction_id, "TXN00001");
        assert_eq!(txs[0].amount, 412.0);
        assert_eq!(txs[0].hour(), 3);
        assert_eq!(txs[1].merchant, "OYO");
        assert_eq!(txs[1].timestamp.minute(), 46);
        assert_eq!(txs[1].receiver_bank, "BOB");
        assert_eq!(txs[0].status.as_deref(), Some("Success"));
        assert_eq!(txs[0].is_fraud, None);
    }

    #[test]
    fn test_fraud_labels_are_read() {
        let data = "datetime,amount,category,merchant,payment_mode,sender_bank,state,is_fraud\n\
                    2024-03-01 02:10:00,6100,Travel,OYO,UPI ID,SBI,Delhi,1\n\
                    2024-03-01 12:10:00,240,Transport,Ola,UPI ID,SBI,Delhi,False\n\
                    2024-03-01 13:10:00,180,Transport,Uber,UPI ID,SBI,Delhi,\n";

        let txs = TransactionLoader::new().load_reader(data.as_bytes()).unwrap();
        assert_eq!(txs[0].is_fraud, Some(true));
        assert_eq!(txs[1].is_fraud, Some(false));
        assert_eq!(txs[2].is_fraud, None);

        let bad = "datetime,amount,category,merchant,payment_mode,sender_bank,state,is_fraud\n\
                   2024-03-01 02:10:00,6100,Travel,OYO,UPI ID,SBI,Delhi,maybe\n";
        match TransactionLoader::new().load_reader(bad.as_bytes()) {
            Err(DatasetError::InvalidRecords(issues)) => {
                assert!(issues[0].reason.contains("is_fraud"));
            }
            other => panic!("expected InvalidRecords, got {:?}", other),
        }
    }

    #[test]
    fn test_minimal_columns_and_aliases() {
        let data = "timestamp,amount,category,merchant,payment_mode,bank,state\n\
                    2024-07-04T21:05:00,99.5,Transport,Uber,Phone Number,PNB,Gujarat\n";

        let txs = TransactionLoader::new().load_reader(data.as_bytes()).unwrap();

        assert_eq!(txs[0].transaction_id, "ROW00001");
        assert_eq!(txs[0].sender_bank, "PNB");
        assert_eq!(txs[0].receiver_bank, "PNB");
        assert_eq!(txs[0].hour(), 21);
    }

    #[test]
    fn test_bad_rows_reject_whole_dataset() {
        let data = csv_of(&[
            "TXN00001,2024-02-01 10:00:00,10,Shopping,Amazon,abc,UPI ID,SBI,HDFC,Delhi,Success",
            "TXN00002,2024-02-01 11:00:00,11,Shopping,Amazon,250,UPI ID,SBI,HDFC,Delhi,Success",
            "TXN00003,yesterday,0,Shopping,Amazon,250,UPI ID,SBI,HDFC,Delhi,Success",
            "TXN00004,2024-02-01 12:00:00,12,Shopping,Amazon,-10,UPI ID,SBI,HDFC,Delhi,Success",
            "TXN00005,2024-02-01 13:00:00,13,Shopping,Amazon,,UPI ID,SBI,HDFC,Delhi,Success",
        ]);

        match TransactionLoader::new().load_reader(data.as_bytes()) {
            Err(DatasetError::InvalidRecords(issues)) => {
                assert_eq!(issues.len(), 4);
                assert_eq!(issues[0].transaction_id.as_deref(), Some("TXN00001"));
                assert!(issues[0].reason.contains("not numeric"));
                assert!(issues[1].reason.contains("unparseable datetime"));
                assert!(issues[2].reason.contains("must be positive"));
                assert_eq!(issues[3].reason, "missing amount");
            }
            other => panic!("expected InvalidRecords, got {:?}", other),
        }
    }

    #[test]
    fn test_year_restriction() {
        let data = csv_of(&[
            "TXN00001,2023-12-31 23:59:59,23,Shopping,Amazon,250,UPI ID,SBI,HDFC,Delhi,Success",
        ]);

        assert!(TransactionLoader::new().load_reader(data.as_bytes()).is_ok());
        assert!(matches!(
            TransactionLoader::for_year(2024).load_reader(data.as_bytes()),
            Err(DatasetError::InvalidRecords(_))
        ));
    }

    #[test]
    fn test_header_only_is_empty() {
        assert!(matches!(
            TransactionLoader::new().load_reader(HEADER.as_bytes()),
            Err(DatasetError::Empty)
        ));
    }
}
