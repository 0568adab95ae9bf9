//! Synthetic UPI transaction dataset.
//!
//! Produces a year of payments with category-dependent amounts and a
//! ground-truth fraud label drawn from the same heuristics the scorer uses,
//! with the two weaker rules firing only part of the time.

use crate::error::DatasetError;
use crate::scoring::rules::RuleSet;
use crate::types::transaction::{status_for, Transaction};
use chrono::{Duration, NaiveDate, NaiveDateTime};
use rand::distributions::WeightedIndex;
use rand::prelude::*;
use serde::Serialize;
use std::io::Write;
use std::path::Path;
use tracing::info;

pub const CATEGORIES: [&str; 8] = [
    "Food & Dining",
    "Shopping",
    "Transport",
    "Utilities",
    "Entertainment",
    "Healthcare",
    "Education",
    "Travel",
];

const CATEGORY_WEIGHTS: [f64; 8] = [0.22, 0.20, 0.15, 0.12, 0.10, 0.08, 0.07, 0.06];

/// (mean, standard deviation) of the amount for each category, in rupees
const AMOUNT_PARAMS: [(f64, f64); 8] = [
    (300.0, 150.0),
    (1200.0, 800.0),
    (180.0, 100.0),
    (600.0, 300.0),
    (350.0, 150.0),
    (500.0, 400.0),
    (2000.0, 1500.0),
    (3500.0, 2500.0),
];

const MIN_AMOUNT: f64 = 50.0;

const MERCHANTS: [&[&str]; 8] = [
    &["Swiggy", "Zomato", "McDonald's", "Domino's", "Cafe Coffee Day", "Blinkit", "BigBasket"],
    &["Amazon", "Flipkart", "Myntra", "Meesho", "Nykaa", "Ajio", "Snapdeal"],
    &["Ola", "Uber", "Rapido", "Metro Card", "IRCTC", "RedBus", "InDrive"],
    &["BESCOM", "Airtel", "Jio", "BWSSB", "Gas Agency", "Vi", "BSNL"],
    &["Netflix", "Hotstar", "BookMyShow", "Spotify", "YouTube Premium", "ZEE5", "SonyLIV"],
    &["PharmEasy", "1mg", "Apollo Pharmacy", "Medlife", "Netmeds", "Practo"],
    &["Coursera", "Udemy", "BYJU'S", "Unacademy", "WhiteHat Jr", "Vedantu"],
    &["MakeMyTrip", "Goibibo", "OYO", "Airbnb", "Cleartrip", "EaseMyTrip"],
];

pub const STATES: [&str; 10] = [
    "Maharashtra",
    "Karnataka",
    "Tamil Nadu",
    "Delhi",
    "Telangana",
    "Gujarat",
    "Rajasthan",
    "Uttar Pradesh",
    "West Bengal",
    "Madhya Pradesh",
];

pub const PAYMENT_MODES: [&str; 3] = ["UPI ID", "QR Code", "Phone Number"];
const PAYMENT_MODE_WEIGHTS: [f64; 3] = [0.50, 0.30, 0.20];

pub const BANKS: [&str; 8] = ["SBI", "HDFC", "ICICI", "Axis", "Kotak", "PNB", "Canara", "BOB"];

/// Probability that a very large daytime amount is labelled fraud
const LARGE_AMOUNT_FRAUD_RATE: f64 = 0.4;
/// Probability that a mid amount in the deep-night window is labelled fraud
const LATE_NIGHT_FRAUD_RATE: f64 = 0.3;

const SECONDS_PER_DAY: i64 = 86_400;

/// Row layout of the exported dataset
#[derive(Debug, Serialize)]
struct DatasetRow<'a> {
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
}

/// Seeded generator for the synthetic dataset
pub struct DatasetGenerator {
    rng: StdRng,
    year: i32,
    rules: RuleSet,
}

impl DatasetGenerator {
    pub fn new(seed: u64, year: i32) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            year,
            rules: RuleSet::standard(),
        }
    }

    /// Generate `count` labelled transactions ordered by timestamp.
    pub fn generate(&mut self, count: usize) -> Result<Vec<Transaction>, DatasetError> {
        if count == 0 {
            return Err(DatasetError::Empty);
        }

        let (start, end) = year_bounds(self.year)?;
        let category_dist = WeightedIndex::new(CATEGORY_WEIGHTS).map_err(invalid_weights)?;
        let payment_dist = WeightedIndex::new(PAYMENT_MODE_WEIGHTS).map_err(invalid_weights)?;

        let timestamps = self.timestamps(start, end, count);
        let mut generated = Vec::with_capacity(count);

        for (i, timestamp) in timestamps.into_iter().enumerate() {
            let c = category_dist.sample(&mut self.rng);
            let merchant = self.pick(MERCHANTS[c]);
            let (mu, sigma) = AMOUNT_PARAMS[c];
            let amount = self.normal(mu, sigma).max(MIN_AMOUNT).trunc();

            let transaction = Transaction {
                transaction_id: format!("TXN{:05}", i + 1),
                timestamp,
                category: CATEGORIES[c].to_string(),
                merchant: merchant.to_string(),
                amount,
                payment_mode: PAYMENT_MODES[payment_dist.sample(&mut self.rng)].to_string(),
                sender_bank: self.pick(&BANKS).to_string(),
                receiver_bank: self.pick(&BANKS).to_string(),
                state: self.pick(&STATES).to_string(),
                status: None,
                is_fraud: None,
            };
            let is_fraud = self.label(&transaction);

            generated.push(transaction.with_fraud_label(is_fraud));
        }

        let fraud = generated.iter().filter(|t| t.is_labelled_fraud()).count();
        info!(count, fraud, year = self.year, "Synthetic dataset generated");

        Ok(generated)
    }

    /// Evenly spaced instants from `start` to `end`, each pushed forward by
    /// a random number of seconds within the day, then sorted.
    fn timestamps(&mut self, start: NaiveDateTime, end: NaiveDateTime, count: usize) -> Vec<NaiveDateTime> {
        let span_secs = (end - start).num_seconds();

        let mut stamps: Vec<NaiveDateTime> = (0..count)
            .map(|i| {
                let base = if count > 1 {
                    span_secs * i as i64 / (count as i64 - 1)
                } else {
                    0
                };
                let jitter = self.rng.gen_range(0..SECONDS_PER_DAY);
                start + Duration::seconds(base + jitter)
            })
            .collect();
        stamps.sort();
        stamps
    }

    fn label(&mut self, tx: &Transaction) -> bool {
        let hour = tx.hour();
        let matched = self.rules.matching(tx.amount, hour);
        if matched.contains(&"night_large_transfer") {
            return true;
        }
        let large = matched.contains(&"very_large_amount") && self.rng.gen_bool(LARGE_AMOUNT_FRAUD_RATE);
        let late = matched.contains(&"late_night_mid_amount") && self.rng.gen_bool(LATE_NIGHT_FRAUD_RATE);
        large || late
    }

    /// Normal sample via the Box-Muller transform
    fn normal(&mut self, mu: f64, sigma: f64) -> f64 {
        let u1: f64 = 1.0 - self.rng.gen::<f64>();
        let u2: f64 = self.rng.gen();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mu + sigma * z
    }

    fn pick<'a>(&mut self, choices: &[&'a str]) -> &'a str {
        choices[self.rng.gen_range(0..choices.len())]
    }
}

fn invalid_weights(e: rand::distributions::WeightedError) -> DatasetError {
    DatasetError::Generator(format!("invalid sampling weights: {}", e))
}

/// Midnight on Jan 1 and on Dec 31 of `year`.
fn year_bounds(year: i32) -> Result<(NaiveDateTime, NaiveDateTime), DatasetError> {
    let midnight = |month, day| {
        NaiveDate::from_ymd_opt(year, month, day).and_then(|date| date.and_hms_opt(0, 0, 0))
    };
    match (midnight(1, 1), midnight(12, 31)) {
        (Some(start), Some(end)) => Ok((start, end)),
        _ => Err(DatasetError::Generator(format!(
            "year {} is outside the supported calendar range",
            year
        ))),
    }
}

/// Write a labelled dataset as CSV with the full column layout.
pub fn write_dataset<W: Write>(writer: W, rows: &[Transaction]) -> Result<(), DatasetError> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    for tx in rows {
        csv_writer.serialize(DatasetRow {
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
            status: tx
                .status
                .as_deref()
                .or_else(|| tx.is_fraud.map(status_for)),
            is_fraud: tx.is_fraud.map(u8::from),
        })?;
    }
    csv_writer.flush()?;
    Ok(())
}

/// Write a labelled dataset to a file, creating parent directories.
pub fn write_dataset_path<P: AsRef<Path>>(path: P, rows: &[Transaction]) -> Result<(), DatasetError> {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let file = std::fs::File::create(path)?;
    write_dataset(file, rows)?;
    info!(path = %path.display(), rows = rows.len(), "Dataset written");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::loader::TransactionLoader;
    use chrono::Datelike;
    use std::collections::HashSet;

    #[test]
    fn test_generates_requested_count_in_order() {
        let rows = DatasetGenerator::new(42, 2024).generate(1000).unwrap();

        assert_eq!(rows.len(), 1000);
        assert_eq!(rows[0].transaction_id, "TXN00001");
        assert_eq!(rows[999].transaction_id, "TXN01000");
        assert!(rows
            .windows(2)
            .all(|w| w[0].timestamp <= w[1].timestamp));
        assert!(rows.iter().all(|r| r.timestamp.year() == 2024));
    }

    #[test]
    fn test_amounts_and_vocabularies() {
        let rows = DatasetGenerator::new(7, 2024).generate(500).unwrap();

        for tx in &rows {
            assert!(tx.amount >= MIN_AMOUNT);
            assert_eq!(tx.amount, tx.amount.trunc());
            let c = CATEGORIES.iter().position(|&c| c == tx.category).unwrap();
            assert!(MERCHANTS[c].contains(&tx.merchant.as_str()));
            assert!(STATES.contains(&tx.state.as_str()));
            assert!(BANKS.contains(&tx.sender_bank.as_str()));
            assert!(PAYMENT_MODES.contains(&tx.payment_mode.as_str()));
        }

        let categories: HashSet<&str> = rows.iter().map(|r| r.category.as_str()).collect();
        assert_eq!(categories.len(), CATEGORIES.len());
    }

    #[test]
    fn test_same_seed_same_dataset() {
        let a = DatasetGenerator::new(42, 2024).generate(50).unwrap();
        let b = DatasetGenerator::new(42, 2024).generate(50).unwrap();
        let c = DatasetGenerator::new(43, 2024).generate(50).unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_fraud_labels_follow_rules() {
        let rules = RuleSet::standard();
        let rows = DatasetGenerator::new(42, 2024).generate(1000).unwrap();

        for tx in &rows {
            assert!(tx.is_fraud.is_some());
            if tx.is_labelled_fraud() {
                assert!(rules.is_high_risk(tx.amount, tx.hour()));
                assert_eq!(tx.status.as_deref(), Some("Flagged"));
            }
            if tx.amount > 5000.0 && (1..=5).contains(&tx.hour()) {
                assert!(tx.is_labelled_fraud());
            }
        }
    }

    #[test]
    fn test_written_dataset_loads_back() {
        let rows = DatasetGenerator::new(42, 2024).generate(200).unwrap();
        let mut buffer = Vec::new();
        write_dataset(&mut buffer, &rows).unwrap();

        let text = String::from_utf8(buffer).unwrap();
        assert!(text.starts_with("transaction_id,date,time,datetime,month,month_name"));

        let loaded = TransactionLoader::for_year(2024)
            .load_reader(text.as_bytes())
            .unwrap();
        assert_eq!(loaded.len(), rows.len());
        assert_eq!(loaded, rows);
    }

    #[test]
    fn test_unrepresentable_year_rejected() {
        assert!(matches!(
            DatasetGenerator::new(1, 300_000).generate(10),
            Err(DatasetError::Generator(_))
        ));
    }

    #[test]
    fn test_zero_count_rejected() {
        assert!(matches!(
            DatasetGenerator::new(1, 2024).generate(0),
            Err(DatasetError::Empty)
        ));
    }
}
