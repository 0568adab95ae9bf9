//! Transaction data structures for UPI payment analysis

use chrono::{Datelike, NaiveDateTime, Timelike, Weekday};
use serde::{Deserialize, Serialize};

/// Month names in calendar order, used for report ordering.
pub const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

/// Weekday names, Monday first.
pub const WEEKDAY_NAMES: [&str; 7] = [
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
    "Sunday",
];

/// A single UPI transaction as supplied by the transaction source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// Unique transaction identifier (e.g. `TXN00001`)
    pub transaction_id: String,

    /// Local date and time the payment was made
    pub timestamp: NaiveDateTime,

    /// Spending category (e.g. "Food & Dining")
    pub category: String,

    /// Merchant receiving the payment
    pub merchant: String,

    /// Amount in rupees, always positive for valid records
    pub amount: f64,

    /// How the payee was addressed: UPI ID, QR code or phone number
    pub payment_mode: String,

    /// Payer's bank
    pub sender_bank: String,

    /// Payee's bank
    pub receiver_bank: String,

    /// Indian state the payment originated from
    pub state: String,

    /// Settlement status carried by the source (`Success` or `Flagged`)
    #[serde(default)]
    pub status: Option<String>,

    /// Ground-truth fraud label, when the source carries one
    #[serde(default)]
    pub is_fraud: Option<bool>,
}

impl Transaction {
    /// Create a transaction with placeholder categorical fields.
    pub fn new(transaction_id: impl Into<String>, amount: f64, timestamp: NaiveDateTime) -> Self {
        Self {
            transaction_id: transaction_id.into(),
            timestamp,
            category: "Shopping".to_string(),
            merchant: "Amazon".to_string(),
            amount,
            payment_mode: "UPI ID".to_string(),
            sender_bank: "SBI".to_string(),
            receiver_bank: "HDFC".to_string(),
            state: "Karnataka".to_string(),
            status: None,
            is_fraud: None,
        }
    }

    pub fn with_category(mut self, category: &str, merchant: &str) -> Self {
        self.category = category.to_string();
        self.merchant = merchant.to_string();
        self
    }

    pub fn with_payment_mode(mut self, payment_mode: &str) -> Self {
        self.payment_mode = payment_mode.to_string();
        self
    }

    pub fn with_state(mut self, state: &str) -> Self {
        self.state = state.to_string();
        self
    }

    /// Attach a ground-truth label and the matching status.
    pub fn with_fraud_label(mut self, is_fraud: bool) -> Self {
        self.status = Some(status_for(is_fraud).to_string());
        self.is_fraud = Some(is_fraud);
        self
    }

    /// Labelled fraudulent by the source. Unlabelled rows count as not fraud.
    pub fn is_labelled_fraud(&self) -> bool {
        self.is_fraud == Some(true)
    }

    /// Hour of day, 0-23.
    pub fn hour(&self) -> u32 {
        self.timestamp.hour()
    }

    /// Calendar month, 1-12.
    pub fn month(&self) -> u32 {
        self.timestamp.month()
    }

    pub fn month_name(&self) -> &'static str {
        MONTH_NAMES[self.timestamp.month0() as usize]
    }

    pub fn weekday(&self) -> Weekday {
        self.timestamp.weekday()
    }

    pub fn day_name(&self) -> &'static str {
        WEEKDAY_NAMES[self.weekday().num_days_from_monday() as usize]
    }
}

/// Status written alongside a fraud label.
pub fn status_for(is_fraud: bool) -> &'static str {
    if is_fraud {
        "Flagged"
    } else {
        "Success"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(y: i32, m: u32, d: u32, h: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, 15, 0)
            .unwrap()
    }

    #[test]
    fn test_derived_calendar_fields() {
        // 2024-03-15 was a Friday
        let tx = Transaction::new("TXN00001", 499.0, at(2024, 3, 15, 3));

        assert_eq!(tx.hour(), 3);
        assert_eq!(tx.month(), 3);
        assert_eq!(tx.month_name(), "March");
        assert_eq!(tx.day_name(), "Friday");
    }

    #[test]
    fn test_builder_overrides() {
        let tx = Transaction::new("TXN00002", 120.0, at(2024, 1, 1, 9))
            .with_category("Transport", "Ola")
            .with_payment_mode("QR Code")
            .with_state("Delhi");

        assert_eq!(tx.category, "Transport");
        assert_eq!(tx.merchant, "Ola");
        assert_eq!(tx.payment_mode, "QR Code");
        assert_eq!(tx.state, "Delhi");
        assert_eq!(tx.is_fraud, None);
        assert!(!tx.is_labelled_fraud());
    }

    #[test]
    fn test_fraud_label_sets_status() {
        let fraud = Transaction::new("TXN00003", 6200.0, at(2024, 2, 2, 2)).with_fraud_label(true);
        assert_eq!(fraud.status.as_deref(), Some("Flagged"));
        assert!(fraud.is_labelled_fraud());

        let clean = Transaction::new("TXN00004", 80.0, at(2024, 2, 2, 14)).with_fraud_label(false);
        assert_eq!(clean.status.as_deref(), Some("Success"));
        assert_eq!(clean.is_fraud, Some(false));
    }
}
