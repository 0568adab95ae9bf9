//! Fraud alert data structures

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::error::ScoringError;
use crate::types::scored::ScoredTransaction;

/// Risk tier derived from an anomaly score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
    Critical,
}

impl RiskLevel {
    /// Determine the tier for a score. A score enters a tier when it is
    /// strictly above that tier's cut point, matching the flag rule.
    pub fn from_score(score: u8, thresholds: &RiskLevelThresholds) -> Self {
        if score > thresholds.critical {
            RiskLevel::Critical
        } else if score > thresholds.high {
            RiskLevel::High
        } else if score > thresholds.medium {
            RiskLevel::Medium
        } else {
            RiskLevel::Low
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Low => "low",
            RiskLevel::Medium => "medium",
            RiskLevel::High => "high",
            RiskLevel::Critical => "critical",
        }
    }
}

/// Configurable risk tier cut points on the 0-100 score scale
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskLevelThresholds {
    pub medium: u8,
    pub high: u8,
    pub critical: u8,
}

impl Default for RiskLevelThresholds {
    fn default() -> Self {
        Self {
            medium: 40,
            high: 70,
            critical: 85,
        }
    }
}

impl RiskLevelThresholds {
    /// Cut points must ascend within the score scale, and `high` must equal
    /// the flag threshold so that High and Critical are exactly the flagged
    /// tiers.
    pub fn validate(&self, flag_threshold: u8) -> Result<(), ScoringError> {
        if !(self.medium < self.high && self.high < self.critical && self.critical <= 100) {
            return Err(ScoringError::InvalidConfig(format!(
                "risk levels must satisfy medium < high < critical <= 100, got {}/{}/{}",
                self.medium, self.high, self.critical
            )));
        }
        if self.high != flag_threshold {
            return Err(ScoringError::InvalidConfig(format!(
                "risk level high cut point {} must equal flag_threshold {}",
                self.high, flag_threshold
            )));
        }
        Ok(())
    }
}

/// Alert raised for a transaction that was flagged by score or matched a
/// fraud heuristic
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FraudAlert {
    /// Unique alert identifier
    pub alert_id: String,

    /// Associated transaction ID
    pub transaction_id: String,

    /// Anomaly score (0 - 100)
    pub anomaly_score: u8,

    /// Risk tier classification
    pub risk_level: RiskLevel,

    /// Whether the score crossed the flag threshold
    pub is_flagged: bool,

    /// Whether any fraud heuristic matched
    pub is_high_risk: bool,

    /// Score components and heuristic rules that contributed to the alert
    pub triggered_signals: Vec<String>,

    /// When the transaction happened
    pub transaction_time: NaiveDateTime,

    /// Transaction amount in rupees
    pub amount: f64,

    /// Merchant receiving the payment
    pub merchant: String,

    /// Additional context
    pub context: String,
}

impl FraudAlert {
    /// Create a new fraud alert
    pub fn new(
        transaction_id: String,
        anomaly_score: u8,
        risk_level: RiskLevel,
        transaction_time: NaiveDateTime,
    ) -> Self {
        Self {
            alert_id: uuid::Uuid::new_v4().to_string(),
            transaction_id,
            anomaly_score,
            risk_level,
            is_flagged: false,
            is_high_risk: false,
            triggered_signals: Vec::new(),
            transaction_time,
            amount: 0.0,
            merchant: String::new(),
            context: String::new(),
        }
    }

    /// Build an alert from a scored transaction, or `None` when the
    /// transaction is neither flagged nor high-risk.
    pub fn from_scored(scored: &ScoredTransaction) -> Option<Self> {
        if !scored.is_flagged && !scored.is_high_risk {
            return None;
        }

        let tx = &scored.transaction;
        let alert = Self::new(
            tx.transaction_id.clone(),
            scored.anomaly_score,
            scored.risk_level,
            tx.timestamp,
        )
        .with_flags(scored.is_flagged, scored.is_high_risk)
        .with_transaction_details(
            tx.amount,
            tx.merchant.clone(),
            format!("{} / {} / {}", tx.category, tx.payment_mode, tx.state),
        )
        .with_triggered_signals(scored.signals());

        Some(alert)
    }

    pub fn with_flags(mut self, is_flagged: bool, is_high_risk: bool) -> Self {
        self.is_flagged = is_flagged;
        self.is_high_risk = is_high_risk;
        self
    }

    /// Add transaction details to the alert
    pub fn with_transaction_details(mut self, amount: f64, merchant: String, context: String) -> Self {
        self.amount = amount;
        self.merchant = merchant;
        self.context = context;
        self
    }

    pub fn with_triggered_signals(mut self, signals: Vec<String>) -> Self {
        self.triggered_signals = signals;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn noon() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 6, 1)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap()
    }

    #[test]
    fn test_risk_level_from_score() {
        let thresholds = RiskLevelThresholds::default();

        assert_eq!(RiskLevel::from_score(10, &thresholds), RiskLevel::Low);
        assert_eq!(RiskLevel::from_score(40, &thresholds), RiskLevel::Low);
        assert_eq!(RiskLevel::from_score(55, &thresholds), RiskLevel::Medium);
        assert_eq!(RiskLevel::from_score(70, &thresholds), RiskLevel::Medium);
        assert_eq!(RiskLevel::from_score(71, &thresholds), RiskLevel::High);
        assert_eq!(RiskLevel::from_score(90, &thresholds), RiskLevel::Critical);
    }

    #[test]
    fn test_threshold_validation() {
        assert!(RiskLevelThresholds::default().validate(70).is_ok());

        let inverted = RiskLevelThresholds {
            medium: 90,
            high: 20,
            critical: 10,
        };
        assert!(matches!(
            inverted.validate(20),
            Err(ScoringError::InvalidConfig(_))
        ));

        let beyond_scale = RiskLevelThresholds {
            medium: 40,
            high: 70,
            critical: 101,
        };
        assert!(beyond_scale.validate(70).is_err());

        // high cut point out of step with the flag threshold
        assert!(RiskLevelThresholds::default().validate(50).is_err());
    }

    #[test]
    fn test_fraud_alert_serialization() {
        let alert = FraudAlert::new("TXN00042".to_string(), 88, RiskLevel::High, noon())
            .with_flags(true, false)
            .with_triggered_signals(vec!["odd_hour".to_string()]);

        let json = serde_json::to_string(&alert).unwrap();
        assert!(json.contains("\"risk_level\":\"high\""));

        let deserialized: FraudAlert = serde_json::from_str(&json).unwrap();
        assert_eq!(alert.transaction_id, deserialized.transaction_id);
        assert_eq!(alert.anomaly_score, deserialized.anomaly_score);
        assert_eq!(alert.risk_level, deserialized.risk_level);
        assert_eq!(alert.triggered_signals, deserialized.triggered_signals);
    }

    #[test]
    fn test_alert_ids_are_unique() {
        let a = FraudAlert::new("TXN00001".to_string(), 75, RiskLevel::High, noon());
        let b = FraudAlert::new("TXN00001".to_string(), 75, RiskLevel::High, noon());
        assert_ne!(a.alert_id, b.alert_id);
    }
}
