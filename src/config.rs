//! Configuration management for the transaction analysis

use crate::error::ScoringError;
use crate::types::alert::RiskLevelThresholds;
use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::Deserialize;
use std::path::Path;

/// Main application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub dataset: DatasetConfig,
    #[serde(default)]
    pub scoring: ScoringConfig,
    #[serde(default)]
    pub risk_levels: RiskLevelThresholds,
    pub report: ReportConfig,
    pub logging: LoggingConfig,
}

/// Transaction dataset configuration
#[derive(Debug, Clone, Deserialize)]
pub struct DatasetConfig {
    /// CSV file with the transactions to analyse
    pub path: String,
    /// Calendar year every timestamp must fall in
    #[serde(default = "default_year")]
    pub year: i32,
    /// Number of transactions to synthesize when the file is missing
    #[serde(default = "default_size")]
    pub size: usize,
    /// RNG seed for the synthetic dataset
    #[serde(default = "default_seed")]
    pub seed: u64,
}

fn default_year() -> i32 {
    2024
}

fn default_size() -> usize {
    1000
}

fn default_seed() -> u64 {
    42
}

/// Anomaly score weights and thresholds
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ScoringConfig {
    /// Points awarded to the highest-ranked amount in a batch
    #[serde(default = "default_rank_weight")]
    pub rank_weight: f64,
    /// First hour of the odd-hour window (inclusive)
    #[serde(default = "default_odd_hour_start")]
    pub odd_hour_start: u32,
    /// Last hour of the odd-hour window (inclusive)
    #[serde(default = "default_odd_hour_end")]
    pub odd_hour_end: u32,
    #[serde(default = "default_odd_hour_bonus")]
    pub odd_hour_bonus: f64,
    /// Batch quantile above which an amount counts as high-value
    #[serde(default = "default_high_value_quantile")]
    pub high_value_quantile: f64,
    #[serde(default = "default_high_value_bonus")]
    pub high_value_bonus: f64,
    /// Scores strictly above this are flagged
    #[serde(default = "default_flag_threshold")]
    pub flag_threshold: u8,
}

fn default_rank_weight() -> f64 {
    40.0
}

fn default_odd_hour_start() -> u32 {
    1
}

fn default_odd_hour_end() -> u32 {
    5
}

fn default_odd_hour_bonus() -> f64 {
    30.0
}

fn default_high_value_quantile() -> f64 {
    0.95
}

fn default_high_value_bonus() -> f64 {
    20.0
}

fn default_flag_threshold() -> u8 {
    70
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            rank_weight: default_rank_weight(),
            odd_hour_start: default_odd_hour_start(),
            odd_hour_end: default_odd_hour_end(),
            odd_hour_bonus: default_odd_hour_bonus(),
            high_value_quantile: default_high_value_quantile(),
            high_value_bonus: default_high_value_bonus(),
            flag_threshold: default_flag_threshold(),
        }
    }
}

impl ScoringConfig {
    /// Whether an hour falls inside the odd-hour window.
    pub fn is_odd_hour(&self, hour: u32) -> bool {
        (self.odd_hour_start..=self.odd_hour_end).contains(&hour)
    }

    pub fn validate(&self) -> Result<(), ScoringError> {
        if !(self.high_value_quantile > 0.0 && self.high_value_quantile <= 1.0) {
            return Err(ScoringError::InvalidConfig(format!(
                "high_value_quantile must be in (0, 1], got {}",
                self.high_value_quantile
            )));
        }
        if self.odd_hour_end > 23 || self.odd_hour_start > self.odd_hour_end {
            return Err(ScoringError::InvalidConfig(format!(
                "odd hour window {}..={} must lie within 0..=23",
                self.odd_hour_start, self.odd_hour_end
            )));
        }
        for (name, value) in [
            ("rank_weight", self.rank_weight),
            ("odd_hour_bonus", self.odd_hour_bonus),
            ("high_value_bonus", self.high_value_bonus),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(ScoringError::InvalidConfig(format!(
                    "{} must be a non-negative number, got {}",
                    name, value
                )));
            }
        }
        if self.flag_threshold > 100 {
            return Err(ScoringError::InvalidConfig(format!(
                "flag_threshold must be at most 100, got {}",
                self.flag_threshold
            )));
        }
        Ok(())
    }
}

/// Report export configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ReportConfig {
    /// Directory that receives CSV and JSON exports
    pub output_dir: String,
    /// Number of merchants in the top-merchants report
    #[serde(default = "default_top_merchants")]
    pub top_merchants: usize,
}

fn default_top_merchants() -> usize {
    10
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
    /// Log format (pretty, compact, json)
    pub format: String,
}

impl AppConfig {
    /// Load configuration from file
    pub fn load() -> Result<Self> {
        Self::load_from_path("config/config.toml")
    }

    /// Load configuration from a specific path, with `UPI__SECTION__KEY`
    /// environment overrides
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let config = Config::builder()
            .add_source(File::from(path.as_ref()))
            .add_source(Environment::with_prefix("UPI").separator("__"))
            .build()
            .context("Failed to build configuration")?;

        let app: AppConfig = config
            .try_deserialize()
            .context("Failed to deserialize configuration")?;

        app.validate().context("Invalid scoring configuration")?;

        Ok(app)
    }

    /// Check the `[scoring]` section and that `[risk_levels]` agrees with it
    pub fn validate(&self) -> Result<(), ScoringError> {
        self.scoring.validate()?;
        self.risk_levels.validate(self.scoring.flag_threshold)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            dataset: DatasetConfig {
                path: "data/upi_transactions.csv".to_string(),
                year: default_year(),
                size: default_size(),
                seed: default_seed(),
            },
            scoring: ScoringConfig::default(),
            risk_levels: RiskLevelThresholds::default(),
            report: ReportConfig {
                output_dir: "outputs".to_string(),
                top_merchants: default_top_merchants(),
            },
            logging: LoggingConfig {
                level: "info".to_string(),
                format: "pretty".to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.dataset.year, 2024);
        assert_eq!(config.dataset.size, 1000);
        assert_eq!(config.scoring.flag_threshold, 70);
        assert_eq!(config.scoring.high_value_quantile, 0.95);
        assert_eq!(config.risk_levels.high, 70);
        assert_eq!(config.report.top_merchants, 10);
    }

    #[test]
    fn test_odd_hour_window_inclusive() {
        let scoring = ScoringConfig::default();
        assert!(!scoring.is_odd_hour(0));
        assert!(scoring.is_odd_hour(1));
        assert!(scoring.is_odd_hour(5));
        assert!(!scoring.is_odd_hour(6));
    }

    #[test]
    fn test_scoring_validation() {
        assert!(ScoringConfig::default().validate().is_ok());

        let bad_quantile = ScoringConfig {
            high_value_quantile: 0.0,
            ..ScoringConfig::default()
        };
        assert!(bad_quantile.validate().is_err());

        let reversed_window = ScoringConfig {
            odd_hour_start: 6,
            odd_hour_end: 2,
            ..ScoringConfig::default()
        };
        assert!(reversed_window.validate().is_err());

        let negative_bonus = ScoringConfig {
            odd_hour_bonus: -1.0,
            ..ScoringConfig::default()
        };
        assert!(negative_bonus.validate().is_err());
    }

    #[test]
    fn test_risk_levels_checked_against_flag_threshold() {
        assert!(AppConfig::default().validate().is_ok());

        let mut config = AppConfig::default();
        config.scoring.flag_threshold = 60;
        assert!(config.validate().is_err());

        config.risk_levels.high = 60;
        assert!(config.validate().is_ok());

        config.risk_levels.medium = 65;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_shipped_config_file_parses() {
        let path = concat!(env!("CARGO_MANIFEST_DIR"), "/config/config.toml");
        let config = AppConfig::load_from_path(path).unwrap();

        assert_eq!(config.scoring, ScoringConfig::default());
        assert_eq!(config.risk_levels, RiskLevelThresholds::default());
        assert_eq!(config.dataset.path, "data/upi_transactions.csv");
        assert_eq!(config.logging.level, "info");
    }
}
