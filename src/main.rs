//! UPI Transaction Analysis - Main Entry Point
//!
//! Loads the transaction dataset, scores it, and exports the reports.
//!
//! Usage: upi-analysis [config_path] [dataset_path]

use anyhow::{Context, Result};
use std::path::Path;
use std::time::Instant;
use tracing::{info, warn};
use upi_fraud_analysis::{
    config::{AppConfig, LoggingConfig},
    dataset::{DatasetGenerator, TransactionLoader},
    metrics::ScoringMetrics,
    report::{kpi_summary, ReportWriter},
    scoring::AnomalyScorer,
    Transaction,
};

fn main() -> Result<()> {
    let args: Vec<String> = std::env::args().collect();
    let config_path = args.get(1).map(|s| s.as_str()).unwrap_or("config/config.toml");

    // Load configuration
    let mut config = AppConfig::load_from_path(config_path)
        .with_context(|| format!("Failed to load configuration from {}", config_path))?;
    if let Some(dataset_path) = args.get(2) {
        config.dataset.path = dataset_path.clone();
    }

    init_logging(&config.logging)?;

    info!("Starting UPI Transaction Analysis");
    info!(
        "Flag threshold: {}, odd hours: {:02}:00-{:02}:59, high-value quantile: {:.2}",
        config.scoring.flag_threshold,
        config.scoring.odd_hour_start,
        config.scoring.odd_hour_end,
        config.scoring.high_value_quantile
    );

    let transactions = load_transactions(&config)?;

    let scorer = AnomalyScorer::new(config.scoring.clone(), config.risk_levels.clone())
        .context("Invalid scoring configuration")?;
    info!(
        flag_threshold = scorer.config().flag_threshold,
        rules = scorer.rules().rules().len(),
        "Anomaly scorer initialized"
    );
    for rule in scorer.rules().rules() {
        info!(rule = rule.name, "Heuristic: {}", rule.description);
    }

    let start_time = Instant::now();
    let batch = scorer
        .score_batch(&transactions)
        .context("Failed to score transactions")?;
    let scoring_time = start_time.elapsed();

    let mut metrics = ScoringMetrics::new();
    metrics.record_batch(&batch, scoring_time);

    let writer = ReportWriter::new(&config.report.output_dir, config.report.top_merchants);
    let written = writer
        .write_all(&batch)
        .with_context(|| format!("Failed to export reports to {}", config.report.output_dir))?;
    for path in &written {
        info!(path = %path.display(), "Saved");
    }

    metrics.print_kpis(&kpi_summary(&batch));
    metrics.print_summary();

    for scored in batch.sorted_by_score().into_iter().take(5) {
        info!(
            transaction_id = %scored.transaction.transaction_id,
            amount = scored.transaction.amount,
            hour = scored.transaction.hour(),
            anomaly_score = scored.anomaly_score,
            risk_level = scored.risk_level.as_str(),
            "Top anomaly"
        );
    }

    info!("Analysis complete");
    Ok(())
}

fn init_logging(logging: &LoggingConfig) -> Result<()> {
    let filter = tracing_subscriber::EnvFilter::from_default_env()
        .add_directive(format!("upi_fraud_analysis={}", logging.level).parse()?)
        .add_directive(format!("upi_analysis={}", logging.level).parse()?);

    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    match logging.format.as_str() {
        "json" => builder.json().init(),
        "compact" => builder.compact().init(),
        _ => builder.pretty().init(),
    }
    Ok(())
}

/// Read the configured CSV, or synthesize the dataset when the file is missing
fn load_transactions(config: &AppConfig) -> Result<Vec<Transaction>> {
    let path = Path::new(&config.dataset.path);
    if path.exists() {
        return TransactionLoader::for_year(config.dataset.year)
            .load_path(path)
            .with_context(|| format!("Failed to load transactions from {}", path.display()));
    }

    warn!(
        path = %path.display(),
        size = config.dataset.size,
        seed = config.dataset.seed,
        "Dataset not found, generating synthetic transactions"
    );
    DatasetGenerator::new(config.dataset.seed, config.dataset.year)
        .generate(config.dataset.size)
        .context("Failed to generate dataset")
}
