//! Synthetic Dataset Generator
//!
//! Writes a labelled UPI transaction dataset for the analysis pipeline.
//!
//! Usage: generate-dataset [output_path] [count] [seed] [year]

use tracing::info;
use upi_fraud_analysis::dataset::{write_dataset_path, DatasetGenerator};

fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("generate_dataset=info".parse()?)
                .add_directive("upi_fraud_analysis=info".parse()?),
        )
        .init();

    // Parse arguments
    let args: Vec<String> = std::env::args().collect();
    let output = args.get(1).map(|s| s.as_str()).unwrap_or("data/upi_transactions.csv");
    let count: usize = args.get(2).and_then(|s| s.parse().ok()).unwrap_or(1000);
    let seed: u64 = args.get(3).and_then(|s| s.parse().ok()).unwrap_or(42);
    let year: i32 = args.get(4).and_then(|s| s.parse().ok()).unwrap_or(2024);

    info!(output = %output, count, seed, year, "Configuration loaded");

    let rows = DatasetGenerator::new(seed, year).generate(count)?;
    write_dataset_path(output, &rows)?;

    let fraud = rows.iter().filter(|tx| tx.is_labelled_fraud()).count();
    info!(
        "Dataset generated: {} transactions ({} labelled fraud) -> {}",
        rows.len(),
        fraud,
        output
    );

    Ok(())
}
