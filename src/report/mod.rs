//! Aggregation and export of scored batches

pub mod export;
pub mod summary;

pub use export::{write_scored_csv, ReportWriter};
pub use summary::{kpi_summary, GroupSummary, KpiSummary};
