//! Transaction sources: CSV loading and the synthetic dataset generator

pub mod generator;
pub mod loader;

pub use generator::{write_dataset, write_dataset_path, DatasetGenerator};
pub use loader::TransactionLoader;
