use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Failed to read log source: {0}")]
    Io(#[from] std::io::Error),

    #[error("Log source not found: {}", .0.display())]
    SourceNotFound(PathBuf),

    #[error(
        "Error limit exceeded: {errors} unparsable lines against {records} records \
         (ratio {ratio:.5} > limit {limit}), log format may have changed"
    )]
    ErrorBudgetExceeded {
        records: u64,
        errors: u64,
        ratio: f64,
        limit: f64,
    },

    #[error("Invalid errors limit: {0}")]
    InvalidErrorLimit(String),

    #[error("Invalid max records: {0}")]
    InvalidMaxRecords(String),

    #[error("Nothing to report: no records were aggregated")]
    NothingToReport,

    #[error("Log directory not found: {}", .0.display())]
    LogDirNotFound(PathBuf),

    #[error("Invalid pattern: {0}")]
    InvalidPattern(String),

    #[error("Failed to serialize report: {0}")]
    Serialize(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
