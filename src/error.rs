use chrono::NaiveDate;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReceiptHistoryError {
    #[error("Failed to read receipt file {}: {source}", path.display())]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid peg rate {0}: must be a positive finite number")]
    InvalidPegRate(f64),

    #[error("Invalid date range: start {start} is after end {end}")]
    InvalidDateRange { start: NaiveDate, end: NaiveDate },

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ReceiptHistoryError>;
