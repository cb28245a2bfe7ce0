use thiserror::Error;
use std::num::ParseIntError;

#[derive(Error, Debug)]
pub enum ScreenerError {
    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    #[error("No weekly move threshold occurs less than {safety_pct}% of the time")]
    NoQualifyingThreshold { safety_pct: f64 },

    #[error("No option expiry at least {min_days} days after {from}")]
    NoEligibleExpiry { from: chrono::NaiveDate, min_days: i64 },

    #[error("Empty option chain for expiry {0}")]
    EmptyChain(chrono::NaiveDate),

    #[error("Provider unavailable: {0}")]
    ProviderUnavailable(String),

    #[error("Ticker not found: {0}")]
    TickerNotFound(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Screening task failed: {0}")]
    TaskFailed(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON parsing error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("Arrow error: {0}")]
    ArrowError(String),

    #[error("Date parsing error: {0}")]
    DateError(#[from] chrono::ParseError),

    #[error("Parse int error: {0}")]
    ParseIntError(#[from] ParseIntError),

    #[error("Data error: {0}")]
    DataError(String),
}

pub type Result<T> = std::result::Result<T, ScreenerError>;

impl From<arrow::error::ArrowError> for ScreenerError {
    fn from(e: arrow::error::ArrowError) -> Self {
        ScreenerError::ArrowError(e.to_string())
    }
}

impl ScreenerError {
    /// Short machine-readable name of the error kind, used in batch summaries.
    pub fn kind(&self) -> &'static str {
        match self {
            ScreenerError::InsufficientData(_) => "InsufficientData",
            ScreenerError::NoQualifyingThreshold { .. } => "NoQualifyingThreshold",
            ScreenerError::NoEligibleExpiry { .. } => "NoEligibleExpiry",
            ScreenerError::EmptyChain(_) => "EmptyChain",
            ScreenerError::ProviderUnavailable(_) => "ProviderUnavailable",
            ScreenerError::TickerNotFound(_) => "TickerNotFound",
            ScreenerError::InvalidConfig(_) => "InvalidConfig",
            ScreenerError::TaskFailed(_) => "TaskFailed",
            _ => "ProviderUnavailable",
        }
    }
}
