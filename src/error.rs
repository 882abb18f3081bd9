use thiserror::Error;
use crate::types::ids::Instrument;

#[derive(Error, Debug)]
pub enum Error {
    // Reduction Errors
    #[error("Not enough data to calculate a fair price")]
    InsufficientData,

    #[error("Invalid price {raw:?}: {reason}")]
    InvalidPrice {
        raw: String,
        reason: String,
    },

    // Ingestion Errors
    #[error("Instrument mismatch: expected {expected}, got {actual}")]
    InstrumentMismatch {
        expected: Instrument,
        actual: Instrument,
    },

    #[error("Subscription error: {0}")]
    Subscription(String),

    // System Errors
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Metrics error: {0}")]
    MetricsError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

impl From<config::ConfigError> for Error {
    fn from(e: config::ConfigError) -> Self {
        Error::ConfigError(e.to_string())
    }
}

impl From<prometheus::Error> for Error {
    fn from(e: prometheus::Error) -> Self {
        Error::MetricsError(e.to_string())
    }
}
