use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use crate::error::{Error, Result};
use crate::types::ids::Instrument;

/// Decimal price carried as text, e.g. "0", "12.2", "13.2345122".
///
/// Stored verbatim; only parsed when a window is reduced.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawPrice(String);

impl RawPrice {
    pub fn new(value: impl Into<String>) -> Self {
        RawPrice(value.into())
    }

    /// Formats `value` with a fixed number of fractional digits.
    pub fn from_f64(value: f64, precision: usize) -> Self {
        RawPrice(format!("{:.*}", precision, value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn parse(&self) -> Result<f64> {
        let value: f64 = self.0.trim().parse().map_err(|e: std::num::ParseFloatError| {
            Error::InvalidPrice {
                raw: self.0.clone(),
                reason: e.to_string(),
            }
        })?;

        if !value.is_finite() {
            return Err(Error::InvalidPrice {
                raw: self.0.clone(),
                reason: "not a finite number".to_string(),
            });
        }

        Ok(value)
    }
}

impl fmt::Display for RawPrice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for RawPrice {
    fn from(value: &str) -> Self {
        RawPrice(value.to_string())
    }
}

/// One observation from one source at one instant.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PriceEvent {
    pub instrument: Instrument,
    pub timestamp: DateTime<Utc>,
    pub price: RawPrice,
}

/// Fair price of one closed window.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AggregatedPriceEvent {
    pub instrument: Instrument,
    pub window_start: DateTime<Utc>,
    pub price: RawPrice,
}
