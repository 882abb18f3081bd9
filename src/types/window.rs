use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Fixed-length time bucket, identified by the Unix second at which it starts.
///
/// Two instants belong to the same window iff truncating them to the
/// window granularity yields the same start second.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Window(i64);

impl Window {
    pub fn from_start_secs(start: i64) -> Self {
        Window(start)
    }

    /// Window containing `at` for the given granularity.
    ///
    /// Sub-second granularities are rounded up to one second, and ones
    /// beyond `i64::MAX` seconds are capped there.
    pub fn containing(at: DateTime<Utc>, granularity: Duration) -> Self {
        let step = i64::try_from(granularity.as_secs()).unwrap_or(i64::MAX).max(1);
        Window(at.timestamp().div_euclid(step) * step)
    }

    pub fn start_secs(&self) -> i64 {
        self.0
    }

    pub fn start_time(&self) -> DateTime<Utc> {
        DateTime::from_timestamp(self.0, 0).unwrap_or_default()
    }
}

impl fmt::Display for Window {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
