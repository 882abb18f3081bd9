use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::time::Instant;
use crate::error::{Error, Result};
use crate::price_infra::algorithm::AggregationMethod;

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub window_granularity_secs: u64,
    pub tick_interval_ms: u64,
    pub reconnect_delay_ms: u64,
    pub output_buffer: usize,
    pub price_precision: usize,
    pub algorithm: AggregationMethod,
}

impl PipelineConfig {
    pub fn window_granularity(&self) -> Duration {
        Duration::from_secs(self.window_granularity_secs)
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    pub fn reconnect_delay(&self) -> Duration {
        Duration::from_millis(self.reconnect_delay_ms)
    }

    pub fn validate(&self) -> Result<()> {
        if self.window_granularity_secs == 0 {
            return Err(Error::ConfigError("window_granularity_secs must be positive".to_string()));
        }
        // windows are keyed by signed Unix seconds
        if self.window_granularity_secs > i64::MAX as u64 {
            return Err(Error::ConfigError("window_granularity_secs is too large".to_string()));
        }
        if self.tick_interval_ms == 0 {
            return Err(Error::ConfigError("tick_interval_ms must be positive".to_string()));
        }
        if Instant::now().checked_add(self.tick_interval()).is_none() {
            return Err(Error::ConfigError("tick_interval_ms is too large".to_string()));
        }
        if self.output_buffer == 0 {
            return Err(Error::ConfigError("output_buffer must be at least 1".to_string()));
        }
        Ok(())
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        PipelineConfig {
            window_granularity_secs: crate::DEFAULT_WINDOW_SECS,
            tick_interval_ms: 1_000,
            reconnect_delay_ms: 1_000,
            output_buffer: 1,
            price_precision: 10,
            algorithm: AggregationMethod::Mean,
        }
    }
}
