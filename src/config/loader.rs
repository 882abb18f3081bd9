use crate::config::pipeline::PipelineConfig;
use crate::config::{LoggingConfig, OutputConfig};
use crate::error::{Error, Result};
use crate::types::ids::{Instrument, SourceId};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;

#[derive(Debug, Deserialize, Serialize)]
#[serde(default)]
pub struct AppConfig {
    pub instrument: Instrument,
    pub pipeline: PipelineConfig,
    pub logging: LoggingConfig,
    pub output: OutputConfig,
    pub sources: Vec<SourceConfig>,
}

/// Mock feed definition used by the binary.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct SourceConfig {
    pub source_id: SourceId,
    pub price: f64,
    pub interval_ms: u64,
    #[serde(default = "default_weight")]
    pub weight: f64,
}

fn default_weight() -> f64 {
    1.0
}

impl SourceConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            instrument: Instrument::btc_usd(),
            pipeline: PipelineConfig::default(),
            logging: LoggingConfig::default(),
            output: OutputConfig::default(),
            sources: vec![
                SourceConfig { source_id: "source_a".into(), price: 1.1, interval_ms: 1_000, weight: 1.0 },
                SourceConfig { source_id: "source_b".into(), price: 1.2, interval_ms: 2_000, weight: 1.0 },
                SourceConfig { source_id: "source_c".into(), price: 1.6, interval_ms: 3_000, weight: 1.0 },
            ],
        }
    }
}

impl AppConfig {
    /// Layers `config/default`, `config/{env}` and `FAIRPRICE__*` variables over the defaults.
    pub fn load(env: &str) -> Result<Self> {
        let config = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", env)).required(false))
            .add_source(Environment::with_prefix("FAIRPRICE").separator("__"))
            .build()?;

        let app: AppConfig = config.try_deserialize()?;
        app.validate()?;
        Ok(app)
    }

    pub fn validate(&self) -> Result<()> {
        self.pipeline.validate()?;

        for source in &self.sources {
            if !source.weight.is_finite() || source.weight < 0.0 {
                return Err(Error::ConfigError(format!(
                    "source {} has invalid weight {}",
                    source.source_id, source.weight
                )));
            }
        }

        Ok(())
    }

    pub fn weights(&self) -> HashMap<SourceId, f64> {
        self.sources
            .iter()
            .map(|s| (s.source_id.clone(), s.weight))
            .collect()
    }
}
