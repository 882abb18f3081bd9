use serde::{Deserialize, Serialize};
use crate::output::OutputFormat;

pub mod loader;
pub mod pipeline;

pub use loader::{AppConfig, SourceConfig};
pub use pipeline::PipelineConfig;

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub filter: String,
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        LoggingConfig {
            filter: "info".to_string(),
            json: false,
        }
    }
}

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct OutputConfig {
    pub format: OutputFormat,
}
