use serde::{Deserialize, Serialize};
use std::io::Write;
use tokio::sync::mpsc;
use crate::error::Result;
use crate::types::price::AggregatedPriceEvent;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    /// `<window start unix secs>, <price>`
    #[default]
    Plain,
    /// One JSON object per line
    Json,
}

/// Writes every aggregated price to `out` until the stream closes.
pub struct PricePrinter {
    format: OutputFormat,
}

impl PricePrinter {
    pub fn new(format: OutputFormat) -> Self {
        PricePrinter { format }
    }

    pub async fn print<W: Write>(
        &self,
        mut prices: mpsc::Receiver<AggregatedPriceEvent>,
        out: &mut W,
    ) -> Result<usize> {
        let mut printed = 0;

        while let Some(event) = prices.recv().await {
            self.write_event(&event, out)?;
            printed += 1;
        }

        Ok(printed)
    }

    fn write_event<W: Write>(&self, event: &AggregatedPriceEvent, out: &mut W) -> Result<()> {
        match self.format {
            OutputFormat::Plain => {
                writeln!(out, "{}, {}", event.window_start.timestamp(), event.price)?;
            }
            OutputFormat::Json => {
                let line = serde_json::to_string(event)
                    .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
                writeln!(out, "{}", line)?;
            }
        }
        out.flush()?;
        Ok(())
    }
}
