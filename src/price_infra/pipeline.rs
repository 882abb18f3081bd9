use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{info, Instrument as _};
use crate::config::PipelineConfig;
use crate::error::{Error, Result};
use crate::observability::tracing::{trace_ingestion, trace_publisher};
use crate::observability::ErrorReporter;
use crate::price_infra::algorithm::FairPriceAlgorithm;
use crate::price_infra::connectors::{PriceSource, Subscription};
use crate::price_infra::ingestion::IngestionManager;
use crate::price_infra::publisher::WindowPublisher;
use crate::store::PriceStore;
use crate::types::{AggregatedPriceEvent, Instrument, SourceId};
use crate::utils::clock::Clock;
use crate::utils::task_supervisor::TaskSupervisor;

/// Fair price stream built from several independent price sources.
pub struct FairPriceSource {
    algorithm: Arc<dyn FairPriceAlgorithm>,
    store: Arc<dyn PriceStore>,
    sources: HashMap<SourceId, Arc<dyn PriceSource>>,
    clock: Arc<dyn Clock>,
    reporter: Arc<dyn ErrorReporter>,
    config: PipelineConfig,
}

impl FairPriceSource {
    pub fn new(
        algorithm: Arc<dyn FairPriceAlgorithm>,
        store: Arc<dyn PriceStore>,
        sources: HashMap<SourceId, Arc<dyn PriceSource>>,
        clock: Arc<dyn Clock>,
        reporter: Arc<dyn ErrorReporter>,
        config: PipelineConfig,
    ) -> Result<Self> {
        config.validate()?;

        Ok(FairPriceSource {
            algorithm,
            store,
            sources,
            clock,
            reporter,
            config,
        })
    }

    /// Starts one ingestion loop per source and one publisher for `instrument`.
    ///
    /// Both returned streams close only after the publisher and every
    /// ingestion loop have stopped, which happens once `cancel` fires.
    /// Nothing is written to the error stream today: per-source failures
    /// are reported through the `ErrorReporter` instead.
    pub fn subscribe_price_stream(
        &self,
        cancel: CancellationToken,
        instrument: Instrument,
    ) -> Subscription<AggregatedPriceEvent> {
        let mut supervisor = TaskSupervisor::new();

        for (source_id, source) in &self.sources {
            let manager = IngestionManager::new(
                instrument.clone(),
                source_id.clone(),
                source.clone(),
                self.store.clone(),
                self.reporter.clone(),
                self.config.window_granularity(),
                self.config.reconnect_delay(),
            );

            supervisor.spawn(
                format!("ingestion:{}", source_id),
                manager
                    .run(cancel.clone())
                    .instrument(trace_ingestion(&instrument, source_id)),
            );
        }

        let publisher = WindowPublisher::new(
            instrument.clone(),
            self.store.clone(),
            self.algorithm.clone(),
            self.reporter.clone(),
            self.clock.clone(),
            self.config.window_granularity(),
            self.config.tick_interval(),
            self.config.price_precision,
        );

        let (price_tx, price_rx) = mpsc::channel(self.config.output_buffer.max(1));
        let (error_tx, error_rx) = mpsc::channel::<Error>(1);

        let span = trace_publisher(&instrument);
        tokio::spawn(
            async move {
                publisher.run(&price_tx, &cancel).await;
                supervisor.join_all().await;

                // every writer is gone, close the outputs
                drop(price_tx);
                drop(error_tx);
                info!("Fair price stream closed");
            }
            .instrument(span),
        );

        Subscription::new(price_rx, error_rx)
    }
}
