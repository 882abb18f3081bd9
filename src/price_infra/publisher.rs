use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use crate::observability::metrics::{
    EMISSIONS_ABANDONED, PRICES_REJECTED, SOURCES_PER_WINDOW, WINDOWS_PUBLISHED, WINDOWS_SKIPPED,
};
use crate::observability::ErrorReporter;
use crate::price_infra::algorithm::FairPriceAlgorithm;
use crate::store::PriceStore;
use crate::types::{AggregatedPriceEvent, Instrument, RawPrice, SourceId, Window};
use crate::utils::clock::Clock;

/// Emits one fair price per closed window of an instrument.
///
/// Rollover is detected by polling the clock every `tick_interval`, so an
/// emission lags the window close by at most one tick.
pub struct WindowPublisher {
    instrument: Instrument,
    store: Arc<dyn PriceStore>,
    algorithm: Arc<dyn FairPriceAlgorithm>,
    reporter: Arc<dyn ErrorReporter>,
    clock: Arc<dyn Clock>,
    window_granularity: Duration,
    tick_interval: Duration,
    price_precision: usize,
}

impl WindowPublisher {
    pub fn new(
        instrument: Instrument,
        store: Arc<dyn PriceStore>,
        algorithm: Arc<dyn FairPriceAlgorithm>,
        reporter: Arc<dyn ErrorReporter>,
        clock: Arc<dyn Clock>,
        window_granularity: Duration,
        tick_interval: Duration,
        price_precision: usize,
    ) -> Self {
        WindowPublisher {
            instrument,
            store,
            algorithm,
            reporter,
            clock,
            window_granularity,
            // a zero period would make the ticker panic
            tick_interval: tick_interval.max(Duration::from_millis(1)),
            price_precision,
        }
    }

    fn current_window(&self) -> Window {
        Window::containing(self.clock.now(), self.window_granularity)
    }

    /// Runs until cancelled. Cancellation is the only way out.
    pub async fn run(&self, output: &mpsc::Sender<AggregatedPriceEvent>, cancel: &CancellationToken) {
        let mut current = self.current_window();
        let mut ticker = interval_at(Instant::now() + self.tick_interval, self.tick_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        info!(window = %current, "Publisher started");

        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = ticker.tick() => {}
            }

            let observed = self.current_window();
            if observed == current {
                continue;
            }

            self.publish(current, output, cancel).await;

            // advance even when nothing was emitted
            current = observed;
        }

        info!("Publisher stopped");
    }

    async fn publish(
        &self,
        window: Window,
        output: &mpsc::Sender<AggregatedPriceEvent>,
        cancel: &CancellationToken,
    ) {
        let raw_prices = self.store.get_prices(&self.instrument, window);
        let prices = self.parse_prices(&raw_prices);

        let fair_price = match self.algorithm.calculate_price(&prices) {
            Ok(price) => price,
            Err(e) => {
                WINDOWS_SKIPPED.inc();
                self.reporter.report("calculate fair price", &e);
                // a bucket holding only unparsable values is never looked at again
                if !raw_prices.is_empty() {
                    self.store.remove_prices(&self.instrument, window);
                }
                return;
            }
        };

        let event = AggregatedPriceEvent {
            instrument: self.instrument.clone(),
            window_start: window.start_time(),
            price: RawPrice::from_f64(fair_price, self.price_precision),
        };

        tokio::select! {
            biased;

            _ = cancel.cancelled() => {
                EMISSIONS_ABANDONED.inc();
                debug!(window = %window, "Shutdown while sending, fair price abandoned");
            }

            sent = output.send(event) => {
                if sent.is_ok() {
                    WINDOWS_PUBLISHED.inc();
                    SOURCES_PER_WINDOW.observe(prices.len() as f64);
                    debug!(window = %window, price = fair_price, sources = prices.len(), "Fair price published");
                } else {
                    EMISSIONS_ABANDONED.inc();
                    warn!(window = %window, "Output consumer gone, fair price dropped");
                }
                self.store.remove_prices(&self.instrument, window);
            }
        }
    }

    /// Parses the raw prices of a window, dropping unparsable values.
    fn parse_prices(&self, raw_prices: &HashMap<SourceId, RawPrice>) -> BTreeMap<SourceId, f64> {
        raw_prices
            .iter()
            .filter_map(|(source_id, raw)| match raw.parse() {
                Ok(price) => Some((source_id.clone(), price)),
                Err(e) => {
                    PRICES_REJECTED.inc();
                    self.reporter.report("parse price", &e);
                    None
                }
            })
            .collect()
    }
}
