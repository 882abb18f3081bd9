use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use uuid::Uuid;
use crate::error::Error;
use crate::observability::metrics::{PRICES_INGESTED, PRICES_REJECTED, SUBSCRIPTIONS_OPENED, SUBSCRIPTION_RECONNECTS};
use crate::observability::ErrorReporter;
use crate::price_infra::connectors::{PriceSource, Subscription};
use crate::store::PriceStore;
use crate::types::{Instrument, PriceEvent, SourceId, Window};

/// Keeps one source subscribed and files its prices into window buckets.
pub struct IngestionManager {
    instrument: Instrument,
    source_id: SourceId,
    source: Arc<dyn PriceSource>,
    store: Arc<dyn PriceStore>,
    reporter: Arc<dyn ErrorReporter>,
    window_granularity: Duration,
    reconnect_delay: Duration,
}

impl IngestionManager {
    pub fn new(
        instrument: Instrument,
        source_id: SourceId,
        source: Arc<dyn PriceSource>,
        store: Arc<dyn PriceStore>,
        reporter: Arc<dyn ErrorReporter>,
        window_granularity: Duration,
        reconnect_delay: Duration,
    ) -> Self {
        IngestionManager {
            instrument,
            source_id,
            source,
            store,
            reporter,
            window_granularity,
            reconnect_delay,
        }
    }

    /// Subscribes, drains, and resubscribes after `reconnect_delay` until cancelled.
    ///
    /// Retries are unbounded and the delay is fixed.
    pub async fn run(self, cancel: CancellationToken) {
        while !cancel.is_cancelled() {
            let session = Uuid::new_v4();

            let subscription = tokio::select! {
                _ = cancel.cancelled() => break,
                subscription = self.source.subscribe_price_stream(cancel.clone(), &self.instrument) => subscription,
            };
            SUBSCRIPTIONS_OPENED.inc();
            debug!(%session, "Subscription opened");

            if !self.drain(subscription, &cancel).await {
                break;
            }

            SUBSCRIPTION_RECONNECTS.inc();
            warn!(%session, "Subscription ended, reconnecting in {:?}", self.reconnect_delay);

            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = tokio::time::sleep(self.reconnect_delay) => {}
            }
        }

        info!("Ingestion stopped");
    }

    /// Consumes both streams until they close. Returns false when cancelled first.
    async fn drain(&self, mut subscription: Subscription<PriceEvent>, cancel: &CancellationToken) -> bool {
        let mut prices_open = true;
        let mut errors_open = true;

        while prices_open || errors_open {
            tokio::select! {
                biased;

                _ = cancel.cancelled() => return false,

                // errors first, so a busy price stream cannot starve them
                error = subscription.errors.recv(), if errors_open => match error {
                    Some(e) => self.reporter.report("subscription", &e),
                    None => errors_open = false,
                },

                price = subscription.prices.recv(), if prices_open => match price {
                    Some(event) => self.record(event),
                    None => prices_open = false,
                },
            }
        }

        true
    }

    fn record(&self, event: PriceEvent) {
        if event.instrument != self.instrument {
            PRICES_REJECTED.inc();
            self.reporter.report(
                "ingest price",
                &Error::InstrumentMismatch {
                    expected: self.instrument.clone(),
                    actual: event.instrument,
                },
            );
            return;
        }

        let window = Window::containing(event.timestamp, self.window_granularity);
        self.store.add_price(&self.instrument, window, &self.source_id, event.price);
        PRICES_INGESTED.inc();
    }
}
